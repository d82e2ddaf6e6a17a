//! Game configuration resource.
//!
//! Tunables loaded from an INI configuration file. Defaults are used for
//! anything the file does not mention; a value that is present but cannot be
//! parsed is a configuration error and aborts startup.
//!
//! # Configuration File Format
//!
//! ```ini
//! [dialogue]
//! reveal_interval = 0.1
//! interact_key = e
//!
//! [bullet]
//! trail_time = 0.1
//!
//! [spells]
//! max_spells = 5
//! legacy_truncation = false
//!
//! [rng]
//! seed = 1234
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::components::spellcaster::SpellLimitPolicy;
use crate::error::{GameplayError, GameplayResult};
use crate::resources::input::Key;

const DEFAULT_REVEAL_INTERVAL: f32 = 0.1;
const DEFAULT_INTERACT_KEY: Key = Key::E;
const DEFAULT_TRAIL_TIME: f32 = 0.1;
const DEFAULT_MAX_SPELLS: usize = 5;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Seconds between two revealed dialogue characters.
    pub reveal_interval: f32,
    /// Key that starts a dialogue from its proximity zone.
    pub interact_key: Key,
    /// Baseline fade time of projectile trails.
    pub trail_time: f32,
    /// Spells a caster keeps after initialisation.
    pub max_spells: usize,
    /// Reproduce the old over-limit spell removal instead of keeping the
    /// first `max_spells`.
    pub legacy_truncation: bool,
    /// Seed for gameplay rolls; entropy-seeded when absent.
    pub rng_seed: Option<u64>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(section: &str, key: &str, err: impl std::fmt::Display) -> GameplayError {
    GameplayError::Config(format!("[{}] {}: {}", section, key, err))
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            reveal_interval: DEFAULT_REVEAL_INTERVAL,
            interact_key: DEFAULT_INTERACT_KEY,
            trail_time: DEFAULT_TRAIL_TIME,
            max_spells: DEFAULT_MAX_SPELLS,
            legacy_truncation: false,
            rng_seed: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    pub fn spell_limit_policy(&self) -> SpellLimitPolicy {
        if self.legacy_truncation {
            SpellLimitPolicy::Legacy
        } else {
            SpellLimitPolicy::KeepFirst
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> GameplayResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| GameplayError::Config(format!("failed to load config file: {}", e)))?;
        self.apply_ini(&config)
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> GameplayResult<()> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| GameplayError::Config(format!("failed to parse config: {}", e)))?;
        self.apply_ini(&config)
    }

    fn apply_ini(&mut self, config: &Ini) -> GameplayResult<()> {
        // [dialogue]
        if let Some(interval) = config
            .getfloat("dialogue", "reveal_interval")
            .map_err(|e| invalid("dialogue", "reveal_interval", e))?
        {
            if interval < 0.0 {
                return Err(invalid("dialogue", "reveal_interval", "must not be negative"));
            }
            self.reveal_interval = interval as f32;
        }
        if let Some(key) = config.get("dialogue", "interact_key") {
            self.interact_key = key
                .parse()
                .map_err(|e| invalid("dialogue", "interact_key", e))?;
        }

        // [bullet]
        if let Some(trail) = config
            .getfloat("bullet", "trail_time")
            .map_err(|e| invalid("bullet", "trail_time", e))?
        {
            self.trail_time = trail as f32;
        }

        // [spells]
        if let Some(max) = config
            .getuint("spells", "max_spells")
            .map_err(|e| invalid("spells", "max_spells", e))?
        {
            self.max_spells = max as usize;
        }
        if let Some(legacy) = config
            .getbool("spells", "legacy_truncation")
            .map_err(|e| invalid("spells", "legacy_truncation", e))?
        {
            self.legacy_truncation = legacy;
        }

        // [rng]
        if let Some(seed) = config
            .getuint("rng", "seed")
            .map_err(|e| invalid("rng", "seed", e))?
        {
            self.rng_seed = Some(seed);
        }

        info!(
            "Loaded config: reveal_interval={}, interact_key={}, trail_time={}, max_spells={}, legacy_truncation={}, seed={:?}",
            self.reveal_interval,
            self.interact_key,
            self.trail_time,
            self.max_spells,
            self.legacy_truncation,
            self.rng_seed
        );
        Ok(())
    }
}
