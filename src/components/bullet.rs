//! Projectile controller component.
//!
//! A [`Bullet`] owns its combat parameters, weak references (plain
//! [`Entity`] handles, checked for liveness before use) to its shooter and
//! target, the shared [`SpellEffect`] list of its archetype, and the pause
//! snapshot used to freeze it while the game is paused.
//!
//! Lifecycle, driven by [`crate::systems::bullet`]:
//!
//! 1. spawned from a [`BulletArchetype`] and subscribed to the event bus
//! 2. `initialize_effects` runs on-creation effects and arms the lifetime
//! 3. `fire_bullet` scales parameters by the shooter's stats, launches the
//!    body and sets `shot`; on-shot effects follow
//! 4. every frame while shot and not paused: distance check, then on-flight
//!    effects
//! 5. on a qualifying contact: on-hit effects, then destruction

use std::sync::Arc;

use bevy_ecs::prelude::{Component, Entity};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::spelleffect::SpellEffect;
use crate::components::stats::{StatKind, Stats};

/// Tunable combat parameters of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletParams {
    pub damage: f32,
    pub speed: f32,
    /// Seconds before the bullet destroys itself.
    pub destroy_time: f32,
    /// Distance from the shooter beyond which the bullet is destroyed.
    pub destroy_distance: f32,
    pub knockback_multiplier: f32,
    pub explosive_multiplier: f32,
    pub explosion_falloff: f32,
}

impl Default for BulletParams {
    fn default() -> Self {
        Self {
            damage: 1.0,
            speed: 10.0,
            destroy_time: 10.0,
            destroy_distance: 10.0,
            knockback_multiplier: 1.0,
            explosive_multiplier: 1.0,
            explosion_falloff: 1.0,
        }
    }
}

/// The four stats projectile scaling reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShooterStats {
    pub intelligence: f32,
    pub agility: f32,
    pub luck: f32,
    pub wisdom: f32,
}

impl From<&Stats> for ShooterStats {
    fn from(stats: &Stats) -> Self {
        Self {
            intelligence: stats.get(StatKind::Intelligence),
            agility: stats.get(StatKind::Agility),
            luck: stats.get(StatKind::Luck),
            wisdom: stats.get(StatKind::Wisdom),
        }
    }
}

/// Round to two decimals, halves to even.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round_ties_even() / 100.0
}

impl BulletParams {
    /// Apply the shooter's stats to these parameters.
    ///
    /// `luck_jitter` is the random offset in `[-500, 500]` added to the luck
    /// divisor; it is drawn per cast by the caller. Factors are applied in a
    /// fixed order and damage and speed are rounded to two decimals after
    /// scaling. `destroy_time` and `destroy_distance` are not affected.
    pub fn scaled(&self, stats: &ShooterStats, luck_jitter: f32) -> BulletParams {
        let int = stats.intelligence;
        let agi = stats.agility;
        let luck = stats.luck;
        let wis = stats.wisdom;

        let damage = self.damage
            * (1.0 + int / 200.0)
            * (1.0 + agi / 500.0)
            * (1.0 + luck / (1000.0 + luck_jitter));
        let speed = self.speed * (1.0 + int / 200.0) * (1.0 + wis / 200.0);

        BulletParams {
            damage: round2(damage),
            speed: round2(speed),
            knockback_multiplier: self.knockback_multiplier
                * (1.0 + int / 300.0)
                * (1.0 + wis / 100.0),
            explosive_multiplier: self.explosive_multiplier
                * (1.0 + int / 100.0)
                * (1.0 + wis / 300.0),
            explosion_falloff: self.explosion_falloff * (1.0 - int / 200.0),
            ..*self
        }
    }
}

/// Authored description of a projectile, shared by every bullet spawned
/// from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletArchetype {
    #[serde(default)]
    pub params: BulletParams,
    #[serde(default)]
    pub effects: Arc<[SpellEffect]>,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Spawn with a fading trail.
    #[serde(default)]
    pub trail: bool,
}

fn default_mass() -> f32 {
    1.0
}

impl BulletArchetype {
    pub fn new(params: BulletParams, effects: impl Into<Arc<[SpellEffect]>>) -> Self {
        Self {
            params,
            effects: effects.into(),
            mass: default_mass(),
            trail: false,
        }
    }

    pub fn with_trail(mut self) -> Self {
        self.trail = true;
        self
    }
}

/// State captured when the game pauses, restored on resume.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PauseSnapshot {
    pub paused: bool,
    pub velocity: Vec3,
    pub pause_time: f32,
    pub resume_time: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Bullet {
    pub params: BulletParams,
    pub shooter: Option<Entity>,
    pub target: Option<Entity>,
    pub effects: Arc<[SpellEffect]>,
    /// False until `fire_bullet` completes. Flight effects and the distance
    /// check are inert before that.
    pub shot: bool,
    pub pause: PauseSnapshot,
}

impl Bullet {
    pub fn new(params: BulletParams, effects: Arc<[SpellEffect]>) -> Self {
        Self {
            params,
            shooter: None,
            target: None,
            effects,
            shot: false,
            pause: PauseSnapshot::default(),
        }
    }

    pub fn from_archetype(archetype: &BulletArchetype) -> Self {
        Self::new(archetype.params, Arc::clone(&archetype.effects))
    }

    pub fn is_paused(&self) -> bool {
        self.pause.paused
    }

    /// Whether the per-frame flight update should run.
    pub fn is_flying(&self) -> bool {
        self.shot && !self.pause.paused
    }
}
