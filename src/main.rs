//! Headless demo runner.
//!
//! Loads the configuration and content, builds the demo scene and runs a
//! fixed number of frames with scripted input, logging what happens.

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use sporecast::game::{
    build_update_schedule, demo_script, detect_bullet_contacts, end_frame, init_world,
    register_observers, setup_demo_scene, shutdown,
};
use sporecast::resources::content::ContentLibrary;
use sporecast::resources::dialogueui::{DialogueUi, UiGroup, UiGroups};
use sporecast::resources::gameconfig::GameConfig;
use sporecast::systems::time::update_world_time;

/// Sporecast gameplay core, headless demo.
#[derive(Parser)]
#[command(version, about = "Runs the gameplay core headless with a scripted demo scene.")]
struct Cli {
    /// INI configuration file. Defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON content file with spells and dialogues.
    #[arg(long, value_name = "PATH", default_value = "assets/demo/content.json")]
    content: PathBuf,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed for gameplay rolls. Overrides `[rng] seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = GameConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                error!("{}", e);
                std::process::exit(1);
            }
            config
        }
        None => GameConfig::new(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }

    let content = match ContentLibrary::load_from_file(&cli.content) {
        Ok(content) => content,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut world = init_world(config);
    register_observers(&mut world);
    let scene = match setup_demo_scene(&mut world, &content) {
        Ok(scene) => scene,
        Err(e) => {
            error!("Failed to set up demo scene: {}", e);
            std::process::exit(1);
        }
    };

    let mut update = build_update_schedule();
    if let Err(e) = update.initialize(&mut world) {
        error!("Failed to initialize schedule: {}", e);
        std::process::exit(1);
    }

    let mut dialogue_open = false;
    for frame in 0..cli.frames {
        demo_script(&mut world, &scene, frame);
        update_world_time(&mut world, cli.dt);
        update.run(&mut world);
        detect_bullet_contacts(&mut world, 0.5);

        let showing = world
            .get_resource::<UiGroups>()
            .is_some_and(|g| g.is_visible(UiGroup::Dialogue));
        if let Some(mut ui) = world.get_resource_mut::<DialogueUi>() {
            for animation in ui.drain_animations() {
                info!("[frame {}] play animation '{}'", frame, animation.name);
            }
            if showing != dialogue_open {
                info!("[frame {}] dialogue box {}", frame, if showing { "shown" } else { "hidden" });
                dialogue_open = showing;
            }
            if showing && frame % 20 == 0 && !ui.text.is_empty() {
                info!("[frame {}] \"{}\"", frame, ui.text);
            }
        }

        end_frame(&mut world);
    }

    shutdown(&mut world);
}
