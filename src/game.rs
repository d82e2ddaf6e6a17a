//! World setup, the per-frame schedule and the headless demo scene.
//!
//! A host drives the gameplay layer like this:
//!
//! ```ignore
//! let mut world = init_world(config);
//! register_observers(&mut world);
//! let mut update = build_update_schedule();
//! loop {
//!     // feed InputState, report contacts with notify_contact
//!     update_world_time(&mut world, dt);
//!     update.run(&mut world);
//!     end_frame(&mut world);
//! }
//! ```

use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use glam::Vec3;
use log::info;

use crate::components::bullet::Bullet;
use crate::components::dialogue::DialogueSequencer;
use crate::components::group::{ENEMY, Group, PLAYER};
use crate::components::health::Health;
use crate::components::interactable::Interactable;
use crate::components::rigidbody::RigidBody;
use crate::components::spellcaster::{Aim, SpellCaster};
use crate::components::stats::{StatKind, Stats};
use crate::components::worldposition::WorldPosition;
use crate::error::GameplayResult;
use crate::events::contact::{ContactEvent, notify_contact};
use crate::resources::bus::teardown_buses;
use crate::resources::content::ContentLibrary;
use crate::resources::dialogueui::{DialogueUi, UiGroups};
use crate::resources::gameconfig::GameConfig;
use crate::resources::input::{InputState, Key};
use crate::resources::rng::GameRng;
use crate::resources::worldtime::WorldTime;
use crate::systems::bullet::{bullet_contact_observer, bullet_flight_system, trail_system};
use crate::systems::dialogue::{
    dialogue_input_system, dialogue_proximity_observer, dialogue_system,
    spawn_dialogue_sequencer,
};
use crate::systems::interactable::{interact, spawn_interactable};
use crate::systems::movement::movement_system;
use crate::systems::spellcaster::spell_caster_system;
use crate::systems::ttl::ttl_system;

/// Build a world holding every collaborator resource the gameplay systems
/// read.
pub fn init_world(config: GameConfig) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(InputState {
        interact_key: config.interact_key,
        ..InputState::default()
    });
    world.insert_resource(GameRng::from_seed(config.rng_seed));
    world.insert_resource(DialogueUi::new());
    world.insert_resource(UiGroups::default());
    world.insert_resource(config);
    world
}

/// Register the contact observers (bullet hits and dialogue proximity).
pub fn register_observers(world: &mut World) {
    world.spawn(Observer::new(bullet_contact_observer));
    world.spawn(Observer::new(dialogue_proximity_observer));
    // Ensure the observers are registered before any contact is reported.
    world.flush();
}

/// The per-frame gameplay schedule, in execution order.
pub fn build_update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            spell_caster_system,
            dialogue_input_system,
            bullet_flight_system,
            movement_system,
            trail_system,
            ttl_system,
            dialogue_system,
        )
            .chain(),
    );
    update
}

/// Forget this frame's input and change trackers.
pub fn end_frame(world: &mut World) {
    if let Some(mut input) = world.get_resource_mut::<InputState>() {
        input.end_frame();
    }
    world.clear_trackers();
}

/// Drop the process-scoped buses.
pub fn shutdown(world: &mut World) {
    teardown_buses(world);
    info!("gameplay world shut down");
}

/// Entities of the demo scene.
#[derive(Debug, Clone, Copy)]
pub struct DemoScene {
    pub player: Entity,
    pub enemy: Entity,
    pub lever: Entity,
    pub door: Entity,
    pub npc: Entity,
}

/// Spawn a small scene: a spell-casting player facing an enemy, a lever that
/// opens a door, and an NPC whose dialogue starts once the door opens.
pub fn setup_demo_scene(world: &mut World, content: &ContentLibrary) -> GameplayResult<DemoScene> {
    let (max_spells, policy) = {
        let config = world.get_resource_or_insert_with(GameConfig::new);
        (config.max_spells, config.spell_limit_policy())
    };

    let spells = content.all_spells();
    let player = world
        .spawn((
            Group::new(PLAYER),
            WorldPosition::new(0.0, 0.0, 0.0),
            RigidBody::with_mass(70.0),
            Health::new(20.0),
            Stats::new()
                .with(StatKind::Intelligence, 20.0)
                .with(StatKind::Agility, 10.0)
                .with(StatKind::Luck, 5.0)
                .with(StatKind::Wisdom, 10.0),
            SpellCaster::new(spells, max_spells, policy),
            Aim(Vec3::X),
        ))
        .id();

    let enemy = world
        .spawn((
            Group::new(ENEMY),
            WorldPosition::new(6.0, 0.0, 0.0),
            RigidBody::with_mass(5.0),
            Health::new(10.0),
        ))
        .id();

    let lever = spawn_interactable(
        world,
        Interactable::new().sends(["open"]),
        WorldPosition::new(-2.0, 0.0, 0.0),
    );
    let door = spawn_interactable(
        world,
        Interactable::new().trigger_on(["open"]).sends(["opened"]),
        WorldPosition::new(-4.0, 0.0, 0.0),
    );

    let npc = spawn_dialogue_sequencer(
        world,
        DialogueSequencer::new(content.dialogue("intro")?).triggered_by("opened"),
        WorldPosition::new(-5.0, 0.0, 0.0),
    )?;

    info!("demo scene ready: player {}, enemy {}", player, enemy);
    Ok(DemoScene {
        player,
        enemy,
        lever,
        door,
        npc,
    })
}

/// Scripted input for the demo: cast at frame 5, pull the lever at frame 60,
/// click through the dialogue every 20 frames afterwards.
pub fn demo_script(world: &mut World, scene: &DemoScene, frame: u64) {
    if let Some(mut input) = world.get_resource_mut::<InputState>() {
        if frame == 5 {
            input.press(Key::Q);
        }
        if frame > 60 && frame % 20 == 0 {
            input.release_mouse();
        }
    }
    if frame == 60 {
        interact(world, scene.lever, Some(scene.player), false);
    }
}

/// Stand-in for the host's trigger detection: report a contact for every
/// bullet within `radius` of a hittable entity.
pub fn detect_bullet_contacts(world: &mut World, radius: f32) {
    let mut bullets = world.query_filtered::<(Entity, &WorldPosition), With<Bullet>>();
    let bullet_positions: Vec<(Entity, Vec3)> =
        bullets.iter(world).map(|(e, p)| (e, p.pos)).collect();

    let mut bodies = world.query::<(Entity, &WorldPosition, &Group)>();
    let hittable: Vec<(Entity, Vec3)> = bodies
        .iter(world)
        .filter(|(_, _, g)| g.is_hittable())
        .map(|(e, p, _)| (e, p.pos))
        .collect();

    for (bullet, pos) in bullet_positions {
        for (other, other_pos) in &hittable {
            if world.get_entity(bullet).is_err() {
                break;
            }
            if pos.distance(*other_pos) <= radius {
                notify_contact(world, ContactEvent::trigger_enter(bullet, *other));
            }
        }
    }
}
