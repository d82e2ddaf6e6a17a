//! Spell casting driven by input through the update schedule.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec3;

use sporecast::components::bullet::{Bullet, BulletArchetype, BulletParams};
use sporecast::components::group::{ENEMY, Group, PLAYER};
use sporecast::components::health::Health;
use sporecast::components::rigidbody::RigidBody;
use sporecast::components::spellcaster::{
    Aim, SpellAction, SpellCaster, SpellDefinition, SpellLimitPolicy,
};
use sporecast::components::worldposition::WorldPosition;
use sporecast::game::{build_update_schedule, end_frame, init_world};
use sporecast::resources::bus::{Signal, subscribe_signal};
use sporecast::resources::content::ContentLibrary;
use sporecast::resources::gameconfig::GameConfig;
use sporecast::resources::input::{InputState, Key};
use sporecast::systems::spellcaster::cast_spell;
use sporecast::systems::time::update_world_time;

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[derive(Resource, Default)]
struct Heard(Vec<String>);

fn record(world: &mut World, _me: Entity, _source: Entity, signal: &Signal) {
    world.resource_mut::<Heard>().0.push(signal.to_string());
}

fn make_world() -> World {
    let mut world = init_world(GameConfig::new());
    world.init_resource::<Heard>();
    let listener = world.spawn_empty().id();
    subscribe_signal(&mut world, listener, record);
    world
}

fn frame(world: &mut World, schedule: &mut Schedule, dt: f32, keys: &[Key]) {
    {
        let mut input = world.resource_mut::<InputState>();
        for key in keys {
            input.press(*key);
        }
    }
    update_world_time(world, dt);
    schedule.run(world);
    end_frame(world);
}

fn spell(id: &str, key: Key, cooldown: f32, action: SpellAction) -> Arc<SpellDefinition> {
    Arc::new(SpellDefinition {
        id: id.into(),
        key,
        cooldown,
        action,
    })
}

fn bolt() -> SpellAction {
    SpellAction::Projectile {
        bullet: BulletArchetype::new(
            BulletParams {
                damage: 2.0,
                speed: 8.0,
                ..BulletParams::default()
            },
            Vec::new(),
        ),
        spawn_offset: 1.0,
    }
}

fn cooldown_of(world: &World, caster: Entity, id: &str) -> f32 {
    world
        .get::<SpellCaster>(caster)
        .and_then(|sc| sc.slot(id))
        .map(|slot| slot.cooldown_remaining)
        .unwrap()
}

fn bullets(world: &mut World) -> Vec<Entity> {
    let mut query = world.query_filtered::<Entity, With<Bullet>>();
    query.iter(world).collect()
}

#[test]
fn cooldown_blocks_recast_and_keeps_ticking_while_pressed() {
    let mut world = make_world();
    let mut schedule = build_update_schedule();
    let shout = spell(
        "shout",
        Key::R,
        1.0,
        SpellAction::EmitSignal {
            signal: "shout".into(),
        },
    );
    let caster = world
        .spawn(SpellCaster::new(vec![shout], 5, SpellLimitPolicy::KeepFirst))
        .id();

    frame(&mut world, &mut schedule, 0.25, &[Key::R]);
    assert_eq!(world.resource::<Heard>().0, vec!["shout"]);
    assert_eq!(cooldown_of(&world, caster, "shout"), 1.0);

    frame(&mut world, &mut schedule, 0.25, &[]);
    assert!(approx_eq(cooldown_of(&world, caster, "shout"), 0.75));

    // Pressed on cooldown: no cast, but the countdown continues.
    frame(&mut world, &mut schedule, 0.25, &[Key::R]);
    assert_eq!(world.resource::<Heard>().0.len(), 1);
    assert!(approx_eq(cooldown_of(&world, caster, "shout"), 0.5));

    for _ in 0..3 {
        frame(&mut world, &mut schedule, 0.25, &[]);
    }
    assert_eq!(cooldown_of(&world, caster, "shout"), 0.0);

    frame(&mut world, &mut schedule, 0.25, &[Key::R]);
    assert_eq!(world.resource::<Heard>().0, vec!["shout", "shout"]);
}

#[test]
fn other_keys_do_not_cast() {
    let mut world = make_world();
    let mut schedule = build_update_schedule();
    let shout = spell(
        "shout",
        Key::R,
        1.0,
        SpellAction::EmitSignal {
            signal: "shout".into(),
        },
    );
    world.spawn(SpellCaster::new(vec![shout], 5, SpellLimitPolicy::KeepFirst));

    frame(&mut world, &mut schedule, 0.1, &[Key::Q, Key::E]);
    assert!(world.resource::<Heard>().0.is_empty());
}

#[test]
fn player_projectile_fires_along_aim() {
    let mut world = make_world();
    let mut schedule = build_update_schedule();
    let player = world
        .spawn((
            Group::new(PLAYER),
            WorldPosition::new(0.0, 0.0, 0.0),
            RigidBody::new(),
            Aim(Vec3::new(0.0, 2.0, 0.0)),
            SpellCaster::new(
                vec![spell("bolt", Key::Q, 0.5, bolt())],
                5,
                SpellLimitPolicy::KeepFirst,
            ),
        ))
        .id();

    frame(&mut world, &mut schedule, 0.0, &[Key::Q]);

    let fired = bullets(&mut world);
    assert_eq!(fired.len(), 1);
    let bullet = world.get::<Bullet>(fired[0]).unwrap();
    assert!(bullet.shot);
    assert_eq!(bullet.shooter, Some(player));
    assert_eq!(bullet.target, None);
    let velocity = world.get::<RigidBody>(fired[0]).unwrap().velocity;
    assert!(approx_eq(velocity.x, 0.0));
    assert!(approx_eq(velocity.y, 8.0));
    let pos = world.get::<WorldPosition>(fired[0]).unwrap().pos;
    assert!(approx_eq(pos.y, 1.0));
}

#[test]
fn enemy_projectile_fires_at_player() {
    let mut world = make_world();
    let player = world
        .spawn((Group::new(PLAYER), WorldPosition::new(0.0, 0.0, 0.0)))
        .id();
    let enemy = world
        .spawn((
            Group::new(ENEMY),
            WorldPosition::new(10.0, 0.0, 0.0),
            Aim(Vec3::X),
        ))
        .id();
    let bolt = spell("bolt", Key::Q, 0.5, bolt());

    cast_spell(&mut world, enemy, &bolt).unwrap();

    let fired = bullets(&mut world);
    assert_eq!(fired.len(), 1);
    let bullet = world.get::<Bullet>(fired[0]).unwrap();
    assert_eq!(bullet.target, Some(player));
    let velocity = world.get::<RigidBody>(fired[0]).unwrap().velocity;
    assert!(approx_eq(velocity.x, -8.0));
    let pos = world.get::<WorldPosition>(fired[0]).unwrap().pos;
    assert!(approx_eq(pos.x, 9.0));
}

#[test]
fn projectile_without_position_fails_cleanly() {
    let mut world = make_world();
    let caster = world.spawn(Group::new(ENEMY)).id();
    let bolt = spell("bolt", Key::Q, 0.5, bolt());

    assert!(cast_spell(&mut world, caster, &bolt).is_err());
    assert!(bullets(&mut world).is_empty());
}

#[test]
fn heal_restores_player_health() {
    let mut world = make_world();
    let mut schedule = build_update_schedule();
    let mut health = Health::new(10.0);
    health.damage(6.0);
    let player = world.spawn((Group::new(PLAYER), health)).id();
    let shaman = world
        .spawn(SpellCaster::new(
            vec![spell("mend", Key::F, 2.0, SpellAction::Heal { amount: 5.0 })],
            5,
            SpellLimitPolicy::KeepFirst,
        ))
        .id();

    frame(&mut world, &mut schedule, 0.1, &[Key::F]);
    assert_eq!(world.get::<Health>(player).unwrap().current, 9.0);
    assert_eq!(cooldown_of(&world, shaman, "mend"), 2.0);

    frame(&mut world, &mut schedule, 2.0, &[]);
    frame(&mut world, &mut schedule, 0.1, &[Key::F]);
    assert_eq!(world.get::<Health>(player).unwrap().current, 10.0);
}

#[test]
fn heal_without_player_is_noop() {
    let mut world = make_world();
    let caster = world.spawn(Health::new(10.0)).id();
    let mend = spell("mend", Key::F, 2.0, SpellAction::Heal { amount: 5.0 });

    assert!(cast_spell(&mut world, caster, &mend).is_ok());
}

#[test]
fn caster_built_from_content_shares_definitions() {
    let json = r#"{
        "spells": [
            { "id": "a", "key": "q", "cooldown": 1.0,
              "action": { "type": "emit_signal", "signal": "a" } },
            { "id": "b", "key": "w", "cooldown": 1.0,
              "action": { "type": "heal", "amount": 1.0 } }
        ]
    }"#;
    let content = ContentLibrary::from_json_str(json).unwrap();
    let spells = content.spells(&["a", "b", "a", "b"]).unwrap();
    assert!(Arc::ptr_eq(&spells[0], &spells[2]));

    let caster = SpellCaster::new(spells, 5, SpellLimitPolicy::KeepFirst);
    assert_eq!(caster.spell_ids(), vec!["a", "b"]);
    assert!(content.spell("missing").is_err());
}
