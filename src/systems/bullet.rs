//! Projectile lifecycle.
//!
//! - [`spawn_bullet`] builds a bullet entity from a [`BulletArchetype`] and
//!   subscribes it to the event bus for pause/resume.
//! - [`initialize_effects`] runs on-creation effects and arms the lifetime.
//! - [`fire_bullet`] applies the shooter's stats and launches the body;
//!   [`after_fire_effects`] then runs the on-shot effects.
//! - [`bullet_flight_system`] does the per-frame distance check and on-flight
//!   effects.
//! - [`bullet_contact_observer`] resolves hits reported by the host.
//! - [`trail_system`] counts down the trail reset scheduled on resume.
//!
//! A bullet is only ever destroyed through
//! [`despawn_entity`](crate::systems::lifecycle::despawn_entity), so its bus
//! subscription, lifetime and trail countdown go with it.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, warn};

use crate::components::bullet::{Bullet, BulletArchetype, ShooterStats};
use crate::components::group::{BULLET, Group};
use crate::components::rigidbody::RigidBody;
use crate::components::spelleffect::EffectPhase;
use crate::components::stats::Stats;
use crate::components::trail::Trail;
use crate::components::ttl::Ttl;
use crate::components::worldposition::WorldPosition;
use crate::error::{GameplayError, GameplayResult};
use crate::events::contact::{ContactEvent, ContactKind, ContactPhase};
use crate::events::gameevent::GameEvent;
use crate::resources::bus::subscribe_event;
use crate::resources::gameconfig::GameConfig;
use crate::resources::rng::GameRng;
use crate::resources::worldtime::WorldTime;
use crate::systems::lifecycle::{despawn_entity, is_alive};
use crate::systems::spelleffect::{HitInfo, run_effects};

/// Spawn a bullet at `position` from `archetype`. The bullet is inert until
/// fired.
pub fn spawn_bullet(world: &mut World, archetype: &BulletArchetype, position: Vec3) -> Entity {
    let mut entity = world.spawn((
        Bullet::from_archetype(archetype),
        RigidBody::with_mass(archetype.mass),
        WorldPosition::from_vec(position),
        Group::new(BULLET),
    ));
    if archetype.trail {
        let trail_time = entity
            .world()
            .get_resource::<GameConfig>()
            .map_or(GameConfig::new().trail_time, |c| c.trail_time);
        entity.insert(Trail::new(trail_time));
    }
    let id = entity.id();
    subscribe_event(world, id, bullet_event_callback);
    debug!("spawned bullet {} at {}", id, position);
    id
}

fn require_bullet(world: &World, bullet: Entity) -> GameplayResult<()> {
    if !is_alive(world, bullet) {
        return Err(GameplayError::DeadEntity(bullet));
    }
    if world.get::<Bullet>(bullet).is_none() {
        return Err(GameplayError::MissingComponent {
            entity: bullet,
            component: "Bullet",
        });
    }
    Ok(())
}

/// Run on-creation effects, then schedule self-destruction after
/// `destroy_time`.
pub fn initialize_effects(world: &mut World, bullet: Entity) -> GameplayResult<()> {
    require_bullet(world, bullet)?;
    run_effects(world, bullet, EffectPhase::OnCreation, HitInfo::default());

    if let Some(destroy_time) = world.get::<Bullet>(bullet).map(|b| b.params.destroy_time) {
        world.entity_mut(bullet).insert(Ttl::new(destroy_time));
    }
    Ok(())
}

/// Scale the bullet by `shooter`'s stats and launch it along `direction`.
///
/// The impulse is `direction * speed` with `direction` used as given, so
/// callers pass a unit vector unless they want the launch scaled. A shooter
/// without [`Stats`] fires with all stats at zero.
pub fn fire_bullet(
    world: &mut World,
    bullet: Entity,
    direction: Vec3,
    shooter: Entity,
    target: Option<Entity>,
) -> GameplayResult<()> {
    require_bullet(world, bullet)?;
    if world.get::<RigidBody>(bullet).is_none() {
        return Err(GameplayError::MissingComponent {
            entity: bullet,
            component: "RigidBody",
        });
    }

    let stats = world
        .get::<Stats>(shooter)
        .map(ShooterStats::from)
        .unwrap_or_default();
    let jitter = world
        .get_resource_or_insert_with(GameRng::default)
        .luck_jitter();

    let mut entity = world.entity_mut(bullet);
    let speed = {
        let Some(mut b) = entity.get_mut::<Bullet>() else {
            return Err(GameplayError::DeadEntity(bullet));
        };
        b.params = b.params.scaled(&stats, jitter);
        b.shooter = Some(shooter);
        b.target = target;
        b.params.speed
    };
    if let Some(mut rb) = entity.get_mut::<RigidBody>() {
        rb.apply_impulse(direction * speed);
    }
    if let Some(mut b) = entity.get_mut::<Bullet>() {
        b.shot = true;
    }
    debug!(
        "fired bullet {} from {} at speed {} (target {:?})",
        bullet, shooter, speed, target
    );
    Ok(())
}

/// Run on-shot effects. Called right after [`fire_bullet`].
pub fn after_fire_effects(world: &mut World, bullet: Entity) -> GameplayResult<()> {
    require_bullet(world, bullet)?;
    run_effects(world, bullet, EffectPhase::OnShot, HitInfo::default());
    Ok(())
}

/// Per-frame update of launched, unpaused bullets.
///
/// A bullet farther than `destroy_distance` from its shooter is destroyed and
/// runs no flight effects that frame. The check is skipped when the shooter
/// no longer exists; the lifetime still reaps the bullet.
pub fn bullet_flight_system(world: &mut World) {
    let mut query = world.query::<(Entity, &Bullet)>();
    let flying: Vec<Entity> = query
        .iter(world)
        .filter(|(_, b)| b.is_flying())
        .map(|(e, _)| e)
        .collect();

    for bullet in flying {
        let Some((shooter, limit)) = world
            .get::<Bullet>(bullet)
            .map(|b| (b.shooter, b.params.destroy_distance))
        else {
            continue;
        };
        let shooter_pos = shooter
            .and_then(|s| world.get::<WorldPosition>(s))
            .map(|p| p.pos);
        let bullet_pos = world.get::<WorldPosition>(bullet).map(|p| p.pos);

        if let (Some(from), Some(pos)) = (shooter_pos, bullet_pos) {
            if pos.distance(from) > limit {
                debug!("bullet {} exceeded {} from shooter", bullet, limit);
                despawn_entity(world, bullet);
                continue;
            }
        }

        run_effects(world, bullet, EffectPhase::OnFlight, HitInfo::default());
    }
}

/// Event bus callback: freeze on pause, restore on resume.
pub fn bullet_event_callback(world: &mut World, bullet: Entity, _source: Entity, event: &GameEvent) {
    match event {
        GameEvent::Paused => pause_bullet(world, bullet),
        GameEvent::Resumed => resume_bullet(world, bullet),
    }
}

fn now(world: &World) -> f32 {
    world.get_resource::<WorldTime>().map_or(0.0, |t| t.elapsed)
}

/// Save the velocity, stop the body and freeze the trail. Ignored when the
/// bullet is already paused.
pub fn pause_bullet(world: &mut World, bullet: Entity) {
    let time = now(world);
    let Ok(mut entity) = world.get_entity_mut(bullet) else {
        return;
    };
    let velocity = entity
        .get::<RigidBody>()
        .map_or(Vec3::ZERO, |rb| rb.velocity);
    {
        let Some(mut b) = entity.get_mut::<Bullet>() else {
            return;
        };
        if b.pause.paused {
            return;
        }
        b.pause.paused = true;
        b.pause.velocity = velocity;
        b.pause.pause_time = time;
    }

    if let Some(mut rb) = entity.get_mut::<RigidBody>() {
        rb.set_velocity(Vec3::ZERO);
    }
    if let Some(mut trail) = entity.get_mut::<Trail>() {
        trail.freeze();
    }
}

/// Restore the saved velocity and stretch the trail over the paused time.
/// Ignored when the bullet is not paused.
pub fn resume_bullet(world: &mut World, bullet: Entity) {
    let time = now(world);
    let Ok(mut entity) = world.get_entity_mut(bullet) else {
        return;
    };
    let (velocity, paused_for) = {
        let Some(mut b) = entity.get_mut::<Bullet>() else {
            return;
        };
        if !b.pause.paused {
            return;
        }
        b.pause.paused = false;
        b.pause.resume_time = time;
        (b.pause.velocity, b.pause.resume_time - b.pause.pause_time)
    };

    if let Some(mut rb) = entity.get_mut::<RigidBody>() {
        rb.set_velocity(velocity);
    }
    if let Some(mut trail) = entity.get_mut::<Trail>() {
        trail.resume(paused_for);
    }
}

/// Resolve a contact reported for a bullet.
///
/// - trigger with a hittable entity other than the shooter: on-hit effects
///   against that entity, then destruction
/// - collision with another bullet: ignored
/// - any other collision: on-hit effects with no target at the contact
///   point, then destruction
///
/// Returns true when the bullet was consumed.
pub fn handle_bullet_contact(world: &mut World, contact: &ContactEvent) -> bool {
    if contact.phase != ContactPhase::Enter {
        return false;
    }
    let bullet = contact.entity;
    let Some(shooter) = world.get::<Bullet>(bullet).map(|b| b.shooter) else {
        return false;
    };
    let other_group = world.get::<Group>(contact.other);

    let hit = match contact.kind {
        ContactKind::Trigger => {
            let hittable = other_group.is_some_and(Group::is_hittable);
            if !hittable || Some(contact.other) == shooter {
                return false;
            }
            HitInfo::target(contact.other)
        }
        ContactKind::Collision => {
            if other_group.is_some_and(|g| g.is(BULLET)) {
                return false;
            }
            HitInfo::impact(contact.point)
        }
    };

    debug!("bullet {} hit {} ({:?})", bullet, contact.other, contact.kind);
    run_effects(world, bullet, EffectPhase::OnHit, hit);
    despawn_entity(world, bullet);
    true
}

/// Observer forwarding contacts on bullets to [`handle_bullet_contact`].
pub fn bullet_contact_observer(
    trigger: On<ContactEvent>,
    bullets: Query<(), With<Bullet>>,
    mut commands: Commands,
) {
    let contact = *trigger.event();
    if bullets.get(contact.entity).is_err() {
        return;
    }
    commands.queue(move |world: &mut World| {
        handle_bullet_contact(world, &contact);
    });
}

/// Count down trail resets scheduled by [`resume_bullet`].
pub fn trail_system(world_time: Option<Res<WorldTime>>, mut query: Query<(Entity, &mut Trail)>) {
    let dt = world_time.map_or(0.0, |t| t.delta);
    for (entity, mut trail) in query.iter_mut() {
        if trail.tick(dt) {
            debug!("trail of {} back to {}", entity, trail.base_time);
        }
    }
}

/// Spawn, initialise, fire and run on-shot effects in one go.
///
/// On failure the half-built bullet is destroyed.
pub fn launch_bullet(
    world: &mut World,
    archetype: &BulletArchetype,
    position: Vec3,
    direction: Vec3,
    shooter: Entity,
    target: Option<Entity>,
) -> GameplayResult<Entity> {
    let bullet = spawn_bullet(world, archetype, position);
    let result = initialize_effects(world, bullet)
        .and_then(|_| fire_bullet(world, bullet, direction, shooter, target))
        .and_then(|_| after_fire_effects(world, bullet));
    if let Err(err) = result {
        warn!("failed to launch bullet {}: {}", bullet, err);
        despawn_entity(world, bullet);
        return Err(err);
    }
    Ok(bullet)
}
