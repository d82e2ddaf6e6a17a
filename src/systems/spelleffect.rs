//! Spell effect pipeline.
//!
//! [`run_effects`] walks a bullet's effect list for one [`EffectPhase`] and
//! runs, in authored order, every effect whose phase mask contains it. Each
//! hook reads and writes the world directly: bullet parameters, rigid bodies
//! of the bullet, shooter and target, health of whatever is struck, and the
//! signal bus.
//!
//! Hooks never fail. A hook whose shooter or target is absent or despawned
//! does nothing, and a hook that emits a signal may cause the bullet itself
//! to be despawned; the walk stops as soon as the bullet is gone.

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, trace};

use crate::components::bullet::{Bullet, BulletParams};
use crate::components::health::Health;
use crate::components::rigidbody::RigidBody;
use crate::components::spelleffect::{EffectKind, EffectPhase};
use crate::components::worldposition::WorldPosition;
use crate::resources::bus::publish_signal;
use crate::resources::worldtime::WorldTime;
use crate::systems::lifecycle::is_alive;

/// Where the bullet struck. Only meaningful for [`EffectPhase::OnHit`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitInfo {
    /// Entity struck, if the hit was against a qualifying body.
    pub target: Option<Entity>,
    /// Contact point, for generic collisions.
    pub impact: Option<Vec3>,
}

impl HitInfo {
    pub fn target(target: Entity) -> Self {
        Self {
            target: Some(target),
            impact: None,
        }
    }

    pub fn impact(point: Option<Vec3>) -> Self {
        Self {
            target: None,
            impact: point,
        }
    }
}

/// Run every effect of `bullet` authored for `phase`, in order.
///
/// Returns the number of hooks that ran.
pub fn run_effects(world: &mut World, bullet: Entity, phase: EffectPhase, hit: HitInfo) -> usize {
    let Some(effects) = world.get::<Bullet>(bullet).map(|b| b.effects.clone()) else {
        return 0;
    };

    let mut ran = 0;
    for effect in effects.iter().filter(|e| e.runs_in(phase)) {
        if !is_alive(world, bullet) {
            debug!("bullet {} gone during {:?} effects", bullet, phase);
            break;
        }
        if !effect.kind.supported_phases().contains(phase) {
            trace!("{:?} has no {:?} behaviour", effect.kind, phase);
            continue;
        }
        apply_effect(world, bullet, &effect.kind, hit);
        ran += 1;
    }
    ran
}

fn apply_effect(world: &mut World, bullet: Entity, kind: &EffectKind, hit: HitInfo) {
    match kind {
        EffectKind::Empower {
            damage_factor,
            speed_factor,
        } => {
            if let Some(mut b) = world.get_mut::<Bullet>(bullet) {
                b.params.damage *= damage_factor;
                b.params.speed *= speed_factor;
            }
        }
        EffectKind::Recoil { force } => recoil(world, bullet, *force),
        EffectKind::Accelerate { rate } => {
            let dt = delta(world);
            if let Some(mut rb) = world.get_mut::<RigidBody>(bullet) {
                let factor = (1.0 + rate * dt).max(0.0);
                rb.velocity *= factor;
            }
        }
        EffectKind::Homing { turn_rate } => homing(world, bullet, *turn_rate),
        EffectKind::Damage { scale } => {
            let Some(target) = hit.target else {
                return;
            };
            let Some(damage) = params(world, bullet).map(|p| p.damage * scale) else {
                return;
            };
            if let Some(mut health) = world.get_mut::<Health>(target) {
                health.damage(damage);
                debug!("{} takes {} damage from {}", target, damage, bullet);
            }
        }
        EffectKind::Knockback { force } => knockback(world, bullet, hit, *force),
        EffectKind::Explosion { radius, damage } => explosion(world, bullet, hit, *radius, *damage),
        EffectKind::EmitSignal { signal } => {
            publish_signal(world, bullet, signal.as_str());
        }
    }
}

fn delta(world: &World) -> f32 {
    world.get_resource::<WorldTime>().map_or(0.0, |t| t.delta)
}

fn params(world: &World, bullet: Entity) -> Option<BulletParams> {
    world.get::<Bullet>(bullet).map(|b| b.params)
}

fn position(world: &World, entity: Entity) -> Option<Vec3> {
    world.get::<WorldPosition>(entity).map(|p| p.pos)
}

fn travel_direction(world: &World, bullet: Entity) -> Vec3 {
    let velocity = match (world.get::<Bullet>(bullet), world.get::<RigidBody>(bullet)) {
        (Some(b), _) if b.is_paused() => b.pause.velocity,
        (_, Some(rb)) => rb.velocity,
        _ => Vec3::ZERO,
    };
    velocity.normalize_or_zero()
}

fn recoil(world: &mut World, bullet: Entity, force: f32) {
    let Some(shooter) = world.get::<Bullet>(bullet).and_then(|b| b.shooter) else {
        return;
    };
    let direction = travel_direction(world, bullet);
    if let Some(mut rb) = world.get_mut::<RigidBody>(shooter) {
        rb.apply_impulse(-direction * force);
    }
}

fn homing(world: &mut World, bullet: Entity, turn_rate: f32) {
    let Some(target) = world.get::<Bullet>(bullet).and_then(|b| b.target) else {
        return;
    };
    let (Some(from), Some(to)) = (position(world, bullet), position(world, target)) else {
        return;
    };
    let desired = (to - from).normalize_or_zero();
    if desired == Vec3::ZERO {
        return;
    }
    let t = (turn_rate * delta(world)).clamp(0.0, 1.0);
    if let Some(mut rb) = world.get_mut::<RigidBody>(bullet) {
        let speed = rb.velocity.length();
        let heading = rb.velocity.normalize_or_zero().lerp(desired, t).normalize_or_zero();
        rb.velocity = heading * speed;
    }
}

fn knockback(world: &mut World, bullet: Entity, hit: HitInfo, force: f32) {
    let Some(target) = hit.target else {
        return;
    };
    let Some(multiplier) = params(world, bullet).map(|p| p.knockback_multiplier) else {
        return;
    };
    let direction = travel_direction(world, bullet);
    if let Some(mut rb) = world.get_mut::<RigidBody>(target) {
        rb.apply_impulse(direction * force * multiplier);
    }
}

fn explosion(world: &mut World, bullet: Entity, hit: HitInfo, radius: f32, damage: f32) {
    if radius <= 0.0 {
        return;
    }
    let Some(p) = params(world, bullet) else {
        return;
    };
    let Some(center) = hit.impact.or_else(|| position(world, bullet)) else {
        return;
    };

    let mut query = world.query_filtered::<(Entity, &WorldPosition), With<Health>>();
    let victims: Vec<(Entity, f32)> = query
        .iter(world)
        .filter(|(e, _)| *e != bullet)
        .map(|(e, pos)| (e, pos.pos.distance(center)))
        .filter(|(_, d)| *d <= radius)
        .collect();

    for (entity, distance) in victims {
        let fade = (1.0 - p.explosion_falloff * distance / radius).max(0.0);
        let amount = damage * p.explosive_multiplier * fade;
        if let Some(mut health) = world.get_mut::<Health>(entity) {
            health.damage(amount);
            debug!("explosion from {} deals {} to {}", bullet, amount, entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::components::spelleffect::{PhaseMask, SpellEffect};
    use crate::resources::bus::{Signal, subscribe_signal};

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn bullet_with(world: &mut World, effects: Vec<SpellEffect>) -> Entity {
        let params = BulletParams {
            damage: 4.0,
            ..BulletParams::default()
        };
        world
            .spawn((
                Bullet::new(params, Arc::from(effects)),
                RigidBody::new(),
                WorldPosition::new(0.0, 0.0, 0.0),
            ))
            .id()
    }

    #[test]
    fn test_only_matching_phase_runs() {
        let mut world = World::new();
        let bullet = bullet_with(
            &mut world,
            vec![
                SpellEffect::natural(EffectKind::Empower {
                    damage_factor: 2.0,
                    speed_factor: 1.0,
                }),
                SpellEffect::natural(EffectKind::Damage { scale: 1.0 }),
            ],
        );
        assert_eq!(
            run_effects(&mut world, bullet, EffectPhase::OnCreation, HitInfo::default()),
            1
        );
        assert_eq!(world.get::<Bullet>(bullet).unwrap().params.damage, 8.0);
    }

    #[test]
    fn test_unsupported_phase_is_noop() {
        let mut world = World::new();
        let bullet = bullet_with(
            &mut world,
            vec![SpellEffect::new(
                PhaseMask::ON_FLIGHT,
                EffectKind::Damage { scale: 1.0 },
            )],
        );
        assert_eq!(
            run_effects(&mut world, bullet, EffectPhase::OnFlight, HitInfo::default()),
            0
        );
    }

    #[test]
    fn test_damage_without_target_is_noop() {
        let mut world = World::new();
        let bullet = bullet_with(
            &mut world,
            vec![SpellEffect::natural(EffectKind::Damage { scale: 1.0 })],
        );
        let bystander = world.spawn(Health::new(10.0)).id();
        run_effects(&mut world, bullet, EffectPhase::OnHit, HitInfo::impact(None));
        assert_eq!(world.get::<Health>(bystander).unwrap().current, 10.0);
    }

    #[test]
    fn test_damage_and_knockback_hit_target() {
        let mut world = World::new();
        let bullet = bullet_with(
            &mut world,
            vec![
                SpellEffect::natural(EffectKind::Damage { scale: 0.5 }),
                SpellEffect::natural(EffectKind::Knockback { force: 3.0 }),
            ],
        );
        world.get_mut::<RigidBody>(bullet).unwrap().velocity = Vec3::new(10.0, 0.0, 0.0);
        let target = world.spawn((Health::new(10.0), RigidBody::new())).id();
        run_effects(&mut world, bullet, EffectPhase::OnHit, HitInfo::target(target));
        assert!(approx_eq(world.get::<Health>(target).unwrap().current, 8.0));
        assert!(approx_eq(world.get::<RigidBody>(target).unwrap().velocity.x, 3.0));
    }

    #[test]
    fn test_explosion_falls_off_with_distance() {
        let mut world = World::new();
        let bullet = bullet_with(
            &mut world,
            vec![SpellEffect::natural(EffectKind::Explosion {
                radius: 4.0,
                damage: 10.0,
            })],
        );
        let near = world
            .spawn((Health::new(100.0), WorldPosition::new(0.0, 0.0, 0.0)))
            .id();
        let mid = world
            .spawn((Health::new(100.0), WorldPosition::new(2.0, 0.0, 0.0)))
            .id();
        let far = world
            .spawn((Health::new(100.0), WorldPosition::new(9.0, 0.0, 0.0)))
            .id();
        run_effects(
            &mut world,
            bullet,
            EffectPhase::OnHit,
            HitInfo::impact(Some(Vec3::ZERO)),
        );
        assert!(approx_eq(world.get::<Health>(near).unwrap().current, 90.0));
        assert!(approx_eq(world.get::<Health>(mid).unwrap().current, 95.0));
        assert_eq!(world.get::<Health>(far).unwrap().current, 100.0);
    }

    #[test]
    fn test_recoil_pushes_shooter_back() {
        let mut world = World::new();
        let shooter = world.spawn(RigidBody::new()).id();
        let bullet = bullet_with(
            &mut world,
            vec![SpellEffect::natural(EffectKind::Recoil { force: 2.0 })],
        );
        world.get_mut::<Bullet>(bullet).unwrap().shooter = Some(shooter);
        world.get_mut::<RigidBody>(bullet).unwrap().velocity = Vec3::new(0.0, 5.0, 0.0);
        run_effects(&mut world, bullet, EffectPhase::OnShot, HitInfo::default());
        assert!(approx_eq(world.get::<RigidBody>(shooter).unwrap().velocity.y, -2.0));
    }

    #[test]
    fn test_recoil_with_despawned_shooter_is_noop() {
        let mut world = World::new();
        let shooter = world.spawn(RigidBody::new()).id();
        let bullet = bullet_with(
            &mut world,
            vec![SpellEffect::natural(EffectKind::Recoil { force: 2.0 })],
        );
        world.get_mut::<Bullet>(bullet).unwrap().shooter = Some(shooter);
        world.despawn(shooter);
        assert_eq!(
            run_effects(&mut world, bullet, EffectPhase::OnShot, HitInfo::default()),
            1
        );
    }

    fn despawn_source(world: &mut World, _me: Entity, source: Entity, _signal: &Signal) {
        world.despawn(source);
    }

    #[test]
    fn test_walk_stops_when_bullet_despawned() {
        let mut world = World::new();
        let listener = world.spawn_empty().id();
        subscribe_signal(&mut world, listener, despawn_source);
        let bullet = bullet_with(
            &mut world,
            vec![
                SpellEffect::new(
                    PhaseMask::ON_HIT,
                    EffectKind::EmitSignal {
                        signal: "boom".into(),
                    },
                ),
                SpellEffect::natural(EffectKind::Damage { scale: 1.0 }),
            ],
        );
        let target = world.spawn(Health::new(10.0)).id();
        assert_eq!(
            run_effects(&mut world, bullet, EffectPhase::OnHit, HitInfo::target(target)),
            1
        );
        assert_eq!(world.get::<Health>(target).unwrap().current, 10.0);
    }
}
