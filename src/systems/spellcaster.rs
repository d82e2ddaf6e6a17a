//! Casting spells from input.
//!
//! [`spell_caster_system`] polls [`InputState`] once per frame for every
//! [`SpellCaster`]. A slot whose key is pressed and whose cooldown has run
//! out is cast and its cooldown restarted; every other slot counts its
//! cooldown down by the frame delta, floored at zero.
//!
//! Spells act on the caster and on the designated ally: the entity in the
//! `player` group, looked up at cast time.

use std::sync::Arc;

use bevy_ecs::prelude::*;
use glam::Vec3;
use log::{debug, warn};

use crate::components::group::{Group, PLAYER};
use crate::components::health::Health;
use crate::components::spellcaster::{Aim, SpellAction, SpellCaster, SpellDefinition};
use crate::components::worldposition::WorldPosition;
use crate::error::{GameplayError, GameplayResult};
use crate::resources::bus::publish_signal;
use crate::resources::input::InputState;
use crate::resources::worldtime::WorldTime;
use crate::systems::bullet::launch_bullet;

/// The entity in the `player` group, if any.
pub fn find_player(world: &mut World) -> Option<Entity> {
    let mut query = world.query::<(Entity, &Group)>();
    query
        .iter(world)
        .find(|(_, g)| g.is(PLAYER))
        .map(|(e, _)| e)
}

/// Perform `spell`'s action for `caster`. Does not touch cooldowns.
pub fn cast_spell(
    world: &mut World,
    caster: Entity,
    spell: &SpellDefinition,
) -> GameplayResult<()> {
    if world.get_entity(caster).is_err() {
        return Err(GameplayError::DeadEntity(caster));
    }
    let ally = find_player(world);
    debug!("{} casts '{}' (ally {:?})", caster, spell.id, ally);

    match &spell.action {
        SpellAction::Projectile {
            bullet,
            spawn_offset,
        } => {
            let origin = world
                .get::<WorldPosition>(caster)
                .map(|p| p.pos)
                .ok_or(GameplayError::MissingComponent {
                    entity: caster,
                    component: "WorldPosition",
                })?;
            let target = ally.filter(|a| *a != caster);
            let toward_target = target
                .and_then(|t| world.get::<WorldPosition>(t))
                .map(|p| (p.pos - origin).normalize_or_zero())
                .filter(|d| *d != Vec3::ZERO);
            let direction = toward_target.unwrap_or_else(|| {
                world
                    .get::<Aim>(caster)
                    .copied()
                    .unwrap_or_default()
                    .0
                    .normalize_or_zero()
            });
            let position = origin + direction * *spawn_offset;
            launch_bullet(world, bullet, position, direction, caster, target)?;
        }
        SpellAction::Heal { amount } => {
            let Some(ally) = ally else {
                warn!("'{}' has no ally to heal", spell.id);
                return Ok(());
            };
            if let Some(mut health) = world.get_mut::<Health>(ally) {
                health.heal(*amount);
            }
        }
        SpellAction::EmitSignal { signal } => {
            publish_signal(world, caster, signal.as_str());
        }
    }
    Ok(())
}

/// Per-frame cooldown bookkeeping and key-driven casting.
pub fn spell_caster_system(world: &mut World) {
    let dt = world.get_resource::<WorldTime>().map_or(0.0, |t| t.delta);

    let mut casts: Vec<(Entity, Arc<SpellDefinition>)> = Vec::new();
    let pressed = |world: &World, key| {
        world
            .get_resource::<InputState>()
            .is_some_and(|input| input.is_key_pressed(key))
    };

    let mut query = world.query::<(Entity, &SpellCaster)>();
    let casters: Vec<Entity> = query.iter(world).map(|(e, _)| e).collect();

    for caster in casters {
        let keys: Vec<_> = match world.get::<SpellCaster>(caster) {
            Some(sc) => sc.slots.iter().map(|s| s.spell.key).collect(),
            None => continue,
        };
        let down: Vec<bool> = keys.iter().map(|k| pressed(world, *k)).collect();

        let Some(mut sc) = world.get_mut::<SpellCaster>(caster) else {
            continue;
        };
        for (slot, is_down) in sc.slots.iter_mut().zip(down) {
            if is_down && slot.is_ready() {
                slot.start_cooldown();
                casts.push((caster, Arc::clone(&slot.spell)));
            } else {
                slot.tick(dt);
            }
        }
    }

    for (caster, spell) in casts {
        if let Err(err) = cast_spell(world, caster, &spell) {
            warn!("{} failed to cast '{}': {}", caster, spell.id, err);
        }
    }
}
