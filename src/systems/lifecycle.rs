//! Entity destruction that keeps the buses consistent.
//!
//! Every gameplay path that destroys an entity (bullet hits, distance and
//! lifetime expiry) goes through [`despawn_entity`], which drops the entity's
//! bus subscriptions before despawning it. Deferred work that belongs to the
//! entity (its [`Ttl`](crate::components::ttl::Ttl), trail reset countdown
//! or dialogue task) is stored on the entity and dies with it.
//!
//! A dialogue sequencer that is still playing is cancelled first, so the
//! world it paused is resumed and the in-game UI comes back.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::dialogue::DialogueSequencer;
use crate::resources::bus::unsubscribe_all;
use crate::systems::dialogue::cancel_dialogue;

/// Cancel any running dialogue on `entity`, unsubscribe it from both buses
/// and despawn it.
///
/// Returns false if the entity was already gone.
pub fn despawn_entity(world: &mut World, entity: Entity) -> bool {
    if world
        .get::<DialogueSequencer>(entity)
        .is_some_and(DialogueSequencer::is_running)
    {
        cancel_dialogue(world, entity);
    }
    unsubscribe_all(world, entity);
    let despawned = world.despawn(entity);
    if despawned {
        debug!("despawned {}", entity);
    }
    despawned
}

/// Whether `entity` still exists in the world.
pub fn is_alive(world: &World, entity: Entity) -> bool {
    world.get_entity(entity).is_ok()
}
