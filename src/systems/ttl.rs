//! Time-to-live expiry.
//!
//! [`ttl_system`] counts every [`Ttl`](crate::components::ttl::Ttl) down by
//! the frame delta and destroys entities whose time ran out. Destruction goes
//! through [`despawn_entity`] so bus subscriptions are dropped with the
//! entity.
//!
//! The countdown keeps running while bullets are paused.

use bevy_ecs::prelude::*;

use crate::components::ttl::Ttl;
use crate::resources::worldtime::WorldTime;
use crate::systems::lifecycle::despawn_entity;

/// Decrement TTLs and despawn expired entities.
pub fn ttl_system(world: &mut World) {
    let dt = world.get_resource::<WorldTime>().map_or(0.0, |t| t.delta);
    let mut query = world.query::<(Entity, &mut Ttl)>();
    let expired: Vec<Entity> = query
        .iter_mut(world)
        .filter_map(|(entity, mut ttl)| ttl.tick(dt).then_some(entity))
        .collect();
    for entity in expired {
        despawn_entity(world, entity);
    }
}
