//! Time-to-live component for deferred destruction.
//!
//! A [`Ttl`] counts down each frame and the entity is destroyed through
//! [`despawn_entity`](crate::systems::lifecycle::despawn_entity) when it
//! reaches zero. Because the countdown lives on the entity itself, destroying
//! the entity early cancels it: nothing is left pending that could fire
//! against a freed entity.
//!
//! Bullets get one from
//! [`initialize_effects`](crate::systems::bullet::initialize_effects) with
//! their `destroy_time`.
//!
//! # Related
//!
//! - [`crate::systems::ttl::ttl_system`] – system that updates and despawns entities

use bevy_ecs::prelude::Component;

/// Remaining lifetime in seconds.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ttl {
    pub remaining: f32,
}

impl Ttl {
    pub fn new(seconds: f32) -> Self {
        Ttl { remaining: seconds }
    }

    /// Advance by `dt`, returning true once expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
