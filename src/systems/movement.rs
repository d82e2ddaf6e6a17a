//! Position integration.
//!
//! Stands in for the host's physics step so bullets fly in the headless
//! binary and in tests: every [`RigidBody`] moves its
//! [`WorldPosition`] by `velocity * delta`.

use bevy_ecs::prelude::*;

use crate::components::rigidbody::RigidBody;
use crate::components::worldposition::WorldPosition;
use crate::resources::worldtime::WorldTime;

pub fn movement_system(
    mut query: Query<(&mut WorldPosition, &RigidBody)>,
    time: Option<Res<WorldTime>>,
) {
    let dt = time.map_or(0.0, |t| t.delta);
    for (mut position, rigidbody) in query.iter_mut() {
        position.pos += rigidbody.velocity * dt;
    }
}
