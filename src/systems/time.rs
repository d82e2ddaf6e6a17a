//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Advance `WorldTime` by the unscaled frame delta `dt`.
///
/// Writes the scaled delta, accumulates `elapsed` and counts the frame.
pub fn update_world_time(world: &mut World, dt: f32) {
    let mut wt = world.get_resource_or_insert_with(WorldTime::default);
    let scaled_dt = dt * wt.time_scale;
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame_count += 1;
}
