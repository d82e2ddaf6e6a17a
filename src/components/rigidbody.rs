//! Physical body handle mirrored from the host physics engine.
//!
//! The [`RigidBody`] component is the narrow interface gameplay code uses to
//! push things around: apply an impulse, read the current velocity, or set
//! it outright. The host engine integrates it (the bundled
//! [`movement_system`](crate::systems::movement::movement_system) stands in
//! for that in headless runs and tests).

use bevy_ecs::prelude::Component;
use glam::Vec3;
use log::warn;

/// Body with a velocity and a mass.
///
/// # Example
/// ```ignore
/// let mut rb = RigidBody::with_mass(2.0);
/// rb.apply_impulse(Vec3::new(10.0, 0.0, 0.0));
/// assert_eq!(rb.velocity(), Vec3::new(5.0, 0.0, 0.0));
/// ```
#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vec3,
    /// Mass used to turn impulses into velocity changes. Must be positive.
    pub mass: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Create a body at rest with unit mass.
    pub fn new() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }

    pub fn with_mass(mass: f32) -> Self {
        Self {
            mass,
            ..Self::new()
        }
    }

    /// Instant change of momentum: `velocity += impulse / mass`.
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.mass <= 0.0 {
            warn!("RigidBody::apply_impulse on body with non-positive mass - ignored");
            return;
        }
        self.velocity += impulse / self.mass;
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
    }

    #[test]
    fn test_rigidbody_new() {
        let rb = RigidBody::new();
        assert!(vec_approx_eq(rb.velocity, Vec3::ZERO));
        assert!(approx_eq(rb.mass, 1.0));
    }

    #[test]
    fn test_apply_impulse_unit_mass() {
        let mut rb = RigidBody::new();
        rb.apply_impulse(Vec3::new(3.0, 0.0, -1.0));
        assert!(vec_approx_eq(rb.velocity(), Vec3::new(3.0, 0.0, -1.0)));
    }

    #[test]
    fn test_apply_impulse_divides_by_mass() {
        let mut rb = RigidBody::with_mass(4.0);
        rb.apply_impulse(Vec3::new(8.0, 4.0, 0.0));
        assert!(vec_approx_eq(rb.velocity(), Vec3::new(2.0, 1.0, 0.0)));
    }

    #[test]
    fn test_apply_impulse_accumulates() {
        let mut rb = RigidBody::new();
        rb.set_velocity(Vec3::new(1.0, 0.0, 0.0));
        rb.apply_impulse(Vec3::new(1.0, 2.0, 0.0));
        assert!(vec_approx_eq(rb.velocity(), Vec3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_apply_impulse_zero_mass_ignored() {
        let mut rb = RigidBody::with_mass(0.0);
        rb.apply_impulse(Vec3::ONE);
        assert!(vec_approx_eq(rb.velocity(), Vec3::ZERO));
    }
}
