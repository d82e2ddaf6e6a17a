//! Visual trail attached to a projectile.
//!
//! Only the fade time is modelled; the host renderer reads `time` every
//! frame. Pausing freezes the trail (`time = INFINITY`) so it does not fade
//! while the bullet hangs in the air. On resume the fade time is stretched by
//! the paused duration and a countdown restores the baseline afterwards.

use bevy_ecs::prelude::Component;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    /// Current fade time in seconds.
    pub time: f32,
    /// Fade time the trail returns to after a resume.
    pub base_time: f32,
    /// Seconds left until `time` is reset to `base_time`.
    pub reset_in: Option<f32>,
}

impl Trail {
    pub fn new(base_time: f32) -> Self {
        Self {
            time: base_time,
            base_time,
            reset_in: None,
        }
    }

    pub fn freeze(&mut self) {
        self.time = f32::INFINITY;
        self.reset_in = None;
    }

    /// Stretch the fade over the paused interval and schedule the reset.
    pub fn resume(&mut self, paused_for: f32) {
        self.time = paused_for + self.base_time;
        self.reset_in = Some(self.base_time);
    }

    /// Advance the reset countdown. Returns true when the baseline was restored.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.reset_in else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.time = self.base_time;
            self.reset_in = None;
            true
        } else {
            self.reset_in = Some(remaining);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freeze_sets_infinite_fade() {
        let mut trail = Trail::new(0.1);
        trail.freeze();
        assert!(trail.time.is_infinite());
        assert!(trail.reset_in.is_none());
    }

    #[test]
    fn test_resume_then_reset() {
        let mut trail = Trail::new(0.5);
        trail.freeze();
        trail.resume(2.0);
        assert_eq!(trail.time, 2.5);
        assert!(!trail.tick(0.25));
        assert_eq!(trail.time, 2.5);
        assert!(trail.tick(0.25));
        assert_eq!(trail.time, 0.5);
        assert!(!trail.tick(1.0));
    }
}
