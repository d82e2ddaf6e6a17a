//! Random source for gameplay rolls.
//!
//! The luck factor in projectile scaling draws a fresh offset per cast.
//! [`GameRng`] is seeded from `[rng] seed` in the config when present, which
//! makes damage rolls reproducible for tests and replays.

use bevy_ecs::prelude::Resource;
use fastrand::Rng;

#[derive(Resource, Debug)]
pub struct GameRng {
    rng: Rng,
}

impl Default for GameRng {
    fn default() -> Self {
        Self { rng: Rng::new() }
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }

    /// Uniform value in `[min, max)`.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.f32() * (max - min)
    }

    /// Offset added to the luck divisor, uniform in `[-500, 500)`.
    pub fn luck_jitter(&mut self) -> f32 {
        self.range(-500.0, 500.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = GameRng::seeded(42);
        let mut b = GameRng::seeded(42);
        for _ in 0..8 {
            assert_eq!(a.luck_jitter(), b.luck_jitter());
        }
    }

    #[test]
    fn test_luck_jitter_in_range() {
        let mut rng = GameRng::seeded(7);
        for _ in 0..1000 {
            let j = rng.luck_jitter();
            assert!((-500.0..500.0).contains(&j));
        }
    }
}
