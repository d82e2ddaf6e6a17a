//! Character statistics consulted when launching projectiles.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Stat kinds that feed projectile scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Intelligence,
    Agility,
    Luck,
    Wisdom,
}

/// Per-entity stat values. Absent stats read as zero.
#[derive(Component, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    values: FxHashMap<StatKind, f32>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: StatKind, value: f32) -> Self {
        self.values.insert(kind, value);
        self
    }

    pub fn set(&mut self, kind: StatKind, value: f32) {
        self.values.insert(kind, value);
    }

    pub fn get(&self, kind: StatKind) -> f32 {
        self.values.get(&kind).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_stat_reads_zero() {
        let stats = Stats::new().with(StatKind::Luck, 12.0);
        assert_eq!(stats.get(StatKind::Luck), 12.0);
        assert_eq!(stats.get(StatKind::Wisdom), 0.0);
    }

    #[test]
    fn test_set_overwrites() {
        let mut stats = Stats::new().with(StatKind::Intelligence, 1.0);
        stats.set(StatKind::Intelligence, 5.0);
        assert_eq!(stats.get(StatKind::Intelligence), 5.0);
    }
}
