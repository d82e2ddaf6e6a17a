//! Spells bound to input keys, each with its own cooldown.
//!
//! Spell definitions are shared (`Arc`) content; the per-caster state is a
//! [`SpellSlot`] holding the remaining cooldown. [`SpellCaster::new`] builds
//! the slot list the way the caster initialises itself: duplicates (same
//! definition, by identity) are collapsed keeping the first occurrence, then
//! the list is cut down to `max_spells` according to a [`SpellLimitPolicy`].
//!
//! Casting is done by [`crate::systems::spellcaster`].

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::components::bullet::BulletArchetype;
use crate::resources::input::Key;

/// What happens when a spell is cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpellAction {
    /// Spawn a bullet in front of the caster and fire it.
    Projectile {
        bullet: BulletArchetype,
        /// Distance in front of the caster where the bullet spawns.
        #[serde(default)]
        spawn_offset: f32,
    },
    /// Restore health on the designated ally.
    Heal { amount: f32 },
    /// Broadcast a signal with the caster as source.
    EmitSignal { signal: String },
}

/// Authored spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub id: String,
    pub key: Key,
    /// Seconds between casts.
    pub cooldown: f32,
    pub action: SpellAction,
}

/// Per-caster cooldown state for one spell.
#[derive(Debug, Clone)]
pub struct SpellSlot {
    pub spell: Arc<SpellDefinition>,
    pub cooldown_remaining: f32,
}

impl SpellSlot {
    pub fn new(spell: Arc<SpellDefinition>) -> Self {
        Self {
            spell,
            cooldown_remaining: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Restart the cooldown after a cast.
    pub fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.spell.cooldown;
    }

    /// Count the cooldown down by `dt`, never below zero.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
    }
}

/// How an over-long spell list is cut down to the allowed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellLimitPolicy {
    /// Keep the first `max` spells.
    #[default]
    KeepFirst,
    /// Remove `max` entries starting at `len - max`, i.e. keep only the
    /// first `len - max`. Matches content authored against the old caster.
    Legacy,
}

impl SpellLimitPolicy {
    pub fn apply<T>(self, items: &mut Vec<T>, max: usize) {
        if items.len() <= max {
            return;
        }
        match self {
            SpellLimitPolicy::KeepFirst => items.truncate(max),
            SpellLimitPolicy::Legacy => {
                let start = items.len() - max;
                items.drain(start..start + max);
            }
        }
    }
}

/// Collapse duplicate definitions (same `Arc`), keeping first occurrences.
pub fn dedup_by_identity(spells: Vec<Arc<SpellDefinition>>) -> Vec<Arc<SpellDefinition>> {
    let mut unique: Vec<Arc<SpellDefinition>> = Vec::with_capacity(spells.len());
    for spell in spells {
        if !unique.iter().any(|s| Arc::ptr_eq(s, &spell)) {
            unique.push(spell);
        }
    }
    unique
}

#[derive(Component, Debug, Clone)]
pub struct SpellCaster {
    pub slots: Vec<SpellSlot>,
    pub max_spells: usize,
}

impl SpellCaster {
    pub fn new(
        spells: Vec<Arc<SpellDefinition>>,
        max_spells: usize,
        policy: SpellLimitPolicy,
    ) -> Self {
        let mut spells = dedup_by_identity(spells);
        policy.apply(&mut spells, max_spells);
        Self {
            slots: spells.into_iter().map(SpellSlot::new).collect(),
            max_spells,
        }
    }

    pub fn spell_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.spell.id.as_str()).collect()
    }

    pub fn slot(&self, id: &str) -> Option<&SpellSlot> {
        self.slots.iter().find(|s| s.spell.id == id)
    }
}

/// Direction a caster fires in when it has no target to aim at.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Aim(pub Vec3);

impl Default for Aim {
    fn default() -> Self {
        Aim(Vec3::X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spell(id: &str) -> Arc<SpellDefinition> {
        Arc::new(SpellDefinition {
            id: id.into(),
            key: Key::Q,
            cooldown: 2.0,
            action: SpellAction::EmitSignal { signal: id.into() },
        })
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let a = spell("a");
        let b = spell("b");
        let c = spell("c");
        let caster = SpellCaster::new(
            vec![a.clone(), b.clone(), a.clone(), c, b],
            5,
            SpellLimitPolicy::KeepFirst,
        );
        assert_eq!(caster.spell_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedup_is_by_identity_not_id() {
        let caster = SpellCaster::new(
            vec![spell("a"), spell("a")],
            5,
            SpellLimitPolicy::KeepFirst,
        );
        assert_eq!(caster.slots.len(), 2);
    }

    #[test]
    fn test_keep_first_truncation() {
        let spells: Vec<_> = ["a", "b", "c", "d", "e", "f", "g"]
            .into_iter()
            .map(spell)
            .collect();
        let caster = SpellCaster::new(spells, 5, SpellLimitPolicy::KeepFirst);
        assert_eq!(caster.spell_ids(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_legacy_truncation_keeps_len_minus_max() {
        let spells: Vec<_> = ["a", "b", "c", "d", "e", "f", "g"]
            .into_iter()
            .map(spell)
            .collect();
        let caster = SpellCaster::new(spells, 5, SpellLimitPolicy::Legacy);
        assert_eq!(caster.spell_ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_under_limit_untouched() {
        let mut items = vec![1, 2, 3];
        SpellLimitPolicy::Legacy.apply(&mut items, 3);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_cooldown_lifecycle() {
        let mut slot = SpellSlot::new(spell("a"));
        assert!(slot.is_ready());
        slot.start_cooldown();
        assert_eq!(slot.cooldown_remaining, 2.0);
        assert!(!slot.is_ready());
        slot.tick(1.5);
        assert_eq!(slot.cooldown_remaining, 0.5);
        slot.tick(1.5);
        assert_eq!(slot.cooldown_remaining, 0.0);
        assert!(slot.is_ready());
    }

    #[test]
    fn test_spell_from_json() {
        let json = r#"{
            "id": "spark",
            "key": "e",
            "cooldown": 0.5,
            "action": { "type": "heal", "amount": 3.0 }
        }"#;
        let spell: SpellDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(spell.key, Key::E);
        assert_eq!(spell.action, SpellAction::Heal { amount: 3.0 });
    }
}
