//! Authored gameplay content loaded from JSON.
//!
//! Spells (with their bullet archetypes and effect lists) and dialogues are
//! parsed once at startup and handed out as `Arc`s, so every caster and
//! sequencer shares the same read-only definitions. Spell deduplication on
//! casters relies on that sharing: asking for the same id twice yields the
//! same `Arc`.
//!
//! # File format
//!
//! ```json
//! {
//!   "spells": [
//!     { "id": "spark", "key": "q", "cooldown": 0.5,
//!       "action": { "type": "projectile", "bullet": { "params": { "damage": 2 } } } }
//!   ],
//!   "dialogues": [
//!     { "id": "intro", "segments": [ { "text": "Hello", "display_time": 1.0 } ] }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::components::dialogue::Dialogue;
use crate::components::spellcaster::SpellDefinition;
use crate::error::{GameplayError, GameplayResult};

#[derive(Debug, Default, Deserialize)]
struct ContentFile {
    #[serde(default)]
    spells: Vec<SpellDefinition>,
    #[serde(default)]
    dialogues: Vec<Dialogue>,
}

#[derive(Resource, Debug, Default)]
pub struct ContentLibrary {
    spells: FxHashMap<String, Arc<SpellDefinition>>,
    spell_order: Vec<String>,
    dialogues: FxHashMap<String, Arc<Dialogue>>,
}

impl ContentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> GameplayResult<Self> {
        let file: ContentFile = serde_json::from_str(json)?;
        let mut library = Self::new();
        for spell in file.spells {
            library.add_spell(spell);
        }
        for dialogue in file.dialogues {
            library.add_dialogue(dialogue);
        }
        Ok(library)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> GameplayResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GameplayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let library = Self::from_json_str(&json)?;
        info!(
            "Loaded content from {:?}: {} spells, {} dialogues",
            path,
            library.spells.len(),
            library.dialogues.len()
        );
        Ok(library)
    }

    /// Register a spell. A later spell with the same id replaces the earlier
    /// one.
    pub fn add_spell(&mut self, spell: SpellDefinition) -> Arc<SpellDefinition> {
        let id = spell.id.clone();
        let spell = Arc::new(spell);
        if self.spells.insert(id.clone(), Arc::clone(&spell)).is_none() {
            self.spell_order.push(id);
        }
        spell
    }

    pub fn add_dialogue(&mut self, dialogue: Dialogue) -> Arc<Dialogue> {
        let dialogue = Arc::new(dialogue);
        self.dialogues
            .insert(dialogue.id.clone(), Arc::clone(&dialogue));
        dialogue
    }

    pub fn spell(&self, id: &str) -> GameplayResult<Arc<SpellDefinition>> {
        self.spells
            .get(id)
            .cloned()
            .ok_or_else(|| GameplayError::UnknownContent {
                kind: "spell",
                id: id.to_string(),
            })
    }

    /// Resolve a list of spell ids, keeping order and repeats.
    pub fn spells<S: AsRef<str>>(&self, ids: &[S]) -> GameplayResult<Vec<Arc<SpellDefinition>>> {
        ids.iter().map(|id| self.spell(id.as_ref())).collect()
    }

    /// All spells in the order they were first registered.
    pub fn all_spells(&self) -> Vec<Arc<SpellDefinition>> {
        self.spell_order
            .iter()
            .filter_map(|id| self.spells.get(id).cloned())
            .collect()
    }

    pub fn dialogue(&self, id: &str) -> GameplayResult<Arc<Dialogue>> {
        self.dialogues
            .get(id)
            .cloned()
            .ok_or_else(|| GameplayError::UnknownContent {
                kind: "dialogue",
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::spellcaster::SpellAction;

    const CONTENT: &str = r#"{
        "spells": [
            { "id": "spark", "key": "q", "cooldown": 0.5,
              "action": { "type": "projectile",
                          "bullet": { "params": { "damage": 2.0 },
                                      "effects": [ { "phases": ["on_hit"], "type": "damage", "scale": 1.0 } ] } } },
            { "id": "mend", "key": "w", "cooldown": 3.0,
              "action": { "type": "heal", "amount": 5.0 } }
        ],
        "dialogues": [
            { "id": "intro", "segments": [ { "text": "Hello" } ] }
        ]
    }"#;

    #[test]
    fn test_parse_content() {
        let lib = ContentLibrary::from_json_str(CONTENT).unwrap();
        let spark = lib.spell("spark").unwrap();
        match &spark.action {
            SpellAction::Projectile { bullet, .. } => {
                assert_eq!(bullet.params.damage, 2.0);
                assert_eq!(bullet.params.speed, 10.0);
                assert_eq!(bullet.effects.len(), 1);
            }
            other => panic!("unexpected action {:?}", other),
        }
        assert_eq!(lib.dialogue("intro").unwrap().segments.len(), 1);
        let ids: Vec<_> = lib.all_spells().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["spark", "mend"]);
    }

    #[test]
    fn test_repeated_ids_share_identity() {
        let lib = ContentLibrary::from_json_str(CONTENT).unwrap();
        let spells = lib.spells(&["spark", "mend", "spark"]).unwrap();
        assert!(Arc::ptr_eq(&spells[0], &spells[2]));
    }

    #[test]
    fn test_unknown_ids_fail() {
        let lib = ContentLibrary::from_json_str(CONTENT).unwrap();
        assert!(matches!(
            lib.spell("nope"),
            Err(GameplayError::UnknownContent { kind: "spell", .. })
        ));
        assert!(lib.dialogue("nope").is_err());
    }

    #[test]
    fn test_invalid_json_fails() {
        assert!(matches!(
            ContentLibrary::from_json_str("{ not json"),
            Err(GameplayError::Content(_))
        ));
    }
}
