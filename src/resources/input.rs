//! Per-frame input resource.
//!
//! The host polls its input devices once per frame and records what
//! happened here: keys pressed this frame and whether the primary mouse
//! button was released. Gameplay systems only read it. The host calls
//! [`InputState::end_frame`] after the schedule has run.
use std::fmt;
use std::str::FromStr;

use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Keys gameplay can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Q,
    W,
    E,
    R,
    F,
    Space,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "q" => Ok(Key::Q),
            "w" => Ok(Key::W),
            "e" => Ok(Key::E),
            "r" => Ok(Key::R),
            "f" => Ok(Key::F),
            "space" => Ok(Key::Space),
            "1" | "digit1" => Ok(Key::Digit1),
            "2" | "digit2" => Ok(Key::Digit2),
            "3" | "digit3" => Ok(Key::Digit3),
            "4" | "digit4" => Ok(Key::Digit4),
            "5" | "digit5" => Ok(Key::Digit5),
            other => Err(format!("unknown key '{}'", other)),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Input observed during the current frame.
#[derive(Resource, Debug, Clone)]
pub struct InputState {
    pub(crate) pressed: FxHashSet<Key>,
    pub(crate) mouse_released: bool,
    /// Key that starts a dialogue when standing in its zone.
    pub interact_key: Key,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pressed: FxHashSet::default(),
            mouse_released: false,
            interact_key: Key::E,
        }
    }
}

impl InputState {
    /// Record that `key` went down this frame.
    pub fn press(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    /// Record that the primary mouse button was released this frame.
    pub fn release_mouse(&mut self) {
        self.mouse_released = true;
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn was_mouse_released(&self) -> bool {
        self.mouse_released
    }

    pub fn interact_pressed(&self) -> bool {
        self.is_key_pressed(self.interact_key)
    }

    /// Forget this frame's input.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
        self.mouse_released = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_end_frame() {
        let mut input = InputState::default();
        input.press(Key::Space);
        input.release_mouse();
        assert!(input.is_key_pressed(Key::Space));
        assert!(!input.is_key_pressed(Key::Q));
        assert!(input.was_mouse_released());
        input.end_frame();
        assert!(!input.is_key_pressed(Key::Space));
        assert!(!input.was_mouse_released());
    }

    #[test]
    fn test_interact_key_binding() {
        let mut input = InputState {
            interact_key: Key::F,
            ..InputState::default()
        };
        input.press(Key::E);
        assert!(!input.interact_pressed());
        input.press(Key::F);
        assert!(input.interact_pressed());
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("E".parse::<Key>(), Ok(Key::E));
        assert_eq!(" space ".parse::<Key>(), Ok(Key::Space));
        assert_eq!("3".parse::<Key>(), Ok(Key::Digit3));
        assert!("ctrl".parse::<Key>().is_err());
    }
}
