//! Toggleable world object driven by direct interaction or signals.
//!
//! An [`Interactable`] has two independent boolean axes: `triggered` (the
//! toggle itself, e.g. a lever's position) and `disabled` (whether direct
//! interaction is accepted). It listens on the signal bus and maps incoming
//! signal names to three actions (trigger, disable, enable), and it may
//! broadcast its own signals when it is triggered.
//!
//! The state transitions live here as pure methods; the world-facing side
//! (bus subscription and publishing) is in
//! [`crate::systems::interactable`].
//!
//! # Example
//!
//! ```ignore
//! let door = Interactable::new()
//!     .trigger_on(["open"])
//!     .sends(["opened"]);
//! let door = spawn_interactable(&mut world, door, ());
//! ```

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// What a received signal asks the interactable to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalReaction {
    /// Number of trigger-list entries that matched; each one interacts once.
    pub triggers: usize,
    pub disable: bool,
    pub enable: bool,
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interactable {
    /// Host hint: can be clicked instead of using the interact key.
    pub clickable: bool,
    /// Host hint: how close an actor must be to interact.
    pub interaction_distance: f32,

    pub triggered: bool,
    /// When false, a triggered interactable ignores further direct interaction.
    pub reversable: bool,

    pub disabled: bool,
    pub disable_on_trigger: bool,

    pub can_send_signal: bool,
    /// Also send signals when the interaction itself came from a signal.
    pub always_send_signals: bool,
    /// Let signal-driven interactions toggle a non-reversable interactable
    /// that is already triggered. `true` keeps the legacy toggling; the
    /// default `false` makes a repeated trigger signal a no-op.
    pub signals_override_latch: bool,

    pub trigger_on_signals: Vec<String>,
    pub disable_on_signals: Vec<String>,
    pub enable_on_signals: Vec<String>,

    pub signals_to_send: Vec<String>,
}

impl Default for Interactable {
    fn default() -> Self {
        Self {
            clickable: false,
            interaction_distance: 1.0,
            triggered: false,
            reversable: false,
            disabled: false,
            disable_on_trigger: false,
            can_send_signal: true,
            always_send_signals: true,
            signals_override_latch: false,
            trigger_on_signals: Vec::new(),
            disable_on_signals: Vec::new(),
            enable_on_signals: Vec::new(),
            signals_to_send: Vec::new(),
        }
    }
}

impl Interactable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reversable(mut self, reversable: bool) -> Self {
        self.reversable = reversable;
        self
    }

    pub fn disable_on_trigger(mut self, value: bool) -> Self {
        self.disable_on_trigger = value;
        self
    }

    pub fn trigger_on<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_on_signals = signals.into_iter().map(Into::into).collect();
        self
    }

    pub fn disable_on<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable_on_signals = signals.into_iter().map(Into::into).collect();
        self
    }

    pub fn enable_on<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enable_on_signals = signals.into_iter().map(Into::into).collect();
        self
    }

    pub fn sends<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals_to_send = signals.into_iter().map(Into::into).collect();
        self
    }

    /// Whether an interaction would be accepted right now.
    ///
    /// Direct interactions are refused while disabled, and once triggered
    /// if not reversable. Signal-driven interactions ignore `disabled` but
    /// still respect the non-reversable latch unless
    /// `signals_override_latch` is set.
    pub fn accepts(&self, by_signal: bool) -> bool {
        let latched = !self.reversable && self.triggered;
        if by_signal {
            !latched || self.signals_override_latch
        } else {
            !self.disabled && !latched
        }
    }

    /// Whether an accepted interaction broadcasts `signals_to_send`.
    pub fn sends_signals(&self, by_signal: bool) -> bool {
        self.can_send_signal && (!by_signal || self.always_send_signals)
    }

    /// Flip the toggle and apply `disable_on_trigger`.
    pub fn toggle(&mut self) {
        self.triggered = !self.triggered;
        if self.disable_on_trigger {
            self.disabled = true;
        }
    }

    /// Match a received signal against the three lists. All lists are
    /// checked; duplicates in the trigger list interact once per entry.
    pub fn react_to(&self, signal: &str) -> SignalReaction {
        SignalReaction {
            triggers: self
                .trigger_on_signals
                .iter()
                .filter(|s| s.as_str() == signal)
                .count(),
            disable: self.disable_on_signals.iter().any(|s| s == signal),
            enable: self.enable_on_signals.iter().any(|s| s == signal),
        }
    }
}
