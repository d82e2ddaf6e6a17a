//! Game-wide simulation events.
//!
//! [`GameEvent`]s travel on the [`EventBus`](crate::resources::bus::EventBus).
//! Unlike signals they form a closed set: every entity that simulates over
//! time (bullets in flight, for instance) subscribes to them to freeze and
//! resume itself while a dialogue or menu holds the game.

/// Closed set of broadcast game events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEvent {
    /// Gameplay simulation should freeze.
    Paused,
    /// Gameplay simulation should continue from where it froze.
    Resumed,
}
