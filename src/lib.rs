//! Sporecast gameplay core.
//!
//! Projectiles with phased spell effects, interactables wired together by a
//! signal bus, key-bound spell casting and a scripted dialogue sequencer,
//! all running on a `bevy_ecs` world. The library is exposed for the demo
//! binary and the integration tests.

pub mod components;
pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
