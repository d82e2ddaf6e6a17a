//! Gameplay systems.
//!
//! Most of these are exclusive (`fn(&mut World)`) because bus dispatch and
//! effect hooks need the whole world.
//!
//! Submodules overview
//! - [`bullet`] – projectile lifecycle, pause/resume and hit resolution
//! - [`dialogue`] – dialogue activation and playback
//! - [`interactable`] – interaction and signal reactions
//! - [`lifecycle`] – despawning that keeps the buses consistent
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`spellcaster`] – cooldowns and key-driven casting
//! - [`spelleffect`] – the per-phase effect pipeline
//! - [`time`] – update simulation time and delta
//! - [`ttl`] – time-to-live expiry

pub mod bullet;
pub mod dialogue;
pub mod interactable;
pub mod lifecycle;
pub mod movement;
pub mod spellcaster;
pub mod spelleffect;
pub mod time;
pub mod ttl;
