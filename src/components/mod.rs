//! ECS components for gameplay entities.
//!
//! Components hold per-entity data and the pure state transitions on it;
//! the world-facing behaviour lives in [`crate::systems`].
//!
//! Submodules overview:
//! - [`bullet`] – projectile parameters, stat scaling and pause snapshot
//! - [`dialogue`] – dialogue content and the sequencer's resumable task
//! - [`group`] – tag component for grouping entities by name
//! - [`health`] – hit points
//! - [`interactable`] – toggle driven by interaction and signals
//! - [`rigidbody`] – velocity and mass of a physical body
//! - [`spellcaster`] – key-bound spells with cooldowns
//! - [`spelleffect`] – effect kinds and the lifecycle phase mask
//! - [`stats`] – Intelligence/Agility/Luck/Wisdom values
//! - [`trail`] – fade time of a projectile trail
//! - [`ttl`] – time-to-live countdown
//! - [`worldposition`] – world-space position

pub mod bullet;
pub mod dialogue;
pub mod group;
pub mod health;
pub mod interactable;
pub mod rigidbody;
pub mod spellcaster;
pub mod spelleffect;
pub mod stats;
pub mod trail;
pub mod ttl;
pub mod worldposition;
