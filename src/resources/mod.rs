//! ECS resources made available to systems.
//!
//! Overview
//! - `bus` – signal and event publish/subscribe buses
//! - `content` – spells and dialogues loaded from JSON
//! - `dialogueui` – dialogue box and UI group visibility
//! - `gameconfig` – INI-backed tunables
//! - `input` – per-frame keyboard and mouse state
//! - `rng` – seedable random source for gameplay rolls
//! - `worldtime` – simulation time and delta
pub mod bus;
pub mod content;
pub mod dialogueui;
pub mod gameconfig;
pub mod input;
pub mod rng;
pub mod worldtime;
