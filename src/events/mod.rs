//! Event types exchanged with the host.
//!
//! Submodules:
//! - [`contact`] – trigger and collision notifications reported by the host
//! - [`gameevent`] – the closed set of events carried by the event bus
pub mod contact;
pub mod gameevent;
