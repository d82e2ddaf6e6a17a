//! Gameplay error types.
//!
//! Initialisation code (content loading, config loading, spawning entities
//! that need collaborators) returns [`GameplayError`] and fails fast.
//! Per-frame systems never propagate these; they log and move on so one
//! faulty entity cannot stall the frame loop.

use std::path::PathBuf;

use bevy_ecs::prelude::Entity;
use thiserror::Error;

/// Errors raised by gameplay initialisation and per-entity operations.
#[derive(Debug, Error)]
pub enum GameplayError {
    /// A required collaborator resource was never registered in the world.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// The entity exists but lacks a component the operation needs.
    #[error("entity {entity} is missing component {component}")]
    MissingComponent {
        /// The entity that was inspected.
        entity: Entity,
        /// Name of the missing component type.
        component: &'static str,
    },

    /// The entity was despawned before the operation ran.
    #[error("entity {0} no longer exists")]
    DeadEntity(Entity),

    /// Invalid configuration value or unreadable config file.
    #[error("config error: {0}")]
    Config(String),

    /// Content file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content file could not be parsed.
    #[error("invalid content: {0}")]
    Content(#[from] serde_json::Error),

    /// A caster or dialogue referenced content that does not exist.
    #[error("unknown {kind} '{id}'")]
    UnknownContent { kind: &'static str, id: String },
}

pub type GameplayResult<T> = Result<T, GameplayError>;
