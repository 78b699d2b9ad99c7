//! Error types for the player registry

use thiserror::Error;

/// Errors raised while building or querying the statistics store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Player '{0}' not found in statistics")]
    PlayerNotFound(String),

    #[error("Player '{0}' appears more than once in statistics")]
    DuplicatePlayer(String),

    #[error("Player name is empty")]
    EmptyName,

    #[error("Invalid {field} for player '{name}': {value}")]
    InvalidStat { name: String, field: &'static str, value: f64 },

    #[error("Alias '{alias}' points at unknown player '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}
