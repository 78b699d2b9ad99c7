//! Error types for the lineup simulator

use player_registry::{RegistryError, UnresolvedName};
use thiserror::Error;

/// Errors that abort a simulation run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("{} player name(s) could not be resolved: {}", .names.len(), describe_unresolved(.names))]
    UnresolvedPlayerName { names: Vec<UnresolvedName> },

    #[error("Total ownership product across lineups is {total}; cannot normalize duplication")]
    DegenerateOwnership { total: f64 },

    #[error("Lineup {lineup_id} has duplication {duplication}; cannot divide payouts by it")]
    ZeroDuplication { lineup_id: u32, duplication: f64 },

    #[error("Payout table has no entry for rank {rank} (ranks 1..={num_lineups} must be covered)")]
    PayoutCoverage { rank: u32, num_lineups: usize },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Simulation aborted before producing output")]
    Aborted,
}

impl From<RegistryError> for SimError {
    fn from(err: RegistryError) -> Self {
        SimError::MalformedInput(format!("statistics: {err}"))
    }
}

fn describe_unresolved(names: &[UnresolvedName]) -> String {
    names.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
