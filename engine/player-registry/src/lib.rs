//! Player Registry - Player statistics and name reconciliation
//!
//! Holds the per-player projection, standard deviation and ownership used by
//! the lineup simulator, and reconciles the names a lineup export uses against
//! the names in the statistics table.

pub mod error;
pub mod registry;
pub mod resolver;
pub mod similarity;
pub mod types;

pub use error::RegistryError;
pub use registry::PlayerStatsStore;
pub use resolver::{NameResolver, Resolution, ResolutionReport, Suggestion, UnresolvedName};
pub use similarity::{Similarity, SimilarityKind, SkimSimilarity, TokenSortRatio};
pub use types::{normalize_name, NameMapping, NameMappings, Player, StatsRow};

/// Default number of suggestions reported for an unresolved name
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;
