//! # Lineup Simulator
//!
//! Ranks daily-fantasy lineups by expected prize money. Player outcomes are
//! drawn independently from normal distributions, lineups are ranked per
//! trial with min-rank ties, ranks are converted to payouts, and the payout
//! total is divided by the lineup's estimated duplication in the contest.
//!
//! The entrypoint is [`run_simulation`], a pure function over already-parsed
//! tables; it has no knowledge of files or presentation.

pub mod config;
pub mod duplication;
pub mod error;
pub mod lineup;
pub mod payout;
pub mod ranking;
pub mod runner;
pub mod simulation;


pub use config::{SimConfig, UnresolvedPolicy};
pub use duplication::{DuplicationModel, DuplicationRecord, MIN_DUPLICATION};
pub use error::SimError;
pub use lineup::{parse_lineups, Lineup, LineupBook};
pub use payout::{FinalResult, PayoutRanker, PayoutRow, PayoutTable};
pub use ranking::{min_rank, RankMatrix};
pub use runner::{run_simulation, run_simulation_with_abort, AbortFlag, IntermediateTables, RunReport};
pub use simulation::{SimulationEngine, SimulationMatrix};

/// Re-export the registry types callers need to build inputs
pub use player_registry::{NameMapping, SimilarityKind, StatsRow};

/// Current version of the lineup simulator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of entries in the contest
pub const DEFAULT_CONTEST_SIZE: u64 = 359_281;

/// Default number of simulated trials
pub const DEFAULT_TRIALS: usize = 2_000;

/// Default upper bound on trials
pub const DEFAULT_MAX_TRIALS: usize = 10_000;

/// Default number of trials processed per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 1_000;
