//! The compute entrypoint: tables in, ranked lineups out

use crate::config::SimConfig;
use crate::duplication::{DuplicationModel, DuplicationRecord};
use crate::error::SimError;
use crate::lineup::{parse_lineups, LineupBook};
use crate::payout::{FinalResult, PayoutRanker, PayoutRow, PayoutTable};
use crate::ranking::RankMatrix;
use crate::simulation::{SimulationEngine, SimulationMatrix};
use player_registry::{NameMapping, NameMappings, NameResolver, PlayerStatsStore, ResolutionReport, StatsRow};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared flag that stops a run at the next chunk boundary
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// The underlying flag, for registering with signal handlers
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Full matrices, kept only when `show_intermediate` is set
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateTables {
    pub simulations: SimulationMatrix,
    pub ranks: RankMatrix,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Lineups sorted by expected money, best first
    pub results: Vec<FinalResult>,

    /// Duplication estimate per simulated lineup, in lineup id order
    pub duplication: Vec<DuplicationRecord>,

    pub resolution: ResolutionReport,

    /// Lineups excluded for unresolved names
    pub skipped_lineups: Vec<u32>,

    pub roster_size: usize,
    pub trials: usize,

    /// Seed actually used, so an unseeded run can be replayed
    pub seed: u64,

    pub intermediate: Option<IntermediateTables>,
}

/// Seed for an unseeded run, kept within TOML's integer range so the
/// reported value can be written back into a config file
fn draw_seed() -> u64 {
    u64::from(rand::random::<u32>())
}

/// Run a full simulation over already-parsed tables
pub fn run_simulation(
    stats: &[StatsRow],
    lineups: &[Vec<String>],
    payouts: &[PayoutRow],
    mappings: &[NameMapping],
    config: &SimConfig,
) -> Result<RunReport, SimError> {
    run_simulation_with_abort(stats, lineups, payouts, mappings, config, &AbortFlag::new())
}

/// [`run_simulation`] that checks `abort` between trial chunks
pub fn run_simulation_with_abort(
    stats: &[StatsRow],
    lineups: &[Vec<String>],
    payouts: &[PayoutRow],
    mappings: &[NameMapping],
    config: &SimConfig,
    abort: &AbortFlag,
) -> Result<RunReport, SimError> {
    config.validate()?;
    let started = Instant::now();

    if stats.is_empty() {
        return Err(SimError::MalformedInput("statistics table is empty".to_string()));
    }
    let mut store = PlayerStatsStore::from_rows(stats)?;
    let mappings = NameMappings::from_pairs(mappings);
    let resolver = NameResolver::new(&mappings, config.similarity.build(), config.suggestion_count);

    let drafts = parse_lineups(lineups)?;
    let (book, resolution) =
        LineupBook::resolve(drafts, &mut store, &resolver, config.unresolved_policy)?;

    // Fail fast on a short payout table before any sampling
    let ranker = PayoutRanker::new(PayoutTable::from_rows(payouts)?, book.len())?;

    let duplication = DuplicationModel::new(config.contest_size).estimate(&book, &store)?;

    let seed = config.random_seed.unwrap_or_else(draw_seed);
    let engine = SimulationEngine::new(&book, &store, seed, config.chunk_size)?;
    info!(
        "Simulating {} lineups ({} distinct players) over {} trials with seed {}",
        book.len(),
        engine.player_count(),
        config.trials,
        seed
    );

    let mut totals = vec![0.0; book.len()];
    let mut intermediate = config.show_intermediate.then(|| IntermediateTables {
        simulations: SimulationMatrix::default(),
        ranks: RankMatrix::default(),
    });

    for (chunk_index, len) in engine.chunks(config.trials) {
        if abort.is_aborted() {
            info!("Simulation aborted at chunk {}", chunk_index);
            return Err(SimError::Aborted);
        }

        let scores = engine.simulate_chunk(chunk_index, len);
        let ranks = RankMatrix::from_scores(&scores);
        ranker.accumulate(&ranks, &mut totals)?;
        debug!("Finished chunk {} ({} trials)", chunk_index, len);

        if let Some(tables) = intermediate.as_mut() {
            tables.simulations.extend(scores);
            tables.ranks.extend(ranks);
        }
    }
    if abort.is_aborted() {
        return Err(SimError::Aborted);
    }

    let results = ranker.finalize(&book, &duplication, &totals, config.trials)?;
    info!("Simulation finished in {:.2?}", started.elapsed());

    Ok(RunReport {
        results,
        duplication,
        resolution,
        skipped_lineups: book.skipped().to_vec(),
        roster_size: book.roster_size(),
        trials: config.trials,
        seed,
        intermediate,
    })
}
