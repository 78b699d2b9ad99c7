//! Run orchestration: load inputs, simulate, write outputs

use crate::config::ServiceConfig;
use crate::input::{load_inputs, read_stats, InputPaths};
use crate::output::write_report;
use crate::signals::setup_signal_handlers;
use anyhow::{Context, Result};
use lineup_simulator::{run_simulation_with_abort, AbortFlag, RunReport, SimError};
use player_registry::{NameMappings, NameResolver, PlayerStatsStore, Resolution};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub written: Vec<PathBuf>,
}

/// Load, simulate and write, blocking the calling thread
///
/// Nothing is written if the run fails or is aborted.
pub fn run_blocking(paths: &InputPaths, config: &ServiceConfig, abort: &AbortFlag) -> Result<RunOutcome> {
    let started = Instant::now();
    let inputs = load_inputs(paths)?;

    let report = run_simulation_with_abort(
        &inputs.stats,
        &inputs.lineups,
        &inputs.payouts,
        &inputs.mappings,
        &config.simulation,
        abort,
    )
    .map_err(|err| {
        if let SimError::UnresolvedPlayerName { names } = &err {
            for name in names {
                error!("Unresolved player {}", name);
            }
            error!("Add the names to a mappings file or rerun with --skip-unresolved");
        }
        err
    })
    .context("Simulation failed")?;

    for name in &report.resolution.unresolved {
        warn!("Skipped unresolved player {}", name);
    }

    let written = write_report(&report, &config.output)?;
    info!("Run completed in {:.2?}", started.elapsed());

    Ok(RunOutcome { report, written })
}

/// Run on the blocking pool with Ctrl+C and SIGTERM wired to abort
pub async fn run(paths: InputPaths, config: ServiceConfig) -> Result<RunOutcome> {
    let abort = AbortFlag::new();
    setup_signal_handlers(&abort)?;
    info!("Signal handlers configured");

    tokio::task::spawn_blocking(move || run_blocking(&paths, &config, &abort))
        .await
        .context("Simulation task panicked")?
}

/// Resolve `names` against a statistics file without running a simulation
pub fn suggest(stats_path: &Path, names: &[String], config: &ServiceConfig) -> Result<Vec<(String, Resolution)>> {
    let file =
        File::open(stats_path).with_context(|| format!("Failed to open {}", stats_path.display()))?;
    let rows = read_stats(file)
        .with_context(|| format!("Failed to load statistics from {}", stats_path.display()))?;
    let mut store = PlayerStatsStore::from_rows(&rows).context("Invalid statistics table")?;

    let mappings = NameMappings::new();
    let resolver = NameResolver::new(
        &mappings,
        config.simulation.similarity.build(),
        config.simulation.suggestion_count,
    );

    Ok(names.iter().map(|name| (name.clone(), resolver.resolve(&mut store, name))).collect())
}

/// Render `suggest` results for the terminal
pub fn format_suggestions(results: &[(String, Resolution)]) -> String {
    let mut out = String::new();
    for (name, resolution) in results {
        match resolution {
            Resolution::Exact => out.push_str(&format!("{name}: exact match\n")),
            Resolution::Mapped { stats_name } => out.push_str(&format!("{name}: mapped to {stats_name}\n")),
            Resolution::Unresolved { suggestions } => {
                out.push_str(&format!("{name}: not found\n"));
                for suggestion in suggestions {
                    out.push_str(&format!("    {:>5.1}  {}\n", suggestion.score, suggestion.name));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_ranks_closest_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        std::fs::write(
            &path,
            "Name,Projection,Std Dev,Ownership%\nGabriel Davis,9.8,5.2,5\nNick Chubb,15,5,25\n",
        )
        .unwrap();

        let names = vec!["Nick Chubb".to_string(), "Gabriel Davies".to_string()];
        let results = suggest(&path, &names, &ServiceConfig::default()).unwrap();

        assert_eq!(results[0].1, Resolution::Exact);
        match &results[1].1 {
            Resolution::Unresolved { suggestions } => assert_eq!(suggestions[0].name, "gabriel davis"),
            other => panic!("unexpected resolution: {other:?}"),
        }

        let text = format_suggestions(&results);
        assert!(text.contains("Nick Chubb: exact match"));
        assert!(text.contains("gabriel davis"));
    }
}
