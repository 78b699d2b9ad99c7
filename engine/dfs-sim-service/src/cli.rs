//! # Command Line Interface
//!
//! `dfs-sim run` ranks lineups; `dfs-sim suggest` helps build a mappings file;
//! `dfs-sim init-config` writes the default configuration.

use crate::config::{parse_similarity, ServiceConfig};
use crate::input::InputPaths;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lineup_simulator::UnresolvedPolicy;
use std::path::PathBuf;

/// DFS lineup simulator
#[derive(Parser, Debug)]
#[command(name = "dfs-sim")]
#[command(about = "Rank daily-fantasy lineups by duplication-adjusted expected prize money")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, pretty, compact)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate the contest and write ranked lineups
    Run(RunArgs),

    /// Show the closest statistics names for lineup names
    Suggest {
        /// Player statistics CSV
        #[arg(long)]
        stats: PathBuf,

        /// Lineup names to look up
        #[arg(required = true)]
        names: Vec<String>,

        /// Number of suggestions per name
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Similarity measure (token_sort, skim)
        #[arg(long)]
        similarity: Option<String>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Destination path
        #[arg(default_value = "dfs-sim.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Player statistics CSV (Name, Projection, Std Dev, Ownership%)
    #[arg(long)]
    pub stats: PathBuf,

    /// Lineup CSV, one "position:name" slot per cell
    #[arg(long)]
    pub lineups: PathBuf,

    /// Payout CSV, rank then prize
    #[arg(long)]
    pub payouts: PathBuf,

    /// Optional name mapping CSV (lineup name, statistics name)
    #[arg(long)]
    pub mappings: Option<PathBuf>,

    /// Ranked lineup output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for intermediate tables
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Total number of contest entries
    #[arg(long)]
    pub contest_size: Option<u64>,

    /// Number of simulated trials
    #[arg(short, long)]
    pub trials: Option<usize>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write lineup statistics and the simulation matrices
    #[arg(long)]
    pub show_intermediate: bool,

    /// Drop lineups with unresolved names instead of failing
    #[arg(long)]
    pub skip_unresolved: bool,
}

impl Cli {
    /// Apply the global flags on top of file and environment configuration
    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        match &self.command {
            Commands::Run(args) => args.apply_overrides(config),
            Commands::Suggest { count, .. } => {
                if let Some(count) = count {
                    config.simulation.suggestion_count = *count;
                }
            }
            Commands::InitConfig { .. } => {}
        }
    }
}

impl RunArgs {
    pub fn input_paths(&self) -> InputPaths {
        InputPaths {
            stats: self.stats.clone(),
            lineups: self.lineups.clone(),
            payouts: self.payouts.clone(),
            mappings: self.mappings.clone(),
        }
    }

    pub fn apply_overrides(&self, config: &mut ServiceConfig) {
        let sim = &mut config.simulation;
        if let Some(contest_size) = self.contest_size {
            sim.contest_size = contest_size;
        }
        if let Some(trials) = self.trials {
            sim.trials = trials;
        }
        if let Some(seed) = self.seed {
            sim.random_seed = Some(seed);
        }
        if self.show_intermediate {
            sim.show_intermediate = true;
        }
        if self.skip_unresolved {
            sim.unresolved_policy = UnresolvedPolicy::SkipLineup;
        }

        if let Some(output) = &self.output {
            config.output.rankings_file = output.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.intermediate_dir = dir.clone();
        }
    }
}

/// Similarity override for `suggest`, validated like the environment value
pub fn similarity_override(config: &mut ServiceConfig, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        config.simulation.similarity = parse_similarity(value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags_override_config() {
        let cli = Cli::parse_from([
            "dfs-sim",
            "--log-level",
            "debug",
            "run",
            "--stats",
            "stats.csv",
            "--lineups",
            "lineups.csv",
            "--payouts",
            "payouts.csv",
            "--trials",
            "300",
            "--seed",
            "11",
            "--skip-unresolved",
            "-o",
            "out/rankings.csv",
        ]);

        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.trials, 300);
        assert_eq!(config.simulation.random_seed, Some(11));
        assert_eq!(config.simulation.unresolved_policy, UnresolvedPolicy::SkipLineup);
        assert!(!config.simulation.show_intermediate);
        assert_eq!(config.output.rankings_file, PathBuf::from("out/rankings.csv"));

        match cli.command {
            Commands::Run(args) => assert_eq!(args.input_paths().mappings, None),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_suggest_requires_names() {
        assert!(Cli::try_parse_from(["dfs-sim", "suggest", "--stats", "stats.csv"]).is_err());

        let cli = Cli::parse_from(["dfs-sim", "suggest", "--stats", "s.csv", "-n", "3", "gabe davis"]);
        let mut config = ServiceConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.simulation.suggestion_count, 3);
    }
}
