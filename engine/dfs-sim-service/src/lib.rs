//! DFS Lineup Simulator Service Library
//!
//! Command-line front end for the lineup simulator: CSV input adapters,
//! result writers, layered configuration, logging setup and signal wiring.

use anyhow::{Context, Result};

pub mod cli;
pub mod config;
pub mod input;
pub mod logging;
pub mod output;
pub mod service;
pub mod signals;

pub use cli::{Cli, Commands, RunArgs};
pub use config::ServiceConfig;
pub use input::{load_inputs, InputError, InputPaths, Inputs};
pub use logging::initialize_logging_with_config;
pub use output::{format_summary, write_report};
pub use service::{run, run_blocking, RunOutcome};
pub use signals::setup_signal_handlers;

/// Load configuration from files, the environment and command-line flags
pub fn load_configuration(cli: &Cli) -> Result<ServiceConfig> {
    let mut config =
        config::load_config(cli.config.as_deref()).context("Failed to load service configuration")?;
    cli.apply_overrides(&mut config);
    if let Commands::Suggest { similarity, .. } = &cli.command {
        cli::similarity_override(&mut config, similarity.as_deref())?;
    }
    config::validate_config(&config)?;
    Ok(config)
}
