//! DFS Lineup Simulator
//!
//! Entry point for the `dfs-sim` binary.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dfs_sim_service::{
    config, format_summary, initialize_logging_with_config, load_configuration, run, service, Cli, Commands,
    ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = load_configuration(&cli).context("Failed to load configuration")?;

    // Initialize logging
    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;
    info!("Starting DFS Lineup Simulator v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(args) => {
            let summary_rows = config.output.summary_rows;
            let outcome = run(args.input_paths(), config).await?;
            print!("{}", format_summary(&outcome.report, summary_rows));
            for path in &outcome.written {
                println!("Wrote {}", path.display());
            }
        }
        Commands::Suggest { stats, names, .. } => {
            let results = service::suggest(&stats, &names, &config)?;
            print!("{}", service::format_suggestions(&results));
        }
        Commands::InitConfig { path } => {
            config::save_to_file(&ServiceConfig::default(), &path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }

    info!("DFS Lineup Simulator finished");
    Ok(())
}
