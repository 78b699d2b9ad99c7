//! Signal handling: Ctrl+C and SIGTERM abort a running simulation

use anyhow::Result;
use lineup_simulator::AbortFlag;
use tracing::{error, info};

/// Setup signal handlers that set `abort`
///
/// The simulation checks the flag between trial chunks, so a signal stops the
/// run before any output is written.
pub fn setup_signal_handlers(abort: &AbortFlag) -> Result<()> {
    // Handle Ctrl+C (SIGINT)
    let flag = abort.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C signal: {}", e);
            return;
        }

        info!("Ctrl+C signal received, aborting simulation");
        flag.abort();
    });

    // Handle SIGTERM (Unix only)
    #[cfg(unix)]
    {
        use signal_hook::consts::SIGTERM;

        signal_hook::flag::register(SIGTERM, abort.as_atomic())?;
    }

    Ok(())
}
