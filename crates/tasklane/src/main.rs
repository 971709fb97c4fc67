//! Tasklane CLI binary.

use anyhow::Result;
use tasklane::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the tasklane CLI.
///
/// Uses tokio's `current_thread` runtime; every command is a short sequence
/// of file reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Control with RUST_LOG, e.g. RUST_LOG=tasklane=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasklane=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tasklane CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Tasklane CLI completed successfully");
    Ok(())
}
