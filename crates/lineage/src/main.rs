//! Lineage CLI binary.

use anyhow::Result;
use lineage::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the lineage CLI.
///
/// Every command is a short sequence of file reads followed by in-memory
/// graph work, so the current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable.
    // Example: RUST_LOG=lineage=debug lineage impact --metrics ad_clicks
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lineage=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting lineage CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Lineage CLI completed successfully");
    Ok(())
}
