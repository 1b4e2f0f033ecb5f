//! Lineage MCP server binary.
//!
//! Serves the catalog over stdio. The catalog is located the same way the
//! CLI locates it, using `LINEAGE_CONFIG` and `LINEAGE_DEFINITIONS` as
//! overrides. A definitions path given as the first argument wins over
//! both.
//!
//! ```bash
//! lineage-mcp ./metrics.yaml
//! ```

use lineage_mcp::LineageMcpServer;
use lineage_mcp::context::Context;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs must go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting lineage-mcp server");

    let working_dir = std::env::current_dir()?;
    let config = std::env::var_os("LINEAGE_CONFIG").map(PathBuf::from);
    let definitions = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("LINEAGE_DEFINITIONS"))
        .map(PathBuf::from);

    let context = Context::load(&working_dir, config.as_deref(), definitions.as_deref()).await?;
    tracing::info!(
        metrics = context.lineage().catalog().len(),
        "Catalog loaded, serving on stdio"
    );

    let service = LineageMcpServer::new(context).serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
