//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Write `lineage.yaml` and a starter catalog
//! - `validate`: Check the catalog for duplicates, cycles and dangling dependencies
//! - `list`: List metrics with optional filters
//! - `show`: Show one metric with its direct neighbours
//! - `upstream` / `downstream`: Transitive lineage of a metric
//! - `tree`: Lineage rendered as a tree
//! - `impact`: Estimate the blast radius of a change
//! - `anomaly`: Score values against a baseline
//! - `export`: Node-link JSON of the whole graph
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//! - `--config <file>`: Configuration file (default: nearest `lineage.yaml`)
//! - `--definitions <file>`: Definitions file, overriding the configuration
//!
//! # Example
//!
//! ```bash
//! lineage downstream ad_impressions
//! lineage impact --metrics ad_clicks --service ad-service -D "Fix click tracking"
//! lineage anomaly ctr --history 90,110,95,105 --value 150
//! ```

mod args;
mod execute;
mod types;
mod validators;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    AnomalyArgs, ExportArgs, ImpactArgs, InitArgs, LineageArgs, ListArgs, ShowArgs, TreeArgs,
    ValidateArgs,
};

pub use types::{ChangeKindArg, MetricKindArg};

pub use validators::{validate_metric_name, validate_sample, validate_threshold};

/// Lineage - metric dependency tracking and change impact analysis
///
/// Loads a catalog of metric definitions, validates it as a dependency
/// graph and answers lineage, impact and anomaly questions about it.
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (default: nearest lineage.yaml)
    #[arg(short, long, global = true, env = "LINEAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Metric definitions file, overriding the configuration
    #[arg(long, global = true, env = "LINEAGE_DEFINITIONS")]
    pub definitions: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a lineage project
    ///
    /// Writes `lineage.yaml` and, unless one exists, a starter `metrics.yaml`.
    Init(InitArgs),

    /// Validate the metric catalog
    ///
    /// Fails on duplicate names, dependency cycles and dependencies on
    /// metrics that are not defined.
    Validate(ValidateArgs),

    /// List metrics with optional filters
    List(ListArgs),

    /// Show a metric with its direct dependencies and dependents
    Show(ShowArgs),

    /// Show every metric a metric is derived from
    Upstream(LineageArgs),

    /// Show every metric derived from a metric
    Downstream(LineageArgs),

    /// Render the lineage of a metric as a tree
    Tree(TreeArgs),

    /// Estimate the impact of a change
    ///
    /// The impacted set is the touched metrics plus everything downstream of
    /// them; the severity score is its size.
    Impact(ImpactArgs),

    /// Score values against a z-score baseline
    ///
    /// Fits a baseline from historical observations and reports, for each
    /// value, its z-score and whether it falls outside the threshold.
    Anomaly(AnomalyArgs),

    /// Export the dependency graph as node-link JSON
    Export(ExportArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns an error if loading the catalog or running the command fails.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::{Direction, OutputMode};

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Lineage metric dependency tracker");
            println!("Use --help for more information");
            return Ok(());
        };

        let cwd = std::env::current_dir()?;
        let open = || App::open(&cwd, self.config.as_deref(), self.definitions.as_deref());

        match command {
            Commands::Init(args) => execute::execute_init(&cwd, args, output_mode).await,
            Commands::Validate(args) => execute::execute_validate(&open().await?, args, output_mode),
            Commands::List(args) => execute::execute_list(&open().await?, args, output_mode),
            Commands::Show(args) => execute::execute_show(&open().await?, args, output_mode),
            Commands::Upstream(args) => execute::execute_lineage(
                &open().await?,
                args,
                Direction::Upstream,
                output_mode,
            ),
            Commands::Downstream(args) => execute::execute_lineage(
                &open().await?,
                args,
                Direction::Downstream,
                output_mode,
            ),
            Commands::Tree(args) => execute::execute_tree(&open().await?, args, output_mode),
            Commands::Impact(args) => execute::execute_impact(&open().await?, args, output_mode),
            Commands::Anomaly(args) => {
                execute::execute_anomaly(&open().await?, args, output_mode).await
            }
            Commands::Export(args) => execute::execute_export(&open().await?, args).await,
        }
    }
}
