//! CLI argument structs for all commands.

use std::path::PathBuf;

use clap::Parser;

use super::types::{ChangeKindArg, MetricKindArg};
use super::validators::{validate_metric_name, validate_sample, validate_threshold};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Suppress output on success
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `list` command
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Filter by metric type
    #[arg(short = 't', long = "type", value_enum)]
    pub kind: Option<MetricKindArg>,

    /// Filter by owning team
    #[arg(short, long)]
    pub owner: Option<String>,

    /// List in dependency order (every metric after its dependencies)
    #[arg(long)]
    pub topological: bool,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Metric name
    #[arg(value_parser = validate_metric_name)]
    pub metric: String,
}

/// Arguments for the `upstream` and `downstream` commands
#[derive(Parser, Debug, Clone)]
pub struct LineageArgs {
    /// Metric name
    #[arg(value_parser = validate_metric_name)]
    pub metric: String,

    /// Only follow this many levels (1 = direct neighbours)
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub depth: Option<usize>,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Metric name at the root of the tree
    #[arg(value_parser = validate_metric_name)]
    pub metric: String,

    /// Walk dependencies instead of dependents
    #[arg(short, long)]
    pub upstream: bool,

    /// Maximum tree depth
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub depth: Option<usize>,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// Metrics directly touched by the change (comma-separated)
    #[arg(
        short,
        long,
        required = true,
        value_delimiter = ',',
        value_parser = validate_metric_name
    )]
    pub metrics: Vec<String>,

    /// Kind of change
    #[arg(short = 't', long = "type", value_enum, default_value = "deployment")]
    pub kind: ChangeKindArg,

    /// Service that originated the change
    #[arg(short, long, default_value = "unknown")]
    pub service: String,

    /// Free-text description of the change
    #[arg(short = 'D', long, default_value = "")]
    pub description: String,

    /// Event identifier (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for the `anomaly` command
#[derive(Parser, Debug, Clone)]
pub struct AnomalyArgs {
    /// Metric the observations belong to
    #[arg(value_parser = validate_metric_name)]
    pub metric: String,

    /// Historical observations used as the baseline (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        value_parser = validate_sample,
        required_unless_present = "history_file"
    )]
    pub history: Vec<f64>,

    /// File of historical observations, whitespace or comma separated
    #[arg(long, conflicts_with = "history")]
    pub history_file: Option<PathBuf>,

    /// Values to score against the baseline (comma-separated)
    #[arg(
        short,
        long = "value",
        required = true,
        value_delimiter = ',',
        allow_hyphen_values = true,
        value_parser = validate_sample
    )]
    pub values: Vec<f64>,

    /// Override the configured z-score threshold
    #[arg(long, value_parser = validate_threshold)]
    pub threshold: Option<f64>,
}

/// Arguments for the `export` command
#[derive(Parser, Debug, Clone)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
