//! Error types for the lineage MCP server.

use thiserror::Error;

/// Errors that can occur in the lineage MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid argument value provided.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// A baseline was requested for a metric the catalog does not define.
    #[error("Metric not found: {0}")]
    MetricNotFound(String),

    /// An error from the lineage engine.
    #[error("Lineage error: {0}")]
    Lineage(#[from] lineage::error::Error),
}

/// Result type for lineage MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
