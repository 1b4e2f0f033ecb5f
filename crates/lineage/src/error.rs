//! Error types for lineage operations.
//!
//! Errors fall into two groups with deliberately different policies:
//!
//! - **Structural errors** (`Cycle`, `DanglingDependency`, `DuplicateMetric`)
//!   are raised while the catalog and graph are built. They are fatal: a graph
//!   that fails validation never becomes queryable.
//! - **Unknown metric names at query time** are not errors at all. Lineage
//!   queries and impact analysis answer them with empty results, so there is
//!   no variant for them here.

use crate::domain::MetricName;
use crate::id_generation::IdGenerationError;
use std::io;
use thiserror::Error;

/// The error type for lineage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The dependency graph contains at least one directed cycle.
    ///
    /// `participants` lists every metric that sits on a cycle or downstream
    /// of one, sorted by name.
    #[error("Cycle detected in metric lineage involving: {}", join_names(.participants))]
    Cycle {
        /// Metrics on or downstream of a cycle.
        participants: Vec<MetricName>,
    },

    /// A metric declares a dependency that is not in the catalog.
    #[error("Metric '{metric}' depends on unknown metric '{dependency}'")]
    DanglingDependency {
        /// The metric declaring the dependency.
        metric: MetricName,
        /// The dependency name that could not be resolved.
        dependency: MetricName,
    },

    /// Two definitions share the same name.
    #[error("Duplicate metric definition: {0}")]
    DuplicateMetric(MetricName),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A definition source could not be parsed.
    #[error("Failed to parse {source_name}: {message}")]
    Parse {
        /// Human-readable name of the source (usually a path).
        source_name: String,
        /// Parser message.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Anomaly thresholds must be finite and strictly positive.
    #[error("Invalid anomaly threshold: {0} (must be a finite number greater than 0)")]
    InvalidThreshold(f64),

    /// Event ID generation failed.
    #[error("ID generation failed: {0}")]
    IdGeneration(#[from] IdGenerationError),
}

impl Error {
    /// Returns `true` for errors that describe an invalid catalog structure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Cycle { .. } | Self::DanglingDependency { .. } | Self::DuplicateMetric(_)
        )
    }
}

fn join_names(names: &[MetricName]) -> String {
    names
        .iter()
        .map(MetricName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A specialized Result type for lineage operations.
pub type Result<T> = std::result::Result<T, Error>;
