//! Metric definition sources.
//!
//! Loading definitions is the one place the library touches the outside
//! world. The [`DefinitionSource`] trait is the boundary; implementations
//! return definitions in load order and never validate cross-references
//! (that is the dependency graph's job).
//!
//! - [`FileSource`]: a YAML or JSON document with a top-level `metrics` list
//! - [`StaticSource`]: definitions already in memory (tests, embedding)
//!
//! # Example
//!
//! ```no_run
//! use lineage::source::{DefinitionSource, FileSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let source = FileSource::new("metrics.yaml");
//!     let definitions = source.load().await?;
//!     println!("Loaded {} metrics from {}", definitions.len(), source.describe());
//!     Ok(())
//! }
//! ```

mod file;

pub use file::{DefinitionDocument, FileFormat, FileSource};

use crate::domain::MetricDefinition;
use crate::error::Result;
use async_trait::async_trait;

/// A provider of metric definitions.
///
/// Implementations must be `Send + Sync` so a source can be handed to a
/// spawned task or shared by a server.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Load every definition, in source order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the source cannot be read and `Error::Parse` if
    /// its content is not a valid definition document.
    async fn load(&self) -> Result<Vec<MetricDefinition>>;

    /// Short human-readable description, used in logs and messages
    fn describe(&self) -> String;
}

/// Definitions held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    definitions: Vec<MetricDefinition>,
}

impl StaticSource {
    /// Wrap a list of definitions
    #[must_use]
    pub fn new(definitions: Vec<MetricDefinition>) -> Self {
        Self { definitions }
    }
}

#[async_trait]
impl DefinitionSource for StaticSource {
    async fn load(&self) -> Result<Vec<MetricDefinition>> {
        Ok(self.definitions.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory definitions", self.definitions.len())
    }
}
