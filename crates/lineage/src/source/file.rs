//! File-backed definition source.

use super::DefinitionSource;
use crate::domain::MetricDefinition;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// On-disk layout of a definitions file.
///
/// ```yaml
/// metrics:
///   - name: ad_clicks
///     type: counter
///     owner: ads-team
///   - name: ctr
///     type: ratio
///     owner: ads-team
///     dependencies: [ad_clicks, ad_impressions]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionDocument {
    /// Declared metrics, in file order
    #[serde(default)]
    pub metrics: Vec<MetricDefinition>,
}

/// Serialization format of a definitions file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// YAML document
    Yaml,
    /// JSON document
    Json,
}

impl FileFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Parse a document in this format.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` naming `source_name` if the content is invalid.
    pub fn parse(self, content: &str, source_name: &str) -> Result<DefinitionDocument> {
        let parsed = match self {
            // An empty YAML file is an empty catalog, not an error.
            Self::Yaml if content.trim().is_empty() => Ok(DefinitionDocument::default()),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::Parse {
            source_name: source_name.to_string(),
            message,
        })
    }
}

/// Definitions read from a YAML or JSON file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: FileFormat,
}

impl FileSource {
    /// Read from `path`, inferring the format from its extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self { path, format }
    }

    /// Read from `path` in an explicit format
    pub fn with_format(path: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Path of the definitions file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DefinitionSource for FileSource {
    async fn load(&self) -> Result<Vec<MetricDefinition>> {
        let content = fs::read_to_string(&self.path).await?;
        let document = self.format.parse(&content, &self.describe())?;

        tracing::debug!(
            path = %self.path.display(),
            count = document.metrics.len(),
            "Loaded metric definitions"
        );

        Ok(document.metrics)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
