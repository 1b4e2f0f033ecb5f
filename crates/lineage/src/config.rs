//! Project configuration (`lineage.yaml`).
//!
//! ```yaml
//! definitions: metrics.yaml
//! anomaly:
//!   threshold: 3.0
//!   stddev-epsilon: 0.000001
//! ```

use crate::anomaly::{DEFAULT_STDDEV_EPSILON, ZScoreDetector, validate_threshold};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "lineage.yaml";

/// Default definitions file name
pub const DEFAULT_DEFINITIONS_FILE: &str = "metrics.yaml";

/// Default z-score threshold
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineageConfig {
    /// Path to the metric definitions file, relative to the config file
    pub definitions: PathBuf,

    /// Anomaly detector settings
    #[serde(default)]
    pub anomaly: AnomalyConfig,
}

/// Anomaly detector section
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AnomalyConfig {
    /// Absolute z-score above which a value is anomalous
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Standard deviation used when the baseline has zero variance
    #[serde(rename = "stddev-epsilon", default = "default_epsilon")]
    pub stddev_epsilon: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_epsilon() -> f64 {
    DEFAULT_STDDEV_EPSILON
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            stddev_epsilon: DEFAULT_STDDEV_EPSILON,
        }
    }
}

impl AnomalyConfig {
    /// Build an unfitted detector from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold or epsilon is out of range.
    pub fn detector(&self) -> Result<ZScoreDetector> {
        ZScoreDetector::with_epsilon(self.threshold, self.stddev_epsilon)
    }
}

impl LineageConfig {
    /// Create a configuration pointing at `definitions`
    pub fn new(definitions: impl Into<PathBuf>) -> Self {
        Self {
            definitions: definitions.into(),
            anomaly: AnomalyConfig::default(),
        }
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is malformed or holds an invalid threshold.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Check the anomaly section.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidThreshold` or `Error::Config` for out-of-range
    /// values.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.anomaly.threshold)?;
        self.anomaly.detector().map(|_| ())
    }

    /// Definitions path, resolved against `base_dir` when relative
    #[must_use]
    pub fn resolve_definitions(&self, base_dir: &Path) -> PathBuf {
        if self.definitions.is_absolute() {
            self.definitions.clone()
        } else {
            base_dir.join(&self.definitions)
        }
    }
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEFINITIONS_FILE)
    }
}
