//! Application context for CLI command execution.
//!
//! [`App`] resolves where the definitions live, loads them and keeps the
//! validated [`LineageContext`] for the command being run.
//!
//! Resolution order:
//!
//! 1. `--config <file>` if given, otherwise the nearest `lineage.yaml` found
//!    walking up from the working directory.
//! 2. `--definitions <file>` if given (relative to the working directory),
//!    otherwise the config's `definitions` path (relative to the config
//!    file), otherwise `metrics.yaml` in the working directory.
//!
//! # Example
//!
//! ```no_run
//! use lineage::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::open(Path::new("."), None, None).await?;
//!     println!("{} metrics", app.context().catalog().len());
//!     Ok(())
//! }
//! ```

use crate::commands::init::find_config_root;
use crate::config::{CONFIG_FILE_NAME, DEFAULT_DEFINITIONS_FILE, LineageConfig};
use crate::context::LineageContext;
use crate::error::Result;
use crate::source::FileSource;
use std::path::{Path, PathBuf};

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    context: LineageContext,
    definitions_path: PathBuf,
    config_path: Option<PathBuf>,
}

impl App {
    /// Resolve paths relative to `working_dir` and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or definitions cannot be read,
    /// or if the catalog fails validation.
    pub async fn open(
        working_dir: &Path,
        config: Option<&Path>,
        definitions: Option<&Path>,
    ) -> Result<Self> {
        let config_path = match config {
            Some(path) => Some(working_dir.join(path)),
            None => find_config_root(working_dir).map(|root| root.join(CONFIG_FILE_NAME)),
        };

        let loaded = match &config_path {
            Some(path) => Some(LineageConfig::load(path).await?),
            None => None,
        };

        let definitions_path = match (definitions, &loaded, &config_path) {
            (Some(path), _, _) => working_dir.join(path),
            (None, Some(cfg), Some(cfg_path)) => {
                let base = cfg_path.parent().unwrap_or(working_dir);
                cfg.resolve_definitions(base)
            }
            _ => working_dir.join(DEFAULT_DEFINITIONS_FILE),
        };

        tracing::debug!(
            config = ?config_path,
            definitions = %definitions_path.display(),
            "Resolved lineage paths"
        );

        let mut context = LineageContext::load(&FileSource::new(&definitions_path)).await?;
        if let Some(cfg) = loaded {
            context = context.with_anomaly_config(cfg.anomaly);
        }

        Ok(Self {
            context,
            definitions_path,
            config_path,
        })
    }

    /// The loaded, validated catalog
    pub fn context(&self) -> &LineageContext {
        &self.context
    }

    /// Consume the app, keeping only the catalog
    pub fn into_context(self) -> LineageContext {
        self.context
    }

    /// Definitions file that was loaded
    pub fn definitions_path(&self) -> &Path {
        &self.definitions_path
    }

    /// Configuration file that was used, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use crate::error::Error;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_app_from_initialized_directory() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();

        let app = App::open(temp_dir.path(), None, None).await.unwrap();

        assert!(app.config_path().is_some());
        assert!(app.definitions_path().ends_with("metrics.yaml"));
        assert!(app.context().catalog().contains("ads_health"));
    }

    #[tokio::test]
    async fn test_app_from_subdirectory_resolves_against_config() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();
        let nested = temp_dir.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let app = App::open(&nested, None, None).await.unwrap();

        assert_eq!(
            app.definitions_path(),
            temp_dir.path().join("metrics.yaml").as_path()
        );
    }

    #[tokio::test]
    async fn test_explicit_definitions_override_config() {
        let temp_dir = TempDir::new().unwrap();
        init::init(temp_dir.path()).await.unwrap();
        std::fs::write(
            temp_dir.path().join("other.yaml"),
            "metrics:\n  - name: only\n    type: gauge\n    owner: me\n",
        )
        .unwrap();

        let app = App::open(temp_dir.path(), None, Some(Path::new("other.yaml")))
            .await
            .unwrap();

        assert_eq!(app.context().catalog().len(), 1);
    }

    #[tokio::test]
    async fn test_config_threshold_reaches_detector() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("metrics.yaml"), "metrics: []\n").unwrap();
        std::fs::write(
            temp_dir.path().join("custom.yaml"),
            "definitions: metrics.yaml\nanomaly:\n  threshold: 2.0\n",
        )
        .unwrap();

        let app = App::open(temp_dir.path(), Some(Path::new("custom.yaml")), None)
            .await
            .unwrap();

        let detector = app.context().detector().unwrap();
        assert!((detector.threshold() - 2.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_definitions_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = App::open(temp_dir.path(), None, None).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_invalid_catalog_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("metrics.yaml"),
            "metrics:\n  - name: a\n    type: ratio\n    owner: t\n    dependencies: [ghost]\n",
        )
        .unwrap();

        let err = App::open(temp_dir.path(), None, None).await.unwrap_err();
        assert!(err.is_validation_error());
    }
}
