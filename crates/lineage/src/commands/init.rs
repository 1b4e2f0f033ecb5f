//! Implementation of the `init` command.
//!
//! Writes a `lineage.yaml` configuration and a starter `metrics.yaml`
//! catalog into a directory, and locates an existing configuration by
//! walking up the directory tree.

use crate::config::{CONFIG_FILE_NAME, DEFAULT_DEFINITIONS_FILE, LineageConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum directory depth to traverse when searching for a configuration
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Starter catalog written by `init`
pub const STARTER_CATALOG: &str = include_str!("../../../../demos/metrics.yaml");

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the definitions file
    pub definitions_file: PathBuf,
    /// Whether the definitions file was created (false if it already existed)
    pub created_definitions: bool,
}

/// Initialize a lineage project in `base_dir`.
///
/// An existing definitions file is left untouched; only the configuration
/// is created.
///
/// # Errors
///
/// Returns an error if a `lineage.yaml` already exists or a write fails.
pub async fn init(base_dir: &Path) -> Result<InitResult> {
    let config_file = base_dir.join(CONFIG_FILE_NAME);

    if config_file.exists() {
        return Err(Error::Config(format!(
            "Lineage is already initialized in this directory. Found existing '{CONFIG_FILE_NAME}'"
        )));
    }

    fs::create_dir_all(base_dir).await?;

    let config = LineageConfig::default();
    config.save(&config_file).await?;

    let definitions_file = base_dir.join(DEFAULT_DEFINITIONS_FILE);
    let created_definitions = !definitions_file.exists();
    if created_definitions {
        fs::write(&definitions_file, STARTER_CATALOG).await?;
    }

    tracing::info!(
        config = %config_file.display(),
        created_definitions,
        "Initialized lineage project"
    );

    Ok(InitResult {
        config_file,
        definitions_file,
        created_definitions,
    })
}

/// Find the nearest directory containing `lineage.yaml`.
///
/// Starts at `start_dir` and walks parent directories until a configuration
/// is found, the filesystem root is reached, or the depth limit is hit.
pub fn find_config_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DefinitionSource, FileSource};
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_config_and_starter_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(temp_dir.path()).await.unwrap();

        assert!(result.config_file.exists());
        assert!(result.created_definitions);

        let config = LineageConfig::load(&result.config_file).await.unwrap();
        assert_eq!(config, LineageConfig::default());

        let definitions = FileSource::new(&result.definitions_file).load().await.unwrap();
        assert!(definitions.iter().any(|d| d.name.as_str() == "ctr"));
    }

    #[tokio::test]
    async fn init_keeps_existing_definitions() {
        let temp_dir = TempDir::new().unwrap();
        let definitions = temp_dir.path().join(DEFAULT_DEFINITIONS_FILE);
        std::fs::write(&definitions, "metrics: []\n").unwrap();

        let result = init(temp_dir.path()).await.unwrap();

        assert!(!result.created_definitions);
        assert_eq!(std::fs::read_to_string(definitions).unwrap(), "metrics: []\n");
    }

    #[tokio::test]
    async fn init_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path()).await.unwrap();

        let err = init(temp_dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[tokio::test]
    async fn config_root_found_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path()).await.unwrap();

        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_root(&nested), Some(temp_dir.path().to_path_buf()));
    }

    #[test]
    fn config_root_absent() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_config_root(temp_dir.path()).is_none());
    }
}
