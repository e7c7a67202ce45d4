//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [search]
//! base_url = "http://localhost:5000"
//! reference = "semantic"
//! baseline = "bm25"
//!
//! [dataset]
//! id = "movies"
//! index = "search-movies"
//!
//! [logging]
//! level = "info"
//! file = false
//! ```

use std::path::{Path, PathBuf};

use searchlens_compare::{CompareConfig, DatasetRef};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset queried when no `--dataset` is given.
    pub dataset: DatasetConfig,
    /// Log level and file output.
    pub logging: LoggingConfig,
    /// Search API and comparison settings.
    pub search: CompareConfig,
}

/// Default dataset selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset id sent as the `dataset` parameter.
    pub id: String,
    /// Search index the dataset lives in.
    pub index: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            id: "movies".into(),
            index: "search-movies".into(),
        }
    }
}

impl DatasetConfig {
    /// The wire-level reference for this dataset.
    pub fn to_ref(&self) -> DatasetRef {
        DatasetRef::new(self.id.clone(), self.index.clone())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write logs to `<data dir>/logs/searchlens.log`.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize to pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Returns the default config file path: `<config dir>/searchlens/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::lens_dirs::config_file()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use searchlens_compare::ToggleParam;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.search.validate().is_ok());
        assert_eq!(config.dataset.id, "movies");
        assert_eq!(config.dataset.index, "search-movies");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.file);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(Path::new("/nonexistent/path/config.toml"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();

        let result = AppConfig::from_file(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn load_or_default_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_and_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.search.base_url = "https://search.example.com".into();
        config.search.toggle = ToggleParam::Rrf;
        config.search.k = Some(25);
        config.dataset.id = "tmdb".into();
        config.logging.file = true;

        config.save_to_file(&path).unwrap();
        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [search]
            base_url = "http://search:8080"

            [dataset]
            id = "tmdb"
            "#,
        )
        .unwrap();
        assert_eq!(config.search.base_url, "http://search:8080");
        assert_eq!(config.search.baseline, "bm25");
        assert_eq!(config.dataset.id, "tmdb");
        assert_eq!(config.dataset.index, "search-movies");
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn three_way_layout_from_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [search]
            reference = "hybrid"
            toggle = "rrf"

            [[search.types]]
            id = "bm25"
            label = "BM25"

            [[search.types]]
            id = "semantic"
            label = "Semantic"

            [[search.types]]
            id = "hybrid"
            label = "Hybrid"
            show_change = true
            hybrid_capable = true
            "#,
        )
        .unwrap();
        assert_eq!(config.search.types.len(), 3);
        assert_eq!(config.search.toggle, ToggleParam::Rrf);
        assert!(config.search.validate().is_ok());
    }

    #[test]
    fn serialized_config_mentions_sections() {
        let toml_str = AppConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[search]"));
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[logging]"));
        assert!(toml_str.contains("[[search.types]]"));
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn dataset_ref_from_config() {
        let dataset = DatasetConfig::default().to_ref();
        assert_eq!(dataset, DatasetRef::new("movies", "search-movies"));
    }
}
