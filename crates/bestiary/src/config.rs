//! Configuration management for bestiary.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bestiary";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "bestiary.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BESTIARY_`, nested with `__`)
/// 2. TOML config file at `~/.config/bestiary/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document scanning configuration.
    pub scan: ScanConfig,
    /// Catalogue storage configuration.
    pub storage: StorageConfig,
    /// Consistency check configuration.
    pub check: CheckConfig,
}

/// Where stat-block documents live and where the index goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory searched recursively for `*.html` stat blocks.
    pub html_dir: PathBuf,
    /// Directory searched recursively for `*.md` stat blocks.
    /// A Markdown file with an HTML twin is skipped.
    pub markdown_dir: PathBuf,
    /// JSON index written by `scan`.
    pub output_file: PathBuf,
    /// File stems ending with this suffix are attributed to `srd_source`.
    /// Empty disables the override.
    pub srd_suffix: String,
    /// Source label for SRD files.
    pub srd_source: String,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the catalogue database.
    /// Defaults to `~/.local/share/bestiary/bestiary.db`
    pub database_path: Option<PathBuf>,
}

/// Which optional consistency rules `check` applies.
///
/// Modifier and saving throw arithmetic is always checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Compare passive Perception against 10 + Perception (or WIS).
    pub passive_perception: bool,
    /// Compare the initiative score against 10 + initiative bonus.
    pub initiative: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            html_dir: PathBuf::from("monsters_html"),
            markdown_dir: PathBuf::from("monsters_md"),
            output_file: PathBuf::from("monstersfromhtml.json"),
            srd_suffix: "_mm_2024".to_string(),
            srd_source: "WotC SRD 5.2".to_string(),
        }
    }
}

impl ScanConfig {
    /// Validate the scan settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file is empty, an SRD suffix has no
    /// source label, or both directories are the same.
    pub fn validate(&self) -> Result<()> {
        if self.output_file.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "scan.output_file must not be empty".to_string(),
            });
        }

        if !self.srd_suffix.is_empty() && self.srd_source.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "scan.srd_source must be set when scan.srd_suffix is '{}'",
                    self.srd_suffix
                ),
            });
        }

        if self.html_dir == self.markdown_dir {
            return Err(Error::ConfigValidation {
                message: format!(
                    "scan.html_dir and scan.markdown_dir must differ (both are {})",
                    self.html_dir.display()
                ),
            });
        }

        Ok(())
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            passive_perception: true,
            initiative: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("BESTIARY_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scan_config() {
        let scan = ScanConfig::default();

        assert_eq!(scan.html_dir, PathBuf::from("monsters_html"));
        assert_eq!(scan.markdown_dir, PathBuf::from("monsters_md"));
        assert_eq!(scan.output_file, PathBuf::from("monstersfromhtml.json"));
        assert_eq!(scan.srd_suffix, "_mm_2024");
        assert_eq!(scan.srd_source, "WotC SRD 5.2");
    }

    #[test]
    fn test_default_check_config() {
        let check = CheckConfig::default();
        assert!(check.passive_perception);
        assert!(check.initiative);
    }

    #[test]
    fn test_default_storage_config() {
        assert!(StorageConfig::default().database_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_output_file() {
        let mut config = Config::default();
        config.scan.output_file = PathBuf::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("output_file"));
    }

    #[test]
    fn test_validate_srd_source_required() {
        let mut config = Config::default();
        config.scan.srd_source = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("srd_source"));

        config.scan.srd_suffix = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_same_directories() {
        let mut config = Config::default();
        config.scan.markdown_dir = config.scan.html_dir.clone();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must differ"));
    }

    #[test]
    fn test_scan_config_validate_standalone() {
        assert!(ScanConfig::default().validate().is_ok());

        let scan = ScanConfig {
            markdown_dir: PathBuf::from("shared"),
            html_dir: PathBuf::from("shared"),
            ..ScanConfig::default()
        };
        assert!(matches!(
            scan.validate(),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("bestiary.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("bestiary"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[scan]\nhtml_dir = \"pages\"\nsrd_suffix = \"\"\n\n[check]\ninitiative = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.scan.html_dir, PathBuf::from("pages"));
        assert_eq!(config.scan.markdown_dir, PathBuf::from("monsters_md"));
        assert!(config.scan.srd_suffix.is_empty());
        assert!(!config.check.initiative);
        assert!(config.check.passive_perception);
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scan]\nhtml_dir = \"same\"\nmarkdown_dir = \"same\"\n").unwrap();

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_scan_config_deserialize_partial() {
        let json = r#"{"output_file": "index.json"}"#;
        let scan: ScanConfig = serde_json::from_str(json).unwrap();
        assert_eq!(scan.output_file, PathBuf::from("index.json"));
        assert_eq!(scan.srd_suffix, "_mm_2024");
    }

    #[test]
    fn test_config_serialize_sections() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"scan\""));
        assert!(json.contains("\"storage\""));
        assert!(json.contains("passive_perception"));
    }
}
