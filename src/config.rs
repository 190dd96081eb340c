//! Configuration management for the fixture harness
//!
//! Fixture discovery rules, comparison knobs and diagnostics behavior are
//! loaded from a JSON file so suites can adjust suffixes or timeouts without
//! recompiling. Every section falls back to defaults when omitted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive::CompareOptions;

/// Default location of the harness configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "fixtures/harness.json";

/// Complete harness configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub fixtures: FixtureConfig,
    pub compare: CompareOptions,
    pub diagnostics: DiagnosticsConfig,
    pub logging: LoggingConfig,
}

/// Fixture discovery parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Directory walked for fixtures
    pub root: PathBuf,
    /// Suffixes loaded as document archives
    pub document_suffixes: Vec<String>,
    /// Suffixes loaded as raw images
    pub image_suffixes: Vec<String>,
    /// Upper bound on waiting for every load to finish (unbounded when absent)
    pub settle_timeout_ms: Option<u64>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("fixtures"),
            document_suffixes: vec![".docx".to_string(), ".pptx".to_string()],
            image_suffixes: vec![".png".to_string()],
            settle_timeout_ms: None,
        }
    }
}

impl FixtureConfig {
    pub fn settle_timeout(&self) -> Option<Duration> {
        self.settle_timeout_ms.map(Duration::from_millis)
    }
}

/// Failure artifact handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Write the generated archive next to the fixture root when a comparison fails
    pub persist_failures: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            persist_failures: true,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum tracing level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Parse configuration from JSON; omitted sections use defaults.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the default configuration when the file
    /// is missing or invalid (a warning is logged).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.fixtures.root, PathBuf::from("fixtures"));
        assert_eq!(config.fixtures.document_suffixes, vec![".docx", ".pptx"]);
        assert_eq!(config.fixtures.image_suffixes, vec![".png"]);
        assert_eq!(config.fixtures.settle_timeout(), None);
        assert_eq!(config.compare.binary_markers, vec![".png"]);
        assert_eq!(config.compare.stripped_chars, "\n\t");
        assert!(config.diagnostics.persist_failures);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = HarnessConfig::from_json(
            r#"{"fixtures": {"root": "examples", "settle_timeout_ms": 2500}}"#,
        )
        .unwrap();
        assert_eq!(config.fixtures.root, PathBuf::from("examples"));
        assert_eq!(
            config.fixtures.settle_timeout(),
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.fixtures.document_suffixes, vec![".docx", ".pptx"]);
        assert_eq!(config.compare, CompareOptions::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = HarnessConfig::default();
        config.compare.binary_markers.push(".jpeg".into());
        config.diagnostics.persist_failures = false;
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed = HarnessConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load_from_file(dir.path().join("absent.json"));
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(HarnessConfig::load_from_file(&path), HarnessConfig::default());
    }
}
