//! # Scanner Configuration
//!
//! Timing windows and catalog location for a scan session.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SCANCART_DEBOUNCE_MS=2000                                          │
//! │     SCANCART_PRODUCT_INDEX=/data/productIndex.json                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/scancart/scanner.toml (Linux)                            │
//! │     ~/Library/Application Support/com.scancart.scanner/scanner.toml    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     2000 ms debounce, 1500 ms persistence, 2500 ms toast               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [scan]
//! debounce_ms = 2000
//! unknown_persistence_ms = 1500
//! fps_window_ms = 1000
//!
//! [toast]
//! dismiss_ms = 2500
//!
//! [catalog]
//! product_index_path = "/data/productIndex.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use scancart_core::{
    ClassifierSettings, DEFAULT_DEBOUNCE_MS, DEFAULT_FPS_WINDOW_MS, DEFAULT_TOAST_DISMISS_MS,
    DEFAULT_UNKNOWN_PERSISTENCE_MS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Scan Settings
// =============================================================================

/// Classifier and metrics timing windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Same-code re-trigger window (ms).
    #[serde(default = "default_debounce")]
    pub debounce_ms: i64,

    /// Continuous-sight time before an unknown code is reported (ms).
    #[serde(default = "default_persistence")]
    pub unknown_persistence_ms: i64,

    /// Trailing window for the fps metric (ms).
    #[serde(default = "default_fps_window")]
    pub fps_window_ms: i64,
}

fn default_debounce() -> i64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_persistence() -> i64 {
    DEFAULT_UNKNOWN_PERSISTENCE_MS
}

fn default_fps_window() -> i64 {
    DEFAULT_FPS_WINDOW_MS
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            debounce_ms: default_debounce(),
            unknown_persistence_ms: default_persistence(),
            fps_window_ms: default_fps_window(),
        }
    }
}

impl ScanSettings {
    /// Classifier view of these settings.
    pub fn classifier(&self) -> ClassifierSettings {
        ClassifierSettings {
            debounce_ms: self.debounce_ms,
            unknown_persistence_ms: self.unknown_persistence_ms,
        }
    }
}

// =============================================================================
// Toast Settings
// =============================================================================

/// Toast overlay behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastSettings {
    /// Time without interaction before the toast hides itself (ms).
    #[serde(default = "default_dismiss")]
    pub dismiss_ms: u64,
}

fn default_dismiss() -> u64 {
    DEFAULT_TOAST_DISMISS_MS
}

impl Default for ToastSettings {
    fn default() -> Self {
        ToastSettings {
            dismiss_ms: default_dismiss(),
        }
    }
}

impl ToastSettings {
    /// Dismiss delay as a `Duration`.
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_ms)
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where the product index comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON product index on disk. When unset the host's bundled index is used.
    #[serde(default)]
    pub product_index_path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub toast: ToastSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl ScannerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scanner config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        let windows = [
            ("scan.debounce_ms", self.scan.debounce_ms),
            ("scan.unknown_persistence_ms", self.scan.unknown_persistence_ms),
            ("scan.fps_window_ms", self.scan.fps_window_ms),
        ];

        for (name, value) in windows {
            if value <= 0 {
                return Err(SessionError::InvalidConfig(format!(
                    "{} must be greater than 0, got {}",
                    name, value
                )));
            }
        }

        if self.toast.dismiss_ms == 0 {
            return Err(SessionError::InvalidConfig(
                "toast.dismiss_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (environment in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ms) = parse_override::<i64>(&lookup, "SCANCART_DEBOUNCE_MS") {
            debug!(ms, "Overriding debounce window from environment");
            self.scan.debounce_ms = ms;
        }

        if let Some(ms) = parse_override::<i64>(&lookup, "SCANCART_PERSISTENCE_MS") {
            debug!(ms, "Overriding unknown persistence window from environment");
            self.scan.unknown_persistence_ms = ms;
        }

        if let Some(ms) = parse_override::<i64>(&lookup, "SCANCART_FPS_WINDOW_MS") {
            self.scan.fps_window_ms = ms;
        }

        if let Some(ms) = parse_override::<u64>(&lookup, "SCANCART_TOAST_DISMISS_MS") {
            self.toast.dismiss_ms = ms;
        }

        if let Some(path) = lookup("SCANCART_PRODUCT_INDEX") {
            debug!(path = %path, "Overriding product index path from environment");
            self.catalog.product_index_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "scancart", "scanner")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("scancart-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_default_config() {
        let config = ScannerConfig::default();
        assert_eq!(config.scan.debounce_ms, 2000);
        assert_eq!(config.scan.unknown_persistence_ms, 1500);
        assert_eq!(config.scan.fps_window_ms, 1000);
        assert_eq!(config.toast.dismiss_ms, 2500);
        assert!(config.catalog.product_index_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ScannerConfig::default();
        config.scan.debounce_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.scan.unknown_persistence_ms = -1;
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.toast.dismiss_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ScannerConfig = toml::from_str(
            r#"
            [scan]
            debounce_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.debounce_ms, 500);
        assert_eq!(config.scan.unknown_persistence_ms, 1500);
        assert_eq!(config.toast.dismiss_ms, 2500);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SCANCART_DEBOUNCE_MS", "750"),
            ("SCANCART_PERSISTENCE_MS", "not-a-number"),
            ("SCANCART_TOAST_DISMISS_MS", "4000"),
            ("SCANCART_PRODUCT_INDEX", "/data/index.json"),
        ]
        .into_iter()
        .collect();

        let mut config = ScannerConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.scan.debounce_ms, 750);
        // Unparseable value is ignored
        assert_eq!(config.scan.unknown_persistence_ms, 1500);
        assert_eq!(config.toast.dismiss_ms, 4000);
        assert_eq!(
            config.catalog.product_index_path,
            Some(PathBuf::from("/data/index.json"))
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("scanner.toml");

        let mut config = ScannerConfig::default();
        config.scan.debounce_ms = 1234;
        config.save(Some(path.clone())).unwrap();

        let loaded = ScannerConfig::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.scan.debounce_ms, 1234);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_file_falls_back_to_default() {
        let path = temp_path("scanner.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[scan]\ndebounce_ms = 0\n").unwrap();

        assert!(ScannerConfig::load(Some(path.clone())).is_err());
        let config = ScannerConfig::load_or_default(Some(path.clone()));
        assert_eq!(config.scan.debounce_ms, 2000);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_toml_serialization() {
        let config = ScannerConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scan]"));
        assert!(toml_str.contains("[toast]"));
    }

    #[test]
    fn test_classifier_settings() {
        let settings = ScanSettings::default().classifier();
        assert_eq!(settings, ClassifierSettings::default());
    }
}
