//! # Session Error Types
//!
//! Error types for the session runtime.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Catalog      │  │     Runtime             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │ IndexLoadFailed │  │  Core (cart rules)      │ │
//! │  │  ConfigLoad/Save│  │                 │  │  NoActiveToast          │ │
//! │  │                 │  │                 │  │  ChannelClosed          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use scancart_core::CoreError;
use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error type.
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration values are out of range.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// Product index file could not be read.
    #[error("Failed to load product index from {path}: {reason}")]
    IndexLoadFailed { path: String, reason: String },

    // =========================================================================
    // Runtime Errors
    // =========================================================================
    /// Cart or validation rule failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Toast quantity controls used with no quantity-capable toast showing.
    #[error("No product toast is showing")]
    NoActiveToast,

    /// The host dropped the event receiver.
    #[error("Session event channel closed")]
    ChannelClosed,
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::IndexLoadFailed {
            path: "<bundled>".into(),
            reason: err.to_string(),
        }
    }
}

impl SessionError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidConfig(_)
                | SessionError::ConfigLoadFailed(_)
                | SessionError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: SessionError = CoreError::NotInCart("123".into()).into();
        assert_eq!(err.to_string(), "Code not in cart: 123");
        assert!(!err.is_config_error());
    }

    #[test]
    fn test_config_errors() {
        assert!(SessionError::InvalidConfig("debounce_ms".into()).is_config_error());

        let toml_err = toml::from_str::<toml::Value>("a = ").unwrap_err();
        let err: SessionError = toml_err.into();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_index_error_display() {
        let err = SessionError::IndexLoadFailed {
            path: "/tmp/index.json".into(),
            reason: "not found".into(),
        };
        assert!(err.to_string().contains("/tmp/index.json"));
    }
}
