//! # API Error Type
//!
//! Unified error type for host commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Host Bridge                        │
//! │                                                                         │
//! │  stdin line                                                             │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Unparseable? ────────── serde_json::Error ──────────► INVALID_COMMAND  │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Code not in cart? ───── CoreError::NotInCart ───────► NOT_FOUND        │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Blank code? ─────────── CoreError::Validation ──────► VALIDATION_ERROR │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  No product toast? ───── SessionError::NoActiveToast ► CART_ERROR       │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  Bad config? ─────────── SessionError::*Config* ─────► CONFIG_ERROR     │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  {"error":{"code":"...","message":"..."}} on stdout                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use scancart_core::CoreError;
use scancart_session::SessionError;
use serde::Serialize;

/// Error line written for a failed command.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Cart item not found: 123" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for host responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Code not in cart
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart or toast operation not possible
    CartError,

    /// Line is not a known command
    InvalidCommand,

    /// Configuration could not be loaded, validated or saved
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotInCart(code) => ApiError::not_found("Cart item", &code),
            CoreError::DuplicateCode(code) => {
                ApiError::cart(format!("Code already in cart: {}", code))
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::IndexLoadFailed(e) => {
                tracing::error!("Product index error: {}", e);
                ApiError::internal("Product index unavailable")
            }
        }
    }
}

/// Converts session errors to API errors.
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Core(e) => ApiError::from(e),
            SessionError::NoActiveToast => ApiError::cart("No product toast is showing"),
            other if other.is_config_error() => {
                tracing::warn!("Configuration error: {}", other);
                ApiError::new(ErrorCode::ConfigError, other.to_string())
            }
            other => {
                tracing::error!("Session error: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

/// Converts malformed command lines.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::new(ErrorCode::InvalidCommand, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use scancart_core::ValidationError;

    #[test]
    fn test_error_code_serialization() {
        let err = ApiError::not_found("Cart item", "123");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Cart item not found: 123");
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "code".into(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err: ApiError = CoreError::DuplicateCode("1".into()).into();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_session_error_mapping() {
        let err: ApiError = SessionError::Core(CoreError::NotInCart("9".into())).into();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err: ApiError = SessionError::NoActiveToast.into();
        assert_eq!(err.code, ErrorCode::CartError);

        let err: ApiError = SessionError::ChannelClosed.into();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_config_errors_share_one_code() {
        for err in [
            SessionError::InvalidConfig("debounce_ms must be positive".into()),
            SessionError::ConfigLoadFailed("bad toml".into()),
            SessionError::ConfigSaveFailed("read-only".into()),
        ] {
            let api: ApiError = err.into();
            assert_eq!(api.code, ErrorCode::ConfigError);
        }

        let json = serde_json::to_value(ApiError::from(SessionError::InvalidConfig("x".into()))).unwrap();
        assert_eq!(json["code"], "CONFIG_ERROR");

        let err: ApiError = SessionError::IndexLoadFailed {
            path: "<bundled>".into(),
            reason: "eof".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Internal);
    }

    #[test]
    fn test_error_line_shape() {
        let line = crate::commands::OutputLine::Error(ApiError::cart("No product toast is showing"));
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["error"]["code"], "CART_ERROR");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_bad_json_is_invalid_command() {
        let err: ApiError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidCommand);
    }
}
