//! # Error Types
//!
//! Domain-specific error types for scancart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  scancart-core errors (this file)                                      │
//! │  ├── CoreError        - Cart and index failures                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  scancart-session errors (separate crate)                              │
//! │  └── SessionError     - Config, file and channel failures              │
//! │                                                                         │
//! │  scanner app errors                                                    │
//! │  └── ApiError         - What the camera host sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → ApiError → Host     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A code missing from the product index is NOT an error. It is the normal
//! unknown-code branch of the classifier.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The code is already in the cart.
    ///
    /// ## When This Occurs
    /// - `CartStore::add` called for a code that is present
    /// - Cart codes are unique; quantity changes go through `set_quantity`
    #[error("Code already in cart: {0}")]
    DuplicateCode(String),

    /// The code is not in the cart.
    ///
    /// ## When This Occurs
    /// - Quantity change or removal for an item the user already removed
    /// - Toast quantity buttons pressed after "clear cart"
    #[error("Code not in cart: {0}")]
    NotInCart(String),

    /// The product lookup table could not be parsed.
    #[error("Failed to load product index: {0}")]
    IndexLoadFailed(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::IndexLoadFailed(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
