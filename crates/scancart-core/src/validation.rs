//! # Validation Module
//!
//! Input validation for values that cross in from the camera host.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Host UI (TypeScript)                                         │
//! │  ├── Disables "-" at quantity 1                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Host bridge (Rust)                                           │
//! │  └── Type validation (serde deserialization)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE                                                  │
//! │  ├── Barcode values: non-empty, bounded length                         │
//! │  ├── Quantities: clamped to the floor of 1                             │
//! │  └── Product index entries: non-empty names                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use scancart_core::validation::{validate_code, normalize_quantity};
//!
//! assert!(validate_code("3017620422003").is_ok());
//! assert!(validate_code("   ").is_err());
//!
//! assert_eq!(normalize_quantity(0).unwrap(), 1);
//! assert_eq!(normalize_quantity(5).unwrap(), 5);
//! ```

use crate::error::ValidationError;
use crate::types::Product;
use crate::MAX_CODE_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a decoded barcode value.
///
/// ## Rules
/// - Must contain at least one non-whitespace character
/// - At most [`MAX_CODE_LENGTH`] characters
///
/// The value is NOT trimmed: QR payloads may legitimately carry whitespace,
/// and the code is a lookup key that must match the index exactly.
pub fn validate_code(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LENGTH,
        });
    }

    Ok(())
}

/// Validates one product index entry.
///
/// ## Rules
/// - Code must pass [`validate_code`]
/// - Product name must not be blank
pub fn validate_index_entry(code: &str, product: &Product) -> ValidationResult<()> {
    validate_code(code)?;

    if product.name.trim().is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: format!("product[{}].name", code),
            reason: "must not be blank".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Converts a requested quantity into a stored quantity.
///
/// ## Rules
/// - Values below 1 are clamped to 1 (cart floor)
/// - Values above `u32::MAX` are rejected
pub fn normalize_quantity(requested: i64) -> ValidationResult<u32> {
    if requested < 1 {
        return Ok(1);
    }

    u32::try_from(requested).map_err(|_| ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 1,
        max: i64::from(u32::MAX),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("123").is_ok());
        assert!(validate_code("https://example.com/item?id=1").is_ok());
        assert!(validate_code(" padded ").is_ok());

        assert!(matches!(
            validate_code(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_code("\t\n"),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_code_length() {
        let max = "9".repeat(MAX_CODE_LENGTH);
        assert!(validate_code(&max).is_ok());

        let too_long = "9".repeat(MAX_CODE_LENGTH + 1);
        assert!(matches!(
            validate_code(&too_long),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_index_entry() {
        let good = Product {
            name: "Widget".to_string(),
            ref1: "A".to_string(),
            ref2: "B".to_string(),
        };
        assert!(validate_index_entry("123", &good).is_ok());

        let blank = Product {
            name: "  ".to_string(),
            ..good.clone()
        };
        assert!(validate_index_entry("123", &blank).is_err());
        assert!(validate_index_entry("", &good).is_err());
    }

    #[test]
    fn test_normalize_quantity_clamps_floor() {
        assert_eq!(normalize_quantity(-3).unwrap(), 1);
        assert_eq!(normalize_quantity(0).unwrap(), 1);
        assert_eq!(normalize_quantity(1).unwrap(), 1);
        assert_eq!(normalize_quantity(250).unwrap(), 250);
    }

    #[test]
    fn test_normalize_quantity_rejects_overflow() {
        let too_big = i64::from(u32::MAX) + 1;
        assert!(matches!(
            normalize_quantity(too_big),
            Err(ValidationError::OutOfRange { .. })
        ));
    }
}
