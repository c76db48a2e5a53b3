//! # Domain Types
//!
//! Core domain types used throughout ScanCart.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │   ToastData     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  code (unique)  │   │  Success        │       │
//! │  │  ref1           │   │  product        │   │  Duplicate      │       │
//! │  │  ref2           │   │  quantity ≥ 1   │   │  Error          │       │
//! │  └─────────────────┘   │  added_at (ms)  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Barcode      │   │DetectionMetrics │   │VibrationPattern │       │
//! │  │  raw_value      │   │  first / last   │   │  Short  (20ms)  │       │
//! │  │  geometry       │   │  latency, fps   │   │  Medium (50ms)  │       │
//! │  └─────────────────┘   └─────────────────┘   │  DoublePulse    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timestamps
//! All timestamps are milliseconds since the Unix epoch ([`TimestampMs`]).
//! The core never reads a clock; callers pass `now` in.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

// =============================================================================
// Product
// =============================================================================

/// Static reference data for a barcode, from the product index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Display name.
    pub name: String,

    /// First internal reference.
    pub ref1: String,

    /// Second internal reference.
    pub ref2: String,
}

impl Product {
    /// Builds the placeholder product used when the user adds an unknown code.
    ///
    /// ## Example
    /// ```rust
    /// use scancart_core::Product;
    ///
    /// let p = Product::placeholder("999");
    /// assert_eq!(p.name, "Unknown product (999)");
    /// assert_eq!(p.ref1, "999");
    /// assert_eq!(p.ref2, "-");
    /// ```
    pub fn placeholder(code: &str) -> Self {
        Product {
            name: format!("Unknown product ({})", code),
            ref1: code.to_string(),
            ref2: "-".to_string(),
        }
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the shopping cart.
///
/// The product is a snapshot taken when the item was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Barcode value; unique within a cart.
    pub code: String,

    /// Product data at time of adding.
    pub product: Product,

    /// Units of this code, never below 1.
    pub quantity: u32,

    /// When this item was added (ms since epoch).
    pub added_at: TimestampMs,
}

impl CartItem {
    /// Creates a cart item with quantity 1.
    pub fn new(code: impl Into<String>, product: Product, added_at: TimestampMs) -> Self {
        CartItem {
            code: code.into(),
            product,
            quantity: 1,
            added_at,
        }
    }
}

// =============================================================================
// Toast
// =============================================================================

/// Kind of toast, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ToastKind {
    /// Item was added to the cart.
    Success,
    /// Code is not in the index and not in the cart.
    Error,
    /// Item was already in the cart.
    Duplicate,
}

/// Payload of the transient notification overlay.
///
/// Success and Duplicate always carry the product so the overlay can show
/// name and references; Error only knows the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ToastData {
    /// Item was added to the cart.
    Success { code: String, product: Product },
    /// Code persisted in frame but is unknown.
    Error { code: String },
    /// Item was already in the cart; quantity unchanged.
    Duplicate { code: String, product: Product },
}

impl ToastData {
    /// The barcode the toast is about.
    pub fn code(&self) -> &str {
        match self {
            ToastData::Success { code, .. }
            | ToastData::Error { code }
            | ToastData::Duplicate { code, .. } => code,
        }
    }

    /// The product, if known.
    pub fn product(&self) -> Option<&Product> {
        match self {
            ToastData::Success { product, .. } | ToastData::Duplicate { product, .. } => {
                Some(product)
            }
            ToastData::Error { .. } => None,
        }
    }

    /// The kind of toast.
    pub fn kind(&self) -> ToastKind {
        match self {
            ToastData::Success { .. } => ToastKind::Success,
            ToastData::Error { .. } => ToastKind::Error,
            ToastData::Duplicate { .. } => ToastKind::Duplicate,
        }
    }

    /// Whether the overlay offers quantity +/- for this toast.
    pub fn has_quantity_controls(&self) -> bool {
        !matches!(self, ToastData::Error { .. })
    }
}

// =============================================================================
// Vibration
// =============================================================================

/// Haptic feedback requested alongside a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum VibrationPattern {
    /// Light tap for duplicates.
    Short,
    /// Firm buzz for a new item.
    Medium,
    /// Two pulses for an unknown code.
    DoublePulse,
}

impl VibrationPattern {
    /// Pattern in host vibration API form: alternating wait/vibrate ms.
    ///
    /// A single element is a plain vibration duration.
    pub fn durations_ms(&self) -> &'static [u64] {
        match self {
            VibrationPattern::Short => &[20],
            VibrationPattern::Medium => &[50],
            VibrationPattern::DoublePulse => &[0, 50, 50, 50],
        }
    }
}

// =============================================================================
// Barcode
// =============================================================================

/// One decoded barcode from a camera frame.
///
/// Geometry is forwarded for display only; scan logic uses `raw_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Barcode {
    pub raw_value: String,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Barcode {
    /// A barcode with no geometry, mostly for tests and replays.
    pub fn from_value(raw_value: impl Into<String>) -> Self {
        Barcode {
            raw_value: raw_value.into(),
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            right: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

// =============================================================================
// Detection Metrics
// =============================================================================

/// Debug overlay timing metrics.
///
/// Process-local and never persisted. All fields go back to null/0 on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DetectionMetrics {
    /// Time from session anchor to the first scan (ms).
    pub first_detection_time: Option<i64>,

    /// Timestamp of the latest scan (ms since epoch).
    pub last_detection_time: Option<TimestampMs>,

    /// Time between the start of one distinct code and the next (ms).
    pub detection_latency: Option<i64>,

    /// Scans since the last reset.
    pub scan_count: u32,

    /// Scans within the trailing window.
    pub fps: u32,
}

// =============================================================================
// Unknown Code Tracker
// =============================================================================

/// Single-slot memory of the unknown code currently in frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnknownCodeTracker {
    pub code: String,
    pub first_seen: TimestampMs,
}

impl UnknownCodeTracker {
    /// How long the code has been in sight at `now`.
    pub fn seen_for(&self, now: TimestampMs) -> i64 {
        now.saturating_sub(self.first_seen)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Product {
        Product {
            name: "Widget".to_string(),
            ref1: "A".to_string(),
            ref2: "B".to_string(),
        }
    }

    #[test]
    fn test_placeholder_product() {
        let p = Product::placeholder("4006381333931");
        assert_eq!(p.name, "Unknown product (4006381333931)");
        assert_eq!(p.ref1, "4006381333931");
        assert_eq!(p.ref2, "-");
    }

    #[test]
    fn test_cart_item_starts_at_one() {
        let item = CartItem::new("123", widget(), 1_700_000_000_000);
        assert_eq!(item.quantity, 1);
        assert_eq!(item.added_at, 1_700_000_000_000);
    }

    #[test]
    fn test_tracker_seen_for_saturates() {
        let tracker = UnknownCodeTracker {
            code: "999".to_string(),
            first_seen: i64::MIN,
        };
        assert_eq!(tracker.seen_for(i64::MAX), i64::MAX);
        assert_eq!(tracker.seen_for(i64::MIN + 1500), 1500);
    }

    #[test]
    fn test_toast_accessors() {
        let toast = ToastData::Duplicate {
            code: "123".to_string(),
            product: widget(),
        };
        assert_eq!(toast.code(), "123");
        assert_eq!(toast.kind(), ToastKind::Duplicate);
        assert_eq!(toast.product().map(|p| p.name.as_str()), Some("Widget"));
        assert!(toast.has_quantity_controls());

        let toast = ToastData::Error {
            code: "999".to_string(),
        };
        assert!(toast.product().is_none());
        assert!(!toast.has_quantity_controls());
    }

    #[test]
    fn test_toast_serializes_with_type_tag() {
        let toast = ToastData::Error {
            code: "999".to_string(),
        };
        let json = serde_json::to_value(&toast).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "999");
    }

    #[test]
    fn test_barcode_deserializes_host_shape() {
        let json = r#"{"rawValue":"123","top":1,"bottom":2,"left":3,"right":4,"width":5,"height":6}"#;
        let barcode: Barcode = serde_json::from_str(json).unwrap();
        assert_eq!(barcode.raw_value, "123");
        assert_eq!(barcode.height, 6.0);

        let bare: Barcode = serde_json::from_str(r#"{"rawValue":"456"}"#).unwrap();
        assert_eq!(bare, Barcode::from_value("456"));
    }

    #[test]
    fn test_vibration_patterns() {
        assert_eq!(VibrationPattern::Short.durations_ms(), &[20]);
        assert_eq!(VibrationPattern::Medium.durations_ms(), &[50]);
        assert_eq!(VibrationPattern::DoublePulse.durations_ms(), &[0, 50, 50, 50]);
    }

    #[test]
    fn test_metrics_default_is_cleared() {
        let m = DetectionMetrics::default();
        assert_eq!(m.scan_count, 0);
        assert_eq!(m.fps, 0);
        assert!(m.first_detection_time.is_none());
        assert!(m.last_detection_time.is_none());
        assert!(m.detection_latency.is_none());
    }
}
