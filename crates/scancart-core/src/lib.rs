//! # scancart-core: Pure Scan Logic for ScanCart
//!
//! This crate holds every decision ScanCart makes about a decoded barcode.
//! It has zero I/O dependencies: no camera, no clock, no files.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanCart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Camera Host (TypeScript UI)                       │   │
//! │  │    Barcode frames ──► Toast overlay ──► Cart screen             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON lines                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              scancart-session / apps/scanner                    │   │
//! │  │    config, toast timer, shared state, event channel             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ scancart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   index   │  │   cart    │  │ classifier│  │   │
//! │  │   │  Product  │  │ code ──►  │  │ CartStore │  │ debounce  │  │   │
//! │  │   │ ToastData │  │  Product  │  │   Cart    │  │  unknowns │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │  metrics  │  │ validation│   NO I/O • NO CLOCK • NO ASYNC  │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, ToastData, metrics)
//! - [`index`] - Static product lookup table
//! - [`cart`] - Cart store trait and the in-memory cart
//! - [`classifier`] - Scan event classifier (debounce + unknown tracking)
//! - [`metrics`] - Detection timing recorder
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use scancart_core::{Cart, CartStore, ClassifierSettings, ProductIndex, ScanClassifier, ScanDecision};
//!
//! let index = ProductIndex::from_json_str(
//!     r#"{"123": {"name": "Widget", "ref1": "A", "ref2": "B"}}"#,
//! ).unwrap();
//! let mut cart = Cart::new();
//! let mut classifier = ScanClassifier::new(ClassifierSettings::default());
//!
//! let outcome = classifier.classify("123", 0, &index, &cart);
//! assert_eq!(outcome.decision, ScanDecision::AddedNew);
//! if let Some(item) = outcome.cart_item() {
//!     cart.add(item.clone()).unwrap();
//! }
//!
//! // Still in frame half a second later: debounced.
//! let outcome = classifier.classify("123", 500, &index, &cart);
//! assert_eq!(outcome.decision, ScanDecision::Debounced);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod classifier;
pub mod error;
pub mod index;
pub mod metrics;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartStore, CartSummary};
pub use classifier::{Classification, ClassifierSettings, Effect, ScanClassifier, ScanDecision};
pub use error::{CoreError, CoreResult, ValidationError};
pub use index::ProductIndex;
pub use metrics::MetricsRecorder;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Minimum time before the same code can re-trigger a cart action.
///
/// A barcode held in front of the camera is decoded on every frame; without
/// this window it would be re-added or re-toasted many times per second.
pub const DEFAULT_DEBOUNCE_MS: i64 = 2000;

/// Minimum continuous-sight duration before an unknown code is reported.
///
/// Codes glimpsed for a single frame are often misreads, so the error toast
/// waits until the same unknown value has been seen for this long.
pub const DEFAULT_UNKNOWN_PERSISTENCE_MS: i64 = 1500;

/// Trailing window used for the scan-rate (fps) metric.
pub const DEFAULT_FPS_WINDOW_MS: i64 = 1000;

/// Time a toast stays on screen without interaction.
pub const DEFAULT_TOAST_DISMISS_MS: u64 = 2500;

/// Longest raw value we accept.
///
/// QR codes top out at 4296 alphanumeric characters.
pub const MAX_CODE_LENGTH: usize = 4296;

/// Cart badge shows `99+` past this count.
pub const CART_BADGE_MAX: usize = 99;
