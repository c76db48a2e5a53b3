//! # Scan Session
//!
//! One camera session: product index, cart, classifier, metrics.
//!
//! `ScanSession` is synchronous and clock-free; callers pass `now`. The
//! [`SessionHandle`](crate::SessionHandle) adds the clock, locking, toasts
//! and events around it.
//!
//! ## Frame Processing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handle_frame(barcodes, now)                                            │
//! │                                                                         │
//! │  1. Empty frame? ──────────────────────────► None                       │
//! │  2. First barcode's raw value, validated ──► invalid: None              │
//! │  3. metrics.record(code, now)                                           │
//! │  4. classifier.classify(code, now, index, cart)                         │
//! │  5. Apply AddToCart effect                                              │
//! │  6. FrameReport { decision, toast, vibration, metrics }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use scancart_core::validation::validate_code;
use scancart_core::{
    Barcode, Cart, CartItem, CartStore, CartSummary, Classification, ClassifierSettings,
    CoreResult, DetectionMetrics, MetricsRecorder, ProductIndex, ScanClassifier, ScanDecision,
    TimestampMs, ToastData, VibrationPattern,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScannerConfig;

/// Outcome of one processed frame or "add anyway" action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub code: String,
    pub decision: ScanDecision,
    pub toast: Option<ToastData>,
    pub vibration: Option<VibrationPattern>,
    /// True if an item was inserted.
    pub cart_changed: bool,
    pub metrics: DetectionMetrics,
}

/// State of a single scanning session.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    index: ProductIndex,
    cart: Cart,
    classifier: ScanClassifier,
    metrics: MetricsRecorder,
    last_frame: Vec<Barcode>,
}

impl ScanSession {
    /// Creates a session. Call [`start`](Self::start) once the camera is live.
    pub fn new(index: ProductIndex, settings: ClassifierSettings, fps_window_ms: i64) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, products = index.len(), "Scan session created");

        ScanSession {
            id,
            index,
            cart: Cart::new(),
            classifier: ScanClassifier::new(settings),
            metrics: MetricsRecorder::new(fps_window_ms),
            last_frame: Vec::new(),
        }
    }

    /// Creates a session using the configured windows.
    pub fn from_config(index: ProductIndex, config: &ScannerConfig) -> Self {
        Self::new(index, config.scan.classifier(), config.scan.fps_window_ms)
    }

    /// Anchors first-detection timing.
    pub fn start(&mut self, now: TimestampMs) {
        debug!(session_id = %self.id, now, "Scan session started");
        self.metrics.start(now);
    }

    /// Processes one camera frame.
    ///
    /// Returns `None` for frames that carry no usable code.
    pub fn handle_frame(
        &mut self,
        barcodes: &[Barcode],
        now: TimestampMs,
    ) -> CoreResult<Option<FrameReport>> {
        let Some(first) = barcodes.first() else {
            return Ok(None);
        };
        self.last_frame = barcodes.to_vec();

        let code = first.raw_value.clone();
        if let Err(e) = validate_code(&code) {
            warn!(session_id = %self.id, error = %e, "Ignoring unusable barcode");
            return Ok(None);
        }

        self.metrics.record(&code, now);
        let outcome = self.classifier.classify(&code, now, &self.index, &self.cart);
        self.apply(code, outcome).map(Some)
    }

    /// The "add anyway" action for an unknown code.
    pub fn add_unknown(&mut self, code: &str, now: TimestampMs) -> CoreResult<FrameReport> {
        validate_code(code)?;
        let outcome = self.classifier.add_unknown(code, now, &self.cart);
        self.apply(code.to_string(), outcome)
    }

    /// Clears metrics and re-anchors timing; also forgets debounce, unknown
    /// tracking and the last frame.
    pub fn reset_metrics(&mut self, now: TimestampMs) {
        self.metrics.reset(now);
        self.classifier.reset();
        self.last_frame.clear();
    }

    // -------------------------------------------------------------------------
    // Cart commands
    // -------------------------------------------------------------------------

    pub fn set_quantity(&mut self, code: &str, quantity: i64) -> CoreResult<u32> {
        let quantity = self.cart.set_quantity(code, quantity)?;
        debug!(session_id = %self.id, code, quantity, "Quantity set");
        Ok(quantity)
    }

    pub fn increment(&mut self, code: &str) -> CoreResult<u32> {
        self.cart.increment(code)
    }

    pub fn decrement(&mut self, code: &str) -> CoreResult<u32> {
        self.cart.decrement(code)
    }

    pub fn remove(&mut self, code: &str) -> CoreResult<CartItem> {
        let item = self.cart.remove(code)?;
        debug!(session_id = %self.id, code, "Cart item removed");
        Ok(item)
    }

    pub fn clear(&mut self) {
        info!(session_id = %self.id, items = self.cart.item_count(), "Cart cleared");
        self.cart.clear();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_summary(&self) -> CartSummary {
        self.cart.summary()
    }

    pub fn metrics(&self) -> &DetectionMetrics {
        self.metrics.metrics()
    }

    pub fn classifier(&self) -> &ScanClassifier {
        &self.classifier
    }

    /// Barcodes from the last non-empty frame.
    pub fn last_frame(&self) -> &[Barcode] {
        &self.last_frame
    }

    fn apply(&mut self, code: String, outcome: Classification) -> CoreResult<FrameReport> {
        let mut cart_changed = false;
        if let Some(item) = outcome.cart_item() {
            self.cart.add(item.clone())?;
            cart_changed = true;
        }

        Ok(FrameReport {
            code,
            decision: outcome.decision,
            toast: outcome.toast().cloned(),
            vibration: outcome.vibration(),
            cart_changed,
            metrics: self.metrics.metrics().clone(),
        })
    }
}
