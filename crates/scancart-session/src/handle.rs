//! # Session Handle
//!
//! Shared, clock-reading front of a [`ScanSession`].
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because the host command loop
//! and the toast timer task both run on the tokio runtime. The lock is only
//! held for synchronous state transitions, never across an `.await`.
//!
//! ## Time Base
//! `at_ms` arguments are milliseconds since the Unix epoch, and omitted
//! values fall back to the wall clock. A host stamping frames with its own
//! clock passes that clock to every timed call, starting with
//! [`SessionHandle::start`], so debounce and metrics never mix bases.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Host Action          Handle Method          Events                     │
//! │  ───────────          ─────────────          ──────                     │
//! │                                                                         │
//! │  Camera frame ───────► handle_frame() ─────► FrameScanned, Vibrate,     │
//! │                                              ToastShown, CartUpdated,   │
//! │                                              MetricsUpdated             │
//! │                                                                         │
//! │  Camera active ──────► start() ────────────► MetricsUpdated             │
//! │                                                                         │
//! │  "Add anyway" ───────► add_unknown() ──────► ToastShown, CartUpdated    │
//! │                                                                         │
//! │  Toast +/- ──────────► toast_increment() ──► CartUpdated (timer rearm)  │
//! │                                                                         │
//! │  Cart screen ────────► set_quantity() ─────► CartUpdated                │
//! │                        remove() / clear()                               │
//! │                                                                         │
//! │  Debug overlay ──────► reset_metrics() ────► MetricsUpdated             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use scancart_core::{
    Barcode, CartItem, CartStore, CartSummary, CoreResult, DetectionMetrics, ProductIndex,
    TimestampMs, ToastData,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::config::ScannerConfig;
use crate::error::{SessionError, SessionResult};
use crate::events::{EventReceiver, EventSender, SessionEvent};
use crate::session::{FrameReport, ScanSession};
use crate::toast::{emit, ToastController};

/// Cart contents with display totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
}

impl From<&ScanSession> for CartSnapshot {
    fn from(session: &ScanSession) -> Self {
        CartSnapshot {
            items: session.cart().items().to_vec(),
            summary: session.cart_summary(),
        }
    }
}

/// Cloneable handle to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session: Arc<Mutex<ScanSession>>,
    toasts: ToastController,
    events: EventSender,
}

impl SessionHandle {
    /// Starts a session and returns it with its event stream.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(index: ProductIndex, config: &ScannerConfig) -> (Self, EventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();

        let mut session = ScanSession::from_config(index, config);
        session.start(now_ms());

        let handle = SessionHandle {
            session: Arc::new(Mutex::new(session)),
            toasts: ToastController::new(events.clone(), config.toast.dismiss_after()),
            events,
        };
        (handle, receiver)
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ScanSession) -> R,
    {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut ScanSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    pub fn id(&self) -> Uuid {
        self.with_session(|s| s.id())
    }

    /// Re-anchors first-detection timing when the camera becomes active.
    pub fn start(&self, at_ms: Option<TimestampMs>) -> DetectionMetrics {
        let now = at_ms.unwrap_or_else(now_ms);
        let metrics = self.with_session_mut(|s| {
            s.start(now);
            s.metrics().clone()
        });
        self.publish_metrics(&metrics);
        metrics
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Processes a camera frame. `at_ms` defaults to the wall clock.
    pub fn handle_frame(
        &self,
        barcodes: &[Barcode],
        at_ms: Option<TimestampMs>,
    ) -> SessionResult<Option<FrameReport>> {
        let now = at_ms.unwrap_or_else(now_ms);
        let Some(report) = self.with_session_mut(|s| s.handle_frame(barcodes, now))? else {
            return Ok(None);
        };

        emit(
            &self.events,
            SessionEvent::FrameScanned {
                code: report.code.clone(),
                decision: report.decision,
                at_ms: now,
            },
        );
        self.publish(&report);
        Ok(Some(report))
    }

    /// "Add anyway" from the error toast.
    pub fn add_unknown(&self, code: &str, at_ms: Option<TimestampMs>) -> SessionResult<FrameReport> {
        let now = at_ms.unwrap_or_else(now_ms);
        let report = self.with_session_mut(|s| s.add_unknown(code, now))?;
        self.publish(&report);
        Ok(report)
    }

    /// Clears metrics, debounce and unknown tracking.
    pub fn reset_metrics(&self, at_ms: Option<TimestampMs>) -> DetectionMetrics {
        let now = at_ms.unwrap_or_else(now_ms);
        let metrics = self.with_session_mut(|s| {
            s.reset_metrics(now);
            s.metrics().clone()
        });
        self.publish_metrics(&metrics);
        metrics
    }

    /// Barcodes of the last non-empty frame, for the scanned-codes overlay.
    pub fn last_frame(&self) -> Vec<Barcode> {
        self.with_session(|s| s.last_frame().to_vec())
    }

    // =========================================================================
    // Toast
    // =========================================================================

    /// Toast "+" button. Returns the toast's code and its new quantity.
    pub fn toast_increment(&self) -> SessionResult<(String, u32)> {
        let code = self.quantity_toast_code()?;
        let quantity = self.with_session_mut(|s| s.increment(&code))?;
        self.toasts.touch();
        self.publish_cart();
        Ok((code, quantity))
    }

    /// Toast "-" button; stops at 1.
    ///
    /// At quantity 1 nothing changes: the timer keeps running and no
    /// cart event is published.
    pub fn toast_decrement(&self) -> SessionResult<(String, u32)> {
        let code = self.quantity_toast_code()?;
        let (quantity, changed) = self.decrement_tracked(&code)?;
        if changed {
            self.toasts.touch();
            self.publish_cart();
        }
        Ok((code, quantity))
    }

    pub fn dismiss_toast(&self) -> Option<ToastData> {
        self.toasts.dismiss()
    }

    pub fn current_toast(&self) -> Option<ToastData> {
        self.toasts.current()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn set_quantity(&self, code: &str, quantity: i64) -> SessionResult<u32> {
        let quantity = self.with_session_mut(|s| s.set_quantity(code, quantity))?;
        self.publish_cart();
        Ok(quantity)
    }

    pub fn increment(&self, code: &str) -> SessionResult<u32> {
        let quantity = self.with_session_mut(|s| s.increment(code))?;
        self.publish_cart();
        Ok(quantity)
    }

    pub fn decrement(&self, code: &str) -> SessionResult<u32> {
        let (quantity, changed) = self.decrement_tracked(code)?;
        if changed {
            self.publish_cart();
        }
        Ok(quantity)
    }

    pub fn remove(&self, code: &str) -> SessionResult<CartItem> {
        let item = self.with_session_mut(|s| s.remove(code))?;
        self.publish_cart();
        Ok(item)
    }

    pub fn clear(&self) {
        self.with_session_mut(|s| s.clear());
        self.publish_cart();
    }

    pub fn cart(&self) -> CartSnapshot {
        self.with_session(|s| CartSnapshot::from(s))
    }

    pub fn metrics(&self) -> DetectionMetrics {
        self.with_session(|s| s.metrics().clone())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn decrement_tracked(&self, code: &str) -> SessionResult<(u32, bool)> {
        let result = self.with_session_mut(|s| -> CoreResult<(u32, bool)> {
            let before = s.cart().get(code).map(|item| item.quantity);
            let after = s.decrement(code)?;
            Ok((after, before != Some(after)))
        })?;
        Ok(result)
    }

    fn quantity_toast_code(&self) -> SessionResult<String> {
        self.toasts
            .current()
            .filter(ToastData::has_quantity_controls)
            .map(|toast| toast.code().to_string())
            .ok_or(SessionError::NoActiveToast)
    }

    fn publish(&self, report: &FrameReport) {
        if let Some(pattern) = report.vibration {
            emit(&self.events, SessionEvent::vibrate(pattern));
        }
        if let Some(toast) = &report.toast {
            self.toasts.show(toast.clone());
        }
        if report.cart_changed {
            self.publish_cart();
        }
        self.publish_metrics(&report.metrics);
    }

    fn publish_metrics(&self, metrics: &DetectionMetrics) {
        emit(
            &self.events,
            SessionEvent::MetricsUpdated {
                metrics: metrics.clone(),
            },
        );
    }

    fn publish_cart(&self) {
        let snapshot = self.cart();
        debug!(items = snapshot.summary.item_count, "Cart updated");
        emit(
            &self.events,
            SessionEvent::CartUpdated {
                items: snapshot.items,
                summary: snapshot.summary,
            },
        );
    }
}

/// Wall clock in ms since epoch.
fn now_ms() -> TimestampMs {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancart_core::{ScanDecision, VibrationPattern};
    use std::time::Duration;

    fn handle() -> (SessionHandle, EventReceiver) {
        let index = ProductIndex::from_json_str(
            r#"{"123": {"name": "Widget", "ref1": "A", "ref2": "B"}}"#,
        )
        .unwrap();
        SessionHandle::new(index, &ScannerConfig::default())
    }

    fn drain(rx: &mut EventReceiver) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn frame(code: &str) -> Vec<Barcode> {
        vec![Barcode::from_value(code)]
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_item_emits_events() {
        let (handle, mut rx) = handle();

        let report = handle.handle_frame(&frame("123"), Some(0)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::AddedNew);

        let events = drain(&mut rx);
        assert!(matches!(events[0], SessionEvent::FrameScanned { .. }));
        assert!(events.contains(&SessionEvent::vibrate(VibrationPattern::Medium)));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::ToastShown { toast: ToastData::Success { .. } })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::CartUpdated { items, .. } if items.len() == 1)));
        assert!(matches!(events.last(), Some(SessionEvent::MetricsUpdated { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_frame_only_updates_metrics() {
        let (handle, mut rx) = handle();
        handle.handle_frame(&frame("123"), Some(0)).unwrap();
        drain(&mut rx);

        handle.handle_frame(&frame("123"), Some(500)).unwrap();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SessionEvent::MetricsUpdated { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_quantity_controls() {
        let (handle, _rx) = handle();
        assert!(matches!(
            handle.toast_increment(),
            Err(SessionError::NoActiveToast)
        ));

        handle.handle_frame(&frame("123"), Some(0)).unwrap();
        assert_eq!(handle.toast_increment().unwrap(), ("123".to_string(), 2));
        assert_eq!(handle.toast_decrement().unwrap(), ("123".to_string(), 1));

        // Interaction rearmed the timer; it expires 2500ms later
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(handle.current_toast().is_none());
        assert!(matches!(
            handle.toast_increment(),
            Err(SessionError::NoActiveToast)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_decrement_at_one_changes_nothing() {
        let (handle, mut rx) = handle();
        handle.handle_frame(&frame("123"), Some(0)).unwrap();
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(handle.toast_decrement().unwrap(), ("123".to_string(), 1));
        assert!(drain(&mut rx).is_empty());

        // Timer was not rearmed: the toast still expires at 2500
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(handle.current_toast().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cart_decrement_at_one_publishes_nothing() {
        let (handle, mut rx) = handle();
        handle.handle_frame(&frame("123"), Some(0)).unwrap();
        drain(&mut rx);

        assert_eq!(handle.decrement("123").unwrap(), 1);
        assert!(drain(&mut rx).is_empty());

        handle.increment("123").unwrap();
        assert_eq!(handle.decrement("123").unwrap(), 1);
        assert_eq!(
            drain(&mut rx)
                .iter()
                .filter(|e| matches!(e, SessionEvent::CartUpdated { .. }))
                .count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_clock_shared_by_all_timed_calls() {
        let (handle, _rx) = handle();
        handle.start(Some(0));

        handle.handle_frame(&frame("999"), Some(0)).unwrap();
        let report = handle.handle_frame(&frame("999"), Some(1500)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::UnknownConfirmed);
        assert_eq!(report.metrics.first_detection_time, Some(0));

        let report = handle.add_unknown("999", Some(1600)).unwrap();
        assert_eq!(report.decision, ScanDecision::PlaceholderAdded);

        let report = handle.handle_frame(&frame("999"), Some(2000)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::Debounced);

        let report = handle.handle_frame(&frame("999"), Some(60_000)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::Duplicate);

        let metrics = handle.reset_metrics(Some(70_000));
        assert_eq!(metrics.scan_count, 0);
        let report = handle.handle_frame(&frame("123"), Some(70_250)).unwrap().unwrap();
        assert_eq!(report.metrics.first_detection_time, Some(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extreme_host_timestamps() {
        let (handle, _rx) = handle();

        let report = handle.handle_frame(&frame("123"), Some(i64::MIN)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::AddedNew);

        let report = handle.handle_frame(&frame("123"), Some(i64::MAX)).unwrap().unwrap();
        assert_eq!(report.decision, ScanDecision::Duplicate);
        assert_eq!(report.metrics.scan_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_frame() {
        let (handle, _rx) = handle();
        assert!(handle.last_frame().is_empty());

        let barcodes = vec![Barcode::from_value("123"), Barcode::from_value("999")];
        handle.handle_frame(&barcodes, Some(0)).unwrap();
        assert_eq!(handle.last_frame(), barcodes);

        handle.reset_metrics(Some(10));
        assert!(handle.last_frame().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_toast_has_no_quantity_controls() {
        let (handle, _rx) = handle();
        handle.handle_frame(&frame("999"), Some(0)).unwrap();
        handle.handle_frame(&frame("999"), Some(1500)).unwrap();
        assert!(matches!(handle.current_toast(), Some(ToastData::Error { .. })));
        assert!(matches!(
            handle.toast_increment(),
            Err(SessionError::NoActiveToast)
        ));

        let report = handle.add_unknown("999", Some(1600)).unwrap();
        assert_eq!(report.decision, ScanDecision::PlaceholderAdded);
        assert!(matches!(handle.current_toast(), Some(ToastData::Success { .. })));
        assert_eq!(handle.cart().summary.item_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cart_commands_publish() {
        let (handle, mut rx) = handle();
        handle.handle_frame(&frame("123"), Some(0)).unwrap();
        drain(&mut rx);

        assert_eq!(handle.set_quantity("123", 5).unwrap(), 5);
        assert_eq!(handle.cart().summary.total_units, 5);
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [SessionEvent::CartUpdated { .. }]
        ));

        assert!(handle.remove("nope").is_err());
        handle.clear();
        assert!(handle.cart().items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_metrics() {
        let (handle, _rx) = handle();
        handle.handle_frame(&frame("123"), None).unwrap();
        assert_eq!(handle.metrics().scan_count, 1);

        let metrics = handle.reset_metrics(None);
        assert_eq!(metrics.scan_count, 0);
        assert!(metrics.first_detection_time.is_none());
    }
}
