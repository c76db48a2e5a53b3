//! # Session Events
//!
//! Everything the host UI needs to react to, published on the session's
//! event channel.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  frame ──► SessionHandle ──► FrameScanned                               │
//! │                 │       ├──► Vibrate        (haptics)                   │
//! │                 │       ├──► ToastShown     (overlay)                   │
//! │                 │       ├──► CartUpdated    (badge, cart screen)        │
//! │                 │       └──► MetricsUpdated (debug overlay)             │
//! │                 │                                                       │
//! │  dismiss timer ─┴──────────► ToastDismissed                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use scancart_core::{
    CartItem, CartSummary, DetectionMetrics, ScanDecision, ToastData, VibrationPattern,
};
use serde::{Deserialize, Serialize};

/// Sender half of the session event channel.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<SessionEvent>;

/// Receiver half of the session event channel.
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<SessionEvent>;

/// Event published by a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    /// A frame was processed.
    #[serde(rename_all = "camelCase")]
    FrameScanned {
        code: String,
        decision: ScanDecision,
        at_ms: i64,
    },

    /// The toast overlay changed.
    ToastShown { toast: ToastData },

    /// The toast for `code` went away (timer or explicit dismiss).
    ToastDismissed { code: String },

    /// Haptic request.
    Vibrate {
        pattern: VibrationPattern,
        durations: Vec<u64>,
    },

    /// Cart contents changed.
    CartUpdated {
        items: Vec<CartItem>,
        summary: CartSummary,
    },

    /// Detection metrics changed.
    MetricsUpdated { metrics: DetectionMetrics },
}

impl SessionEvent {
    /// Builds a vibration event with the host duration pattern.
    pub fn vibrate(pattern: VibrationPattern) -> Self {
        SessionEvent::Vibrate {
            pattern,
            durations: pattern.durations_ms().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let json = serde_json::to_value(SessionEvent::vibrate(VibrationPattern::DoublePulse)).unwrap();
        assert_eq!(json["event"], "vibrate");
        assert_eq!(json["pattern"], "double_pulse");
        assert_eq!(json["durations"], serde_json::json!([0, 50, 50, 50]));

        let json = serde_json::to_value(SessionEvent::FrameScanned {
            code: "123".into(),
            decision: ScanDecision::AddedNew,
            at_ms: 5,
        })
        .unwrap();
        assert_eq!(json["event"], "frameScanned");
        assert_eq!(json["atMs"], 5);
        assert_eq!(json["decision"], "added_new");
    }
}
