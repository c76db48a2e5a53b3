//! # Scan Event Classifier
//!
//! Decides what a decoded barcode means for the cart and the toast overlay.
//!
//! The camera host delivers the same barcode many times per second while it
//! stays in frame. The classifier turns that stream into a few meaningful
//! events: one "added", an occasional "already in cart", and one "unknown"
//! per continuously-visible unknown code.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     classify(code, now)                                 │
//! │                                                                         │
//! │  In product index? ──yes──► reset unknown tracker                       │
//! │        │                         │                                      │
//! │        no                        ▼                                      │
//! │        │                 same code < debounce? ──yes──► Debounced       │
//! │        ▼                         │ no                                   │
//! │  In cart? ──yes──► reset         ▼                                      │
//! │        │          tracker ──► in cart? ──yes──► Duplicate toast         │
//! │        no            │           │ no                                   │
//! │        │             ▼           ▼                                      │
//! │        │        (debounce,   AddedNew: push item + Success toast        │
//! │        │         Duplicate)                                             │
//! │        ▼                                                                │
//! │  Already reported? ──yes──► UnknownSuppressed                           │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │  Same code tracked for ≥ persistence? ──yes──► UnknownConfirmed         │
//! │        │ no                                     (Error toast, once)     │
//! │        ▼                                                                │
//! │  TrackingUnknown (new code replaces the tracker)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Effects
//! The classifier never touches the cart or the UI. Each call returns a
//! [`Classification`] listing the [`Effect`]s the caller applies: cart
//! insertions, toasts and vibrations.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::cart::CartStore;
use crate::index::ProductIndex;
use crate::types::{CartItem, Product, TimestampMs, ToastData, UnknownCodeTracker, VibrationPattern};
use crate::{DEFAULT_DEBOUNCE_MS, DEFAULT_UNKNOWN_PERSISTENCE_MS};

// =============================================================================
// Settings
// =============================================================================

/// Timing windows used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Same-code re-trigger window (ms).
    pub debounce_ms: i64,

    /// Continuous-sight time before an unknown code is reported (ms).
    pub unknown_persistence_ms: i64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            unknown_persistence_ms: DEFAULT_UNKNOWN_PERSISTENCE_MS,
        }
    }
}

// =============================================================================
// Decisions and Effects
// =============================================================================

/// What the classifier decided for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScanDecision {
    /// Same code inside the debounce window; nothing happens.
    Debounced,
    /// New code appended to the cart.
    AddedNew,
    /// Code already in the cart; toast only.
    Duplicate,
    /// Unknown code seen, not yet persistent.
    TrackingUnknown,
    /// Unknown code persisted; error toast.
    UnknownConfirmed,
    /// Unknown code already reported while continuously in frame.
    UnknownSuppressed,
    /// User chose "add anyway" for an unknown code.
    PlaceholderAdded,
}

/// A side-effect request for the caller to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Append this item to the cart.
    AddToCart { item: CartItem },
    /// Show (replace) the toast overlay.
    ShowToast { toast: ToastData },
    /// Trigger haptic feedback.
    Vibrate { pattern: VibrationPattern },
}

/// Result of one classifier step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub decision: ScanDecision,
    pub effects: Vec<Effect>,
}

impl Classification {
    fn silent(decision: ScanDecision) -> Self {
        Classification {
            decision,
            effects: Vec::new(),
        }
    }

    /// The toast requested, if any.
    pub fn toast(&self) -> Option<&ToastData> {
        self.effects.iter().find_map(|e| match e {
            Effect::ShowToast { toast } => Some(toast),
            _ => None,
        })
    }

    /// The vibration requested, if any.
    pub fn vibration(&self) -> Option<VibrationPattern> {
        self.effects.iter().find_map(|e| match e {
            Effect::Vibrate { pattern } => Some(*pattern),
            _ => None,
        })
    }

    /// The cart item to insert, if any.
    pub fn cart_item(&self) -> Option<&CartItem> {
        self.effects.iter().find_map(|e| match e {
            Effect::AddToCart { item } => Some(item),
            _ => None,
        })
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Snapshot of the classifier's bookkeeping, for the debug overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierSnapshot {
    pub last_code: Option<String>,
    pub last_handled_at: Option<TimestampMs>,
    pub unknown_tracker: Option<UnknownCodeTracker>,
    pub reported_unknown: Option<String>,
}

/// Debounce and unknown-code state machine.
#[derive(Debug, Clone)]
pub struct ScanClassifier {
    settings: ClassifierSettings,

    /// Last code that produced a toast, and when.
    last_handled: Option<(String, TimestampMs)>,

    /// Unknown code currently waiting to persist.
    tracker: Option<UnknownCodeTracker>,

    /// Unknown code whose error was already shown; silent until the code changes.
    reported_unknown: Option<String>,
}

impl ScanClassifier {
    /// Creates a classifier with empty bookkeeping.
    pub fn new(settings: ClassifierSettings) -> Self {
        ScanClassifier {
            settings,
            last_handled: None,
            tracker: None,
            reported_unknown: None,
        }
    }

    /// Active timing windows.
    pub fn settings(&self) -> ClassifierSettings {
        self.settings
    }

    /// Classifies one decoded code.
    ///
    /// `cart` is only read; apply the returned effects to mutate it.
    pub fn classify<C: CartStore + ?Sized>(
        &mut self,
        code: &str,
        now: TimestampMs,
        index: &ProductIndex,
        cart: &C,
    ) -> Classification {
        let classification = if let Some(product) = index.get(code) {
            self.clear_unknown();
            self.classify_known(code, product, now, cart)
        } else if let Some(existing) = cart.get(code) {
            // Unknown to the index but added manually earlier.
            self.clear_unknown();
            let product = existing.product.clone();
            self.classify_in_cart(code, product, now)
        } else {
            self.classify_unknown(code, now)
        };

        debug!(code, now, decision = ?classification.decision, "Scan classified");
        classification
    }

    /// The "add anyway" action from an error toast.
    ///
    /// Inserts a placeholder product unless the code is already in the cart,
    /// in which case the uniqueness rule wins and a duplicate toast is shown.
    pub fn add_unknown<C: CartStore + ?Sized>(
        &mut self,
        code: &str,
        now: TimestampMs,
        cart: &C,
    ) -> Classification {
        self.clear_unknown();
        self.last_handled = Some((code.to_string(), now));

        if let Some(existing) = cart.get(code) {
            debug!(code, "Add-unknown for a code already in cart");
            return Self::duplicate(code, existing.product.clone());
        }

        let product = Product::placeholder(code);
        let item = CartItem::new(code, product.clone(), now);

        debug!(code, "Placeholder product added");
        Classification {
            decision: ScanDecision::PlaceholderAdded,
            effects: vec![
                Effect::AddToCart { item },
                Effect::ShowToast {
                    toast: ToastData::Success {
                        code: code.to_string(),
                        product,
                    },
                },
            ],
        }
    }

    /// Forgets debounce and unknown-code state.
    pub fn reset(&mut self) {
        self.last_handled = None;
        self.clear_unknown();
    }

    /// Current bookkeeping.
    pub fn snapshot(&self) -> ClassifierSnapshot {
        ClassifierSnapshot {
            last_code: self.last_handled.as_ref().map(|(c, _)| c.clone()),
            last_handled_at: self.last_handled.as_ref().map(|(_, t)| *t),
            unknown_tracker: self.tracker.clone(),
            reported_unknown: self.reported_unknown.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Branches
    // -------------------------------------------------------------------------

    fn classify_known<C: CartStore + ?Sized>(
        &mut self,
        code: &str,
        product: &Product,
        now: TimestampMs,
        cart: &C,
    ) -> Classification {
        if cart.contains(code) {
            return self.classify_in_cart(code, product.clone(), now);
        }

        if self.is_debounced(code, now) {
            return Classification::silent(ScanDecision::Debounced);
        }

        self.last_handled = Some((code.to_string(), now));

        Classification {
            decision: ScanDecision::AddedNew,
            effects: vec![
                Effect::Vibrate {
                    pattern: VibrationPattern::Medium,
                },
                Effect::AddToCart {
                    item: CartItem::new(code, product.clone(), now),
                },
                Effect::ShowToast {
                    toast: ToastData::Success {
                        code: code.to_string(),
                        product: product.clone(),
                    },
                },
            ],
        }
    }

    fn classify_in_cart(&mut self, code: &str, product: Product, now: TimestampMs) -> Classification {
        if self.is_debounced(code, now) {
            return Classification::silent(ScanDecision::Debounced);
        }

        self.last_handled = Some((code.to_string(), now));
        Self::duplicate(code, product)
    }

    fn classify_unknown(&mut self, code: &str, now: TimestampMs) -> Classification {
        if self.reported_unknown.as_deref() == Some(code) {
            return Classification::silent(ScanDecision::UnknownSuppressed);
        }

        let persisted = self
            .tracker
            .as_ref()
            .filter(|tracker| tracker.code == code)
            .map(|tracker| tracker.seen_for(now) >= self.settings.unknown_persistence_ms);

        match persisted {
            Some(true) => {
                self.tracker = None;
                self.reported_unknown = Some(code.to_string());

                Classification {
                    decision: ScanDecision::UnknownConfirmed,
                    effects: vec![
                        Effect::Vibrate {
                            pattern: VibrationPattern::DoublePulse,
                        },
                        Effect::ShowToast {
                            toast: ToastData::Error {
                                code: code.to_string(),
                            },
                        },
                    ],
                }
            }
            Some(false) => Classification::silent(ScanDecision::TrackingUnknown),
            None => {
                self.reported_unknown = None;
                self.tracker = Some(UnknownCodeTracker {
                    code: code.to_string(),
                    first_seen: now,
                });
                Classification::silent(ScanDecision::TrackingUnknown)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn duplicate(code: &str, product: Product) -> Classification {
        Classification {
            decision: ScanDecision::Duplicate,
            effects: vec![
                Effect::Vibrate {
                    pattern: VibrationPattern::Short,
                },
                Effect::ShowToast {
                    toast: ToastData::Duplicate {
                        code: code.to_string(),
                        product,
                    },
                },
            ],
        }
    }

    fn is_debounced(&self, code: &str, now: TimestampMs) -> bool {
        match &self.last_handled {
            Some((last, at)) => last == code && now.saturating_sub(*at) < self.settings.debounce_ms,
            None => false,
        }
    }

    fn clear_unknown(&mut self) {
        self.tracker = None;
        self.reported_unknown = None;
    }
}

impl Default for ScanClassifier {
    fn default() -> Self {
        Self::new(ClassifierSettings::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
