//! # Toast Controller
//!
//! Owns the single toast overlay and its auto-dismiss timer.
//!
//! ## Timer Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  show(A) ──► gen=1, timer#1 ─────────── 2500ms ──► clear A, Dismissed   │
//! │                                                                         │
//! │  show(A) ──► gen=1, timer#1 ──┐                                         │
//! │  show(B) ──► abort #1, gen=2, timer#2 ─── 2500ms ──► clear B            │
//! │                                                                         │
//! │  show(A) ──► gen=1, timer#1 ──┐                                         │
//! │  touch() ──► abort #1, gen=2, timer#2 ─── 2500ms ──► clear A            │
//! │                                                                         │
//! │  A timer only clears the toast if its generation is still current.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requires a tokio runtime: timers are spawned tasks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use scancart_core::ToastData;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::events::{EventSender, SessionEvent};

#[derive(Debug, Default)]
struct ToastSlot {
    current: Option<ToastData>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl ToastSlot {
    /// Cancels the live timer and invalidates any timer already firing.
    fn cancel_timer(&mut self) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

/// The transient notification overlay.
#[derive(Debug, Clone)]
pub struct ToastController {
    slot: Arc<Mutex<ToastSlot>>,
    events: EventSender,
    dismiss_after: Duration,
}

impl ToastController {
    /// Creates a controller publishing on `events`.
    pub fn new(events: EventSender, dismiss_after: Duration) -> Self {
        ToastController {
            slot: Arc::new(Mutex::new(ToastSlot::default())),
            events,
            dismiss_after,
        }
    }

    /// Replaces the current toast and restarts the dismiss timer.
    pub fn show(&self, toast: ToastData) {
        let mut slot = self.lock();
        let generation = slot.cancel_timer();

        debug!(code = toast.code(), kind = ?toast.kind(), "Toast shown");
        slot.current = Some(toast.clone());
        slot.timer = Some(self.arm(generation));
        drop(slot);

        emit(&self.events, SessionEvent::ToastShown { toast });
    }

    /// User interacted with the toast; restart its timer.
    ///
    /// Returns false if no toast is showing.
    pub fn touch(&self) -> bool {
        let mut slot = self.lock();
        if slot.current.is_none() {
            return false;
        }

        let generation = slot.cancel_timer();
        slot.timer = Some(self.arm(generation));
        trace!(generation, "Toast timer rearmed");
        true
    }

    /// Hides the toast now. Returns the toast that was showing.
    pub fn dismiss(&self) -> Option<ToastData> {
        let mut slot = self.lock();
        slot.cancel_timer();
        let toast = slot.current.take();
        drop(slot);

        if let Some(toast) = &toast {
            debug!(code = toast.code(), "Toast dismissed");
            emit(
                &self.events,
                SessionEvent::ToastDismissed {
                    code: toast.code().to_string(),
                },
            );
        }
        toast
    }

    /// The toast currently showing.
    pub fn current(&self) -> Option<ToastData> {
        self.lock().current.clone()
    }

    fn arm(&self, generation: u64) -> JoinHandle<()> {
        let slot = Arc::clone(&self.slot);
        let events = self.events.clone();
        let delay = self.dismiss_after;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation != generation {
                return;
            }
            slot.timer = None;
            let expired = slot.current.take();
            drop(slot);

            if let Some(toast) = expired {
                debug!(code = toast.code(), "Toast expired");
                emit(
                    &events,
                    SessionEvent::ToastDismissed {
                        code: toast.code().to_string(),
                    },
                );
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, ToastSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn emit(events: &EventSender, event: SessionEvent) {
    if events.send(event).is_err() {
        trace!("Session event dropped: receiver closed");
    }
}
