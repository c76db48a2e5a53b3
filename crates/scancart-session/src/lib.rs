//! # scancart-session: Scan Session Runtime
//!
//! Everything around the pure classifier that needs a clock, a lock, a timer
//! or a file.
//!
//! ## Runtime Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SessionHandle                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │  Arc<Mutex<ScanSession>>     │   │  ToastController             │   │
//! │  │   • ProductIndex             │   │   • current toast            │   │
//! │  │   • Cart                     │   │   • one dismiss timer task   │   │
//! │  │   • ScanClassifier           │   │                              │   │
//! │  │   • MetricsRecorder          │   │                              │   │
//! │  └──────────────────────────────┘   └──────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │                 └──────────► mpsc<SessionEvent> ◄──┘                    │
//! │                                      │                                  │
//! └──────────────────────────────────────┼──────────────────────────────────┘
//!                                        ▼
//!                                     host UI
//! ```
//!
//! ## Modules
//! - [`config`] - TOML + environment configuration
//! - [`catalog`] - Product index loading
//! - [`session`] - Synchronous session state
//! - [`handle`] - Shared handle, clock and event publishing
//! - [`toast`] - Toast overlay and its dismiss timer
//! - [`events`] - Events published to the host
//! - [`error`] - Session error type

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod session;
pub mod toast;

pub use catalog::{load_index_file, resolve_index};
pub use config::{CatalogSettings, ScanSettings, ScannerConfig, ToastSettings};
pub use error::{SessionError, SessionResult};
pub use events::{EventReceiver, EventSender, SessionEvent};
pub use handle::{CartSnapshot, SessionHandle};
pub use session::{FrameReport, ScanSession};
pub use toast::ToastController;
