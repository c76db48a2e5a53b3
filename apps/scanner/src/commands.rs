//! # Host Commands
//!
//! One JSON object per stdin line, tagged by `type`.
//!
//! ## Command Reference
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line                                              Response             │
//! │  ────                                              ────────             │
//! │  {"type":"start","atMs":0}                         metrics              │
//! │  {"type":"frame","atMs":0,"barcodes":[{..}]}       frame report / null  │
//! │  {"type":"addUnknown","code":"999","atMs":9}       frame report         │
//! │  {"type":"setQuantity","code":"123","quantity":3}  quantity             │
//! │  {"type":"increment","code":"123"}                 quantity             │
//! │  {"type":"decrement","code":"123"}                 quantity             │
//! │  {"type":"toastIncrement"}                         quantity             │
//! │  {"type":"toastDecrement"}                         quantity             │
//! │  {"type":"remove","code":"123"}                    removed item         │
//! │  {"type":"clear"}                                  cart                 │
//! │  {"type":"resetMetrics","atMs":0}                  metrics              │
//! │  {"type":"dismissToast"}                           dismissed toast      │
//! │  {"type":"getCart"}                                cart                 │
//! │  {"type":"getMetrics"}                             metrics              │
//! │  {"type":"getLastFrame"}                           last frame           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `atMs` is optional everywhere and is milliseconds since the Unix epoch.
//! A host that stamps frames with its own clock sends `start` first and
//! stamps every timed command with the same clock.
//!
//! Output lines are `{"response": ..}`, `{"event": ..}` or `{"error": ..}`.

use scancart_core::{Barcode, CartItem, DetectionMetrics, ToastData};
use scancart_session::{CartSnapshot, FrameReport, SessionEvent, SessionHandle};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// A command from the host UI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    /// Camera became active; anchors first-detection timing.
    #[serde(rename_all = "camelCase")]
    Start {
        #[serde(default)]
        at_ms: Option<i64>,
    },
    /// Decoded barcodes from one camera frame.
    #[serde(rename_all = "camelCase")]
    Frame {
        #[serde(default)]
        at_ms: Option<i64>,
        barcodes: Vec<Barcode>,
    },
    #[serde(rename_all = "camelCase")]
    AddUnknown {
        code: String,
        #[serde(default)]
        at_ms: Option<i64>,
    },
    SetQuantity {
        code: String,
        quantity: i64,
    },
    Increment {
        code: String,
    },
    Decrement {
        code: String,
    },
    ToastIncrement,
    ToastDecrement,
    Remove {
        code: String,
    },
    Clear,
    #[serde(rename_all = "camelCase")]
    ResetMetrics {
        #[serde(default)]
        at_ms: Option<i64>,
    },
    DismissToast,
    GetCart,
    GetMetrics,
    GetLastFrame,
}

/// Successful command result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostResponse {
    Frame { report: Option<FrameReport> },
    Quantity { code: String, quantity: u32 },
    Removed { item: CartItem },
    Cart { cart: CartSnapshot },
    Metrics { metrics: DetectionMetrics },
    ToastDismissed { toast: Option<ToastData> },
    LastFrame { barcodes: Vec<Barcode> },
}

/// One stdout line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputLine {
    Response(HostResponse),
    Event(SessionEvent),
    Error(ApiError),
}

/// Runs a command against the session.
pub fn dispatch(handle: &SessionHandle, command: HostCommand) -> Result<HostResponse, ApiError> {
    debug!(?command, "Host command");

    let response = match command {
        HostCommand::Start { at_ms } => HostResponse::Metrics {
            metrics: handle.start(at_ms),
        },
        HostCommand::Frame { at_ms, barcodes } => HostResponse::Frame {
            report: handle.handle_frame(&barcodes, at_ms)?,
        },
        HostCommand::AddUnknown { code, at_ms } => HostResponse::Frame {
            report: Some(handle.add_unknown(&code, at_ms)?),
        },
        HostCommand::SetQuantity { code, quantity } => {
            let quantity = handle.set_quantity(&code, quantity)?;
            HostResponse::Quantity { code, quantity }
        }
        HostCommand::Increment { code } => {
            let quantity = handle.increment(&code)?;
            HostResponse::Quantity { code, quantity }
        }
        HostCommand::Decrement { code } => {
            let quantity = handle.decrement(&code)?;
            HostResponse::Quantity { code, quantity }
        }
        HostCommand::ToastIncrement => {
            let (code, quantity) = handle.toast_increment()?;
            HostResponse::Quantity { code, quantity }
        }
        HostCommand::ToastDecrement => {
            let (code, quantity) = handle.toast_decrement()?;
            HostResponse::Quantity { code, quantity }
        }
        HostCommand::Remove { code } => HostResponse::Removed {
            item: handle.remove(&code)?,
        },
        HostCommand::Clear => {
            handle.clear();
            HostResponse::Cart {
                cart: handle.cart(),
            }
        }
        HostCommand::ResetMetrics { at_ms } => HostResponse::Metrics {
            metrics: handle.reset_metrics(at_ms),
        },
        HostCommand::DismissToast => HostResponse::ToastDismissed {
            toast: handle.dismiss_toast(),
        },
        HostCommand::GetCart => HostResponse::Cart {
            cart: handle.cart(),
        },
        HostCommand::GetMetrics => HostResponse::Metrics {
            metrics: handle.metrics(),
        },
        HostCommand::GetLastFrame => HostResponse::LastFrame {
            barcodes: handle.last_frame(),
        },
    };

    Ok(response)
}

/// Parses and runs one input line.
pub fn process_line(handle: &SessionHandle, line: &str) -> OutputLine {
    let result = serde_json::from_str::<HostCommand>(line)
        .map_err(ApiError::from)
        .and_then(|command| dispatch(handle, command));

    match result {
        Ok(response) => OutputLine::Response(response),
        Err(error) => {
            debug!(%error, "Host command failed");
            OutputLine::Error(error)
        }
    }
}
