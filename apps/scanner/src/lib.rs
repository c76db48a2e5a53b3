//! # ScanCart Scanner Library
//!
//! Headless host bridge: the camera host writes decoded frames and UI
//! actions to stdin, and reads responses and session events from stdout.
//!
//! ## Module Organization
//! ```text
//! scancart_scanner_lib/
//! ├── lib.rs          ◄─── You are here (startup & I/O loop)
//! ├── commands.rs     ◄─── Host command parsing and dispatch
//! └── error.rs        ◄─── API error type for command failures
//! ```
//!
//! ## I/O Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  stdin  ──► JSON line ──► HostCommand ──► SessionHandle                │
//! │                                               │                         │
//! │  stdout ◄── {"response":..} / {"error":..} ◄──┤                         │
//! │  stdout ◄── {"event":..} ◄──── mpsc<SessionEvent> (incl. toast timer)  │
//! │                                                                         │
//! │  stderr ◄── tracing logs                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;

use std::path::PathBuf;

use scancart_session::{resolve_index, EventReceiver, ScannerConfig, SessionError, SessionHandle};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{process_line, OutputLine};

/// Product index compiled into the binary, used when no file is configured.
pub const BUNDLED_INDEX: &str = include_str!("../assets/product_index.json");

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,scancart=debug";

/// Boxed error for startup and I/O failures.
pub type RunResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Runs the scanner bridge on stdin/stdout until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ─────► stderr, RUST_LOG or info,scancart=debug   │
/// │  2. Load Config ────────────► SCANCART_CONFIG or platform config dir   │
/// │  3. Load Product Index ─────► [catalog] path or bundled JSON           │
/// │  4. Start Session ──────────► SessionHandle + event channel            │
/// │  5. Serve ──────────────────► stdin lines ⇄ stdout lines               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> RunResult<()> {
    init_tracing();

    info!("Starting ScanCart scanner bridge");

    let config_path = std::env::var("SCANCART_CONFIG").ok().map(PathBuf::from);
    let config = ScannerConfig::load_or_default(config_path);
    let index = resolve_index(&config.catalog, BUNDLED_INDEX)?;

    let (handle, events) = SessionHandle::new(index, &config);
    info!(session_id = %handle.id(), "Session ready");

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(&handle, events, stdin, stdout).await?;

    info!(session_id = %handle.id(), "Input closed, shutting down");
    Ok(())
}

/// Pumps commands from `input` and events from `events` into `output`.
///
/// Events raised while a command runs are written right after its response.
/// Returns when `input` reaches EOF.
pub async fn serve<R, W>(
    handle: &SessionHandle,
    mut events: EventReceiver,
    input: R,
    mut output: W,
) -> RunResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let out = process_line(handle, &line);
                write_line(&mut output, &out).await?;
                while let Ok(event) = events.try_recv() {
                    write_line(&mut output, &OutputLine::Event(event)).await?;
                }
            }
            event = events.recv() => {
                let event = event.ok_or(SessionError::ChannelClosed)?;
                write_line(&mut output, &OutputLine::Event(event)).await?;
            }
        }
    }

    output.flush().await?;
    Ok(())
}

async fn write_line<W>(output: &mut W, line: &OutputLine) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut bytes = serde_json::to_vec(line)?;
    bytes.push(b'\n');
    output.write_all(&bytes).await?;
    output.flush().await
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=scancart_core=trace` - Trace the classifier only
/// - Default: INFO, DEBUG for scancart crates
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing::subscriber::set_global_default(log_subscriber(filter));
}

/// The filter alone decides which levels are emitted.
fn log_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    // stdout is the data channel
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scancart_core::ProductIndex;
    use serde_json::Value;

    fn parse_output(bytes: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(bytes)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_bundled_index_is_valid() {
        let index = ProductIndex::from_json_str(BUNDLED_INDEX).unwrap();
        assert!(!index.is_empty());
    }

    #[test]
    fn test_log_filter_controls_levels() {
        use tracing::Level;

        let subscriber = log_subscriber(EnvFilter::new("info"));
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));
            assert!(!tracing::enabled!(Level::TRACE));
        });

        let subscriber = log_subscriber(EnvFilter::new(DEFAULT_LOG_FILTER));
        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(Level::TRACE));
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_round_trip() {
        let index = ProductIndex::from_json_str(BUNDLED_INDEX).unwrap();
        let (handle, events) = SessionHandle::new(index, &ScannerConfig::default());

        let input = concat!(
            r#"{"type":"frame","atMs":0,"barcodes":[{"rawValue":"5449000000996"}]}"#,
            "\n\n",
            r#"{"type":"frame","atMs":500,"barcodes":[{"rawValue":"5449000000996"}]}"#,
            "\n",
            "garbage\n",
            r#"{"type":"getCart"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(&handle, events, input.as_bytes(), &mut output).await.unwrap();

        let lines = parse_output(&output);
        let responses: Vec<&Value> = lines.iter().filter(|l| l.get("response").is_some()).collect();
        let errors: Vec<&Value> = lines.iter().filter(|l| l.get("error").is_some()).collect();
        let events: Vec<&Value> = lines.iter().filter(|l| l.get("event").is_some()).collect();

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["response"]["report"]["decision"], "added_new");
        assert_eq!(responses[1]["response"]["report"]["decision"], "debounced");
        assert_eq!(responses[2]["response"]["cart"]["summary"]["itemCount"], 1);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["error"]["code"], "INVALID_COMMAND");

        assert!(events
            .iter()
            .any(|e| e["event"]["event"] == "toastShown" && e["event"]["toast"]["type"] == "success"));
        assert!(events
            .iter()
            .any(|e| e["event"]["event"] == "vibrate" && e["event"]["pattern"] == "medium"));

        // Response precedes the events it caused
        assert!(lines[0].get("response").is_some());
    }
}
