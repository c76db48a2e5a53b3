//! # ScanCart Scanner Entry Point
//!
//! Headless bridge between a camera host and the scan session.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load configuration (`SCANCART_CONFIG` or platform config dir)
//! 3. Load the product index (configured file or bundled)
//! 4. Start the session and its event channel
//! 5. Serve JSON lines until stdin closes

#[tokio::main]
async fn main() {
    // The actual setup is in lib.rs for better testability
    if let Err(e) = scancart_scanner_lib::run().await {
        eprintln!("scancart-scanner: {}", e);
        std::process::exit(1);
    }
}
