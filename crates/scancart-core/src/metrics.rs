//! # Detection Metrics Recorder
//!
//! Feeds the debug overlay with scanner timing numbers.
//!
//! ## What Is Measured
//! ```text
//!   anchor (camera active / reset)
//!     │
//!     │◄── first_detection_time ──►│
//!     ▼                            ▼
//!  ───┼────────────────────────────A──A──A──A──B──B──C───────► time
//!                                  │           │     │
//!                                  │◄─latency─►│◄───►│ latency
//!                                                    │
//!                             fps = scans in (now - window, now]
//! ```
//!
//! - `first_detection_time`: anchor to the first scan, recorded once
//! - `detection_latency`: time between the first frame of one distinct code
//!   and the first frame of the next distinct code
//! - `last_detection_time`: timestamp of the latest scan
//! - `scan_count`: every scan since the last reset
//! - `fps`: scans inside the trailing window

use tracing::info;

use crate::types::{DetectionMetrics, TimestampMs};
use crate::DEFAULT_FPS_WINDOW_MS;

/// Rolling detection metrics.
#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    window_ms: i64,
    anchor: Option<TimestampMs>,
    last_code: Option<String>,
    code_started_at: Option<TimestampMs>,
    scan_times: Vec<TimestampMs>,
    metrics: DetectionMetrics,
}

impl MetricsRecorder {
    /// Creates a recorder with no anchor; call [`start`](Self::start) when the
    /// camera becomes active.
    pub fn new(window_ms: i64) -> Self {
        MetricsRecorder {
            window_ms,
            anchor: None,
            last_code: None,
            code_started_at: None,
            scan_times: Vec::new(),
            metrics: DetectionMetrics::default(),
        }
    }

    /// Anchors the first-detection clock.
    pub fn start(&mut self, now: TimestampMs) {
        self.anchor = Some(now);
    }

    /// Records one scan event and returns the updated metrics.
    pub fn record(&mut self, code: &str, now: TimestampMs) -> &DetectionMetrics {
        if self.metrics.first_detection_time.is_none() {
            if let Some(anchor) = self.anchor {
                self.metrics.first_detection_time = Some(now.saturating_sub(anchor));
            }
        }

        if self.last_code.as_deref() != Some(code) {
            if let Some(started) = self.code_started_at {
                self.metrics.detection_latency = Some(now.saturating_sub(started));
            }
            self.code_started_at = Some(now);
            self.last_code = Some(code.to_string());
        }

        self.metrics.last_detection_time = Some(now);
        self.metrics.scan_count = self.metrics.scan_count.saturating_add(1);

        self.scan_times.push(now);
        let cutoff = now.saturating_sub(self.window_ms);
        self.scan_times.retain(|&t| t > cutoff);
        self.metrics.fps = u32::try_from(self.scan_times.len()).unwrap_or(u32::MAX);

        &self.metrics
    }

    /// Clears every counter and re-anchors the clock at `now`.
    pub fn reset(&mut self, now: TimestampMs) {
        info!(now, "Detection metrics reset");
        self.anchor = Some(now);
        self.last_code = None;
        self.code_started_at = None;
        self.scan_times.clear();
        self.metrics = DetectionMetrics::default();
    }

    /// Current metrics.
    pub fn metrics(&self) -> &DetectionMetrics {
        &self.metrics
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_FPS_WINDOW_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_detection_recorded_once() {
        let mut recorder = MetricsRecorder::default();
        recorder.start(1_000);

        assert_eq!(recorder.record("A", 1_350).first_detection_time, Some(350));
        assert_eq!(recorder.record("B", 2_000).first_detection_time, Some(350));
    }

    #[test]
    fn test_no_first_detection_without_anchor() {
        let mut recorder = MetricsRecorder::default();
        let m = recorder.record("A", 500);
        assert!(m.first_detection_time.is_none());
        assert_eq!(m.scan_count, 1);
    }

    #[test]
    fn test_latency_between_distinct_codes() {
        let mut recorder = MetricsRecorder::default();
        recorder.start(0);

        assert!(recorder.record("A", 100).detection_latency.is_none());
        // Same code again: latency untouched
        assert!(recorder.record("A", 150).detection_latency.is_none());
        assert_eq!(recorder.record("B", 400).detection_latency, Some(300));
        assert_eq!(recorder.record("B", 450).detection_latency, Some(300));
        assert_eq!(recorder.record("C", 1_000).detection_latency, Some(600));
    }

    #[test]
    fn test_fps_counts_trailing_window() {
        let mut recorder = MetricsRecorder::default();
        recorder.start(0);

        for t in [0, 100, 200, 300] {
            recorder.record("A", t);
        }
        assert_eq!(recorder.metrics().fps, 4);

        // t=0 falls out: window is (0, 1000]
        assert_eq!(recorder.record("A", 1_000).fps, 4);
        assert_eq!(recorder.record("A", 2_500).fps, 1);
        assert_eq!(recorder.metrics().scan_count, 6);
        assert_eq!(recorder.metrics().last_detection_time, Some(2_500));
    }

    #[test]
    fn test_reset_clears_and_reanchors() {
        let mut recorder = MetricsRecorder::default();
        recorder.start(0);
        recorder.record("A", 100);
        recorder.record("B", 300);

        recorder.reset(10_000);
        let m = recorder.metrics();
        assert_eq!(m.scan_count, 0);
        assert_eq!(m.fps, 0);
        assert!(m.first_detection_time.is_none());
        assert!(m.last_detection_time.is_none());
        assert!(m.detection_latency.is_none());

        // Fresh first detection relative to the new anchor
        let m = recorder.record("B", 10_250);
        assert_eq!(m.first_detection_time, Some(250));
        assert!(m.detection_latency.is_none());
        assert_eq!(m.fps, 1);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let mut recorder = MetricsRecorder::default();
        recorder.start(i64::MAX);

        let m = recorder.record("A", i64::MIN);
        assert_eq!(m.first_detection_time, Some(i64::MIN));
        assert_eq!(m.fps, 1);

        let m = recorder.record("B", i64::MAX);
        assert_eq!(m.detection_latency, Some(i64::MAX));
        assert_eq!(m.scan_count, 2);
    }
}
