//! Metric helpers for `flowprobe`.
//!
//! This module defines metric names and thin wrappers around the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the wrappers compile to nothing.

/// Name of the counter tracking frames written to a connection.
pub const FRAMES_SENT: &str = "flowprobe_frames_sent_total";
/// Name of the counter tracking flushes forced by transport backpressure.
pub const FORCED_FLUSHES: &str = "flowprobe_forced_flushes_total";
/// Name of the counter tracking demand signalled to producers.
pub const DEMAND_REQUESTED: &str = "flowprobe_demand_requested_total";
/// Name of the counter tracking demand window replenishments.
pub const WINDOW_REPLENISHED: &str = "flowprobe_window_replenished_total";

/// Kind of frame written to a connection.
#[derive(Clone, Copy, Debug)]
pub enum FrameKind {
    /// Connection setup.
    Setup,
    /// Single-response request.
    Request,
}

impl FrameKind {
    #[cfg(feature = "metrics")]
    fn as_str(self) -> &'static str {
        match self {
            FrameKind::Setup => "setup",
            FrameKind::Request => "request",
        }
    }
}

/// Record a frame written to a connection.
#[cfg(feature = "metrics")]
pub fn inc_frames(kind: FrameKind) {
    metrics::counter!(FRAMES_SENT, "kind" => kind.as_str()).increment(1);
}

/// Record a flush forced by transport backpressure.
#[cfg(feature = "metrics")]
pub fn inc_forced_flushes() { metrics::counter!(FORCED_FLUSHES).increment(1); }

/// Record `n` units of demand signalled upstream.
#[cfg(feature = "metrics")]
pub fn add_demand(n: u64) { metrics::counter!(DEMAND_REQUESTED).increment(n); }

/// Record a demand window replenishment.
#[cfg(feature = "metrics")]
pub fn inc_window_replenished() { metrics::counter!(WINDOW_REPLENISHED).increment(1); }

/// Record a frame written to a connection.
#[cfg(not(feature = "metrics"))]
pub fn inc_frames(_kind: FrameKind) {}

/// Record a flush forced by transport backpressure.
#[cfg(not(feature = "metrics"))]
pub fn inc_forced_flushes() {}

/// Record `n` units of demand signalled upstream.
#[cfg(not(feature = "metrics"))]
pub fn add_demand(_n: u64) {}

/// Record a demand window replenishment.
#[cfg(not(feature = "metrics"))]
pub fn inc_window_replenished() {}
