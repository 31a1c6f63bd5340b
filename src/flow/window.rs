//! Windowed flow control for an inbound stream of values.
//!
//! The subscriber requests a full window up front, counts each value against
//! it and tops the window up by another full window whenever half of it has
//! been consumed. The window therefore oscillates between half and one and a
//! half times its initial size and the producer is never starved.
//!
//! # Errors are demoted to completion
//!
//! An upstream error is logged and then handled exactly like completion: the
//! termination notifier fires and the error goes no further. This tool cares
//! that the flow ended, not why.

use std::fmt;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::DemandSink;

/// Window used by the channel scenario.
pub const DEFAULT_WINDOW: u32 = 7777;

/// Lifecycle of a [`WindowSubscriber`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPhase {
    /// Not subscribed yet; nothing has been requested.
    Idle,
    /// Receiving values against the outstanding window.
    Draining,
    /// Upstream completed or failed; no further demand is issued.
    Terminated,
}

/// Counters describing a finished or running window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Values received while draining.
    pub received: u64,
    /// Total demand issued, including the initial window.
    pub requested: u64,
    /// Number of replenishments after the initial request.
    pub replenished: u64,
}

/// Subscriber regulating demand with a fixed window.
pub struct WindowSubscriber<D> {
    demand: D,
    initial: u64,
    half: u64,
    window: u64,
    phase: WindowPhase,
    stats: WindowStats,
    terminated: CancellationToken,
}

impl<D> fmt::Debug for WindowSubscriber<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowSubscriber")
            .field("initial", &self.initial)
            .field("window", &self.window)
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<D: DemandSink> WindowSubscriber<D> {
    /// Subscriber with an initial window of `initial` values, signalling
    /// demand through `demand`.
    ///
    /// # Panics
    ///
    /// Panics if `initial` is less than 2; half a window must be non-zero.
    #[must_use]
    pub fn new(initial: u32, demand: D) -> Self {
        assert!(initial >= 2, "demand window must be at least 2");
        let initial = u64::from(initial);
        Self {
            demand,
            initial,
            half: initial / 2,
            window: 0,
            phase: WindowPhase::Idle,
            stats: WindowStats::default(),
            terminated: CancellationToken::new(),
        }
    }

    /// Request the initial window and start draining.
    ///
    /// Subscribing twice, or after termination, has no effect.
    pub fn on_subscribe(&mut self) {
        if self.phase != WindowPhase::Idle {
            debug!(phase = ?self.phase, "ignoring repeated subscription");
            return;
        }
        self.phase = WindowPhase::Draining;
        self.window = self.initial;
        self.issue(self.initial);
    }

    /// Count one received value.
    ///
    /// Returns `true` when the value depleted half the window and a new full
    /// window was requested.
    pub fn on_next(&mut self) -> bool {
        if self.phase != WindowPhase::Draining {
            debug!(phase = ?self.phase, "ignoring value outside draining phase");
            return false;
        }
        self.stats.received += 1;
        self.window -= 1;
        if self.window != self.half {
            return false;
        }
        self.window += self.initial;
        self.stats.replenished += 1;
        crate::metrics::inc_window_replenished();
        debug!(window = self.window, "replenishing demand window");
        self.issue(self.initial);
        true
    }

    /// Handle an upstream error by logging it and completing.
    pub fn on_error<E: fmt::Display + ?Sized>(&mut self, err: &E) {
        if self.terminate() {
            error!(error = %err, received = self.stats.received, "channel error; treating as completion");
        } else {
            debug!(error = %err, "ignoring error after termination");
        }
    }

    /// Handle upstream completion.
    pub fn on_complete(&mut self) {
        if self.terminate() {
            info!(received = self.stats.received, "channel completed");
        }
    }

    /// Notifier cancelled exactly once, on the first error or completion.
    #[must_use]
    pub fn termination(&self) -> CancellationToken { self.terminated.clone() }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> WindowPhase { self.phase }

    /// Values still covered by outstanding demand.
    #[must_use]
    pub fn window(&self) -> u64 { self.window }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> WindowStats { self.stats }

    /// Subscribe and consume `inbound` until it completes or fails.
    ///
    /// Errors are demoted to completion, see the module docs.
    pub async fn drive<S, T, E>(mut self, inbound: S) -> WindowStats
    where
        S: Stream<Item = Result<T, E>>,
        E: fmt::Display,
    {
        let mut inbound = std::pin::pin!(inbound);
        self.on_subscribe();
        while self.phase == WindowPhase::Draining {
            match inbound.next().await {
                Some(Ok(_)) => {
                    self.on_next();
                }
                Some(Err(err)) => self.on_error(&err),
                None => self.on_complete(),
            }
        }
        self.stats
    }

    fn issue(&mut self, n: u64) {
        self.stats.requested += n;
        self.demand.request(n);
    }

    fn terminate(&mut self) -> bool {
        if self.phase == WindowPhase::Terminated {
            return false;
        }
        self.phase = WindowPhase::Terminated;
        self.terminated.cancel();
        true
    }
}
