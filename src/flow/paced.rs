//! A deliberately slow consumer that asks for a small batch on every tick.
//!
//! Paired with a producer that ignores demand, the gap between requested and
//! received counts logged on each tick shows how far the producer overruns.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

use super::DemandSink;

/// Batch requested on subscription and on every tick.
pub const DEFAULT_BATCH: u64 = 5;
/// Interval between batches.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Counters reported by a [`PacedSubscriber`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacedStats {
    /// Values received.
    pub received: u64,
    /// Total demand issued.
    pub requested: u64,
    /// Ticks elapsed.
    pub ticks: u64,
}

/// Consumer requesting a fixed batch per interval.
#[derive(Debug)]
pub struct PacedSubscriber<D> {
    demand: D,
    batch: u64,
    interval: Duration,
}

impl<D: DemandSink> PacedSubscriber<D> {
    /// Subscriber requesting `batch` values every `interval`.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn new(batch: u64, interval: Duration, demand: D) -> Self {
        assert!(!interval.is_zero(), "pacing interval must be non-zero");
        Self {
            demand,
            batch,
            interval,
        }
    }

    /// Consume `inbound` until it completes or fails.
    ///
    /// Unlike [`WindowSubscriber`](super::WindowSubscriber) this consumer
    /// propagates upstream errors.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `inbound`.
    pub async fn drive<S, T, E>(mut self, inbound: S) -> Result<PacedStats, E>
    where
        S: Stream<Item = Result<T, E>>,
    {
        let mut inbound = std::pin::pin!(inbound);
        let mut stats = PacedStats::default();
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut since_tick = 0u64;

        self.demand.request(self.batch);
        stats.requested += self.batch;
        loop {
            tokio::select! {
                item = inbound.next() => match item {
                    Some(Ok(_)) => {
                        stats.received += 1;
                        since_tick += 1;
                    }
                    Some(Err(err)) => return Err(err),
                    None => return Ok(stats),
                },
                _ = ticker.tick() => {
                    stats.ticks += 1;
                    info!(requested = self.batch, received = since_tick, "payload pacing tick");
                    since_tick = 0;
                    self.demand.request(self.batch);
                    stats.requested += self.batch;
                }
            }
        }
    }
}
