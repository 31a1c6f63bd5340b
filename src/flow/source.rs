//! A producer that emits a fixed value exactly as often as it is asked to.
//!
//! The source never throttles itself and never produces ahead of demand. It
//! models a pathological producer used to flood a consumer under test:
//! production only stops when the consumer stops asking.

use futures::{Stream, stream};
use tokio_util::sync::CancellationToken;

use super::DemandReceiver;

/// Demand-driven source of one repeated value.
#[derive(Clone, Debug)]
pub struct PayloadSource<T> {
    value: T,
}

impl<T: Clone> PayloadSource<T> {
    /// Source repeating `value`.
    #[must_use]
    pub fn new(value: T) -> Self { Self { value } }

    /// Produce exactly `n` copies of the value.
    ///
    /// Nothing is produced until the returned iterator is advanced, and it
    /// yields no more than `n` items.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowprobe::flow::PayloadSource;
    ///
    /// let mut source = PayloadSource::new("data");
    /// let batch: Vec<_> = source.request(3).collect();
    /// assert_eq!(batch, ["data", "data", "data"]);
    /// ```
    pub fn request(&mut self, n: u64) -> Emit<'_, T> {
        Emit {
            value: &self.value,
            remaining: n,
        }
    }

    /// Turn the source into a stream driven by `demand`.
    ///
    /// Each demand signal adds to the outstanding count; the stream yields
    /// one value per unit of outstanding demand and otherwise waits. It ends
    /// when `stop` is cancelled or every demand handle is dropped. The
    /// source is consumed, a fresh one is needed to start over.
    pub fn into_stream(self, demand: DemandReceiver, stop: CancellationToken) -> impl Stream<Item = T> {
        let state = StreamState {
            source: self,
            demand,
            stop,
            outstanding: 0,
        };
        stream::unfold(state, |mut state| async move {
            loop {
                if state.stop.is_cancelled() {
                    return None;
                }
                if state.outstanding > 0 {
                    state.outstanding -= 1;
                    let value = state.source.value.clone();
                    return Some((value, state));
                }
                tokio::select! {
                    biased;
                    () = state.stop.cancelled() => return None,
                    signal = state.demand.recv() => match signal {
                        Some(n) => state.outstanding = state.outstanding.saturating_add(n),
                        None => return None,
                    },
                }
            }
        })
    }
}

struct StreamState<T> {
    source: PayloadSource<T>,
    demand: DemandReceiver,
    stop: CancellationToken,
    outstanding: u64,
}

/// Iterator over one batch of requested values.
#[derive(Debug)]
pub struct Emit<'a, T> {
    value: &'a T,
    remaining: u64,
}

impl<T: Clone> Iterator for Emit<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.value.clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
