//! Explicit demand signalling between a consumer and its producer.

use tokio::sync::mpsc;

/// Receives demand from a consumer.
///
/// This is the pull side of every flow in the crate: a producer emits only
/// what has been requested through a sink.
pub trait DemandSink {
    /// Ask the producer for `n` more items.
    fn request(&mut self, n: u64);
}

/// Sending half of a demand channel.
#[derive(Clone, Debug)]
pub struct DemandHandle {
    tx: mpsc::UnboundedSender<u64>,
}

/// Receiving half of a demand channel, held by the producer.
#[derive(Debug)]
pub struct DemandReceiver {
    rx: mpsc::UnboundedReceiver<u64>,
}

/// Create a connected demand handle and receiver.
///
/// # Examples
///
/// ```
/// use flowprobe::flow::{DemandSink, demand_channel};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (mut handle, mut receiver) = demand_channel();
/// handle.request(3);
/// assert_eq!(receiver.recv().await, Some(3));
/// # }
/// ```
#[must_use]
pub fn demand_channel() -> (DemandHandle, DemandReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (DemandHandle { tx }, DemandReceiver { rx })
}

impl DemandSink for DemandHandle {
    fn request(&mut self, n: u64) {
        if n == 0 {
            return;
        }
        if self.tx.send(n).is_err() {
            tracing::debug!(n, "demand dropped: producer has gone away");
            return;
        }
        crate::metrics::add_demand(n);
    }
}

impl DemandReceiver {
    /// Wait for the next demand signal.
    ///
    /// Returns `None` once every [`DemandHandle`] has been dropped.
    pub async fn recv(&mut self) -> Option<u64> { self.rx.recv().await }
}
