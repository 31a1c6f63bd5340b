//! End-to-end runs.
//!
//! [`run_flood`] connects to a peer and floods it with request bursts.
//! [`run_channel`] pairs the demand-driven payload source with one of the
//! demand-regulating consumers in-process, optionally failing the channel
//! part way through.

use std::io;

use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    client::{Connection, InboundStats, drain_inbound},
    config::{ChannelConfig, Consumer, FloodConfig},
    error::FlowError,
    flow::{PacedStats, PacedSubscriber, PayloadSource, WindowStats, WindowSubscriber, demand_channel},
    payload::{CborSerializer, PayloadSerializer},
    scheduler::{BurstScheduler, BurstStats},
};

/// Outcome of a flood run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FloodReport {
    /// What the scheduler wrote.
    pub burst: BurstStats,
    /// What was drained from the peer, if reading was enabled.
    pub inbound: Option<InboundStats>,
}

/// Outcome of a channel run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelReport {
    /// The windowed subscriber drained the channel.
    Window(WindowStats),
    /// The paced subscriber drained the channel.
    Paced(PacedStats),
}

/// Connect to the configured peer, announce the connection and flood it
/// until `stop` is cancelled or the tick limit is reached.
///
/// Inbound traffic is left unread unless the configuration asks for it, in
/// which case reading starts only after the setup frame has been written.
///
/// # Errors
///
/// Returns an error if the connection cannot be established, a frame cannot
/// be built or the transport fails.
pub async fn run_flood(config: &FloodConfig, stop: CancellationToken) -> Result<FloodReport, FlowError> {
    let connection = Connection::open(config.peer(), config.socket_options()).await?;
    let (reader, writer) = connection.into_split();

    let scheduler = BurstScheduler::new(
        config.burst_config().clone(),
        config.setup_frame(CborSerializer.mime_type())?,
        CborSerializer,
        config.request(),
    )?;
    let framed = scheduler.start(writer).await?;

    let drain_stop = stop.child_token();
    let (drain, _unread) = if config.reads_responses() {
        (Some(tokio::spawn(drain_inbound(reader, drain_stop.clone()))), None)
    } else {
        (None, Some(reader))
    };

    let result = scheduler.run(framed, stop).await;
    drain_stop.cancel();

    let inbound = match drain {
        Some(handle) => match handle.await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(err)) => {
                warn!(error = %err, "inbound drain failed");
                None
            }
            Err(err) => {
                warn!(error = %err, "inbound drain task panicked");
                None
            }
        },
        None => None,
    };

    Ok(FloodReport {
        burst: result?,
        inbound,
    })
}

/// Run the payload source against the configured consumer until the
/// channel completes, fails or `stop` is cancelled.
///
/// # Errors
///
/// Returns an error if the request cannot be serialized, or if the paced
/// consumer sees the channel fail. The windowed consumer treats failure as
/// completion.
pub async fn run_channel(config: &ChannelConfig, stop: CancellationToken) -> Result<ChannelReport, FlowError> {
    let payload = CborSerializer
        .serialize(&config.request)
        .map_err(FlowError::Encode)?;
    let (handle, receiver) = demand_channel();
    let values = PayloadSource::new(payload)
        .into_stream(receiver, stop)
        .map(Ok::<Bytes, io::Error>);

    let inbound = match (config.fail_after, config.values) {
        (Some(n), _) => values
            .take(n)
            .chain(stream::once(async {
                Err(io::Error::other("injected channel failure"))
            }))
            .boxed(),
        (None, Some(n)) => values.take(n).boxed(),
        (None, None) => values.boxed(),
    };

    match config.consumer {
        Consumer::Window { window } => {
            let stats = WindowSubscriber::new(window, handle).drive(inbound).await;
            info!(
                received = stats.received,
                requested = stats.requested,
                replenished = stats.replenished,
                "window channel finished"
            );
            Ok(ChannelReport::Window(stats))
        }
        Consumer::Paced { batch, interval } => {
            let stats = PacedSubscriber::new(batch, interval, handle)
                .drive(inbound)
                .await?;
            info!(
                received = stats.received,
                requested = stats.requested,
                "paced channel finished"
            );
            Ok(ChannelReport::Paced(stats))
        }
    }
}
