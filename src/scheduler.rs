//! Periodic burst scheduler flooding a connection with request frames.
//!
//! After writing the setup frame the scheduler wakes on a fixed period and
//! writes a fixed-size burst of `REQUEST_RESPONSE` frames, each on a fresh
//! stream id. It ignores the peer's demand entirely: the point is to
//! oversaturate the peer and observe how it fails.
//!
//! Transport backpressure is not an error. Whenever the outbound buffer
//! grows past its backpressure boundary the scheduler forces a flush and
//! carries on, letting the transport push back through the write itself.

use std::{io, time::Duration};

use bytes::Bytes;
use futures::SinkExt;
use tokio::{
    io::AsyncWrite,
    time::{self, MissedTickBehavior},
};
use tokio_util::{codec::FramedWrite, sync::CancellationToken};
use tracing::{debug, error, info, trace};

use crate::{
    error::FlowError,
    frame::{Frame, FrameError, LengthPrefixedCodec, RequestFrame, SetupFrame, StreamIdSequence},
    metadata::{CompositeMetadata, RoutingTags},
    metrics::{self, FrameKind},
    payload::{PayloadSerializer, Request},
};

/// Requests written per tick.
pub const DEFAULT_BURST_SIZE: usize = 300;
/// Time between bursts.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);
/// Route requested by every frame.
pub const DEFAULT_ROUTE: &str = "response";
/// Buffered bytes at which the outbound buffer reports itself not writable.
pub const DEFAULT_BACKPRESSURE_BOUNDARY: usize = 64 * 1024;

/// Frames written through the length-prefixed codec.
pub type OutboundFrames<W> = FramedWrite<W, LengthPrefixedCodec>;

/// Burst scheduler settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurstConfig {
    /// Time between bursts.
    pub period: Duration,
    /// Requests written per tick.
    pub burst_size: usize,
    /// Routing tag naming the remote operation.
    pub route: String,
    /// Stop after this many ticks; `None` runs until cancelled.
    pub max_ticks: Option<u64>,
    /// Buffered bytes that force a flush.
    pub backpressure_boundary: usize,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            burst_size: DEFAULT_BURST_SIZE,
            route: DEFAULT_ROUTE.to_owned(),
            max_ticks: None,
            backpressure_boundary: DEFAULT_BACKPRESSURE_BOUNDARY,
        }
    }
}

/// What a scheduler run wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BurstStats {
    /// Ticks that produced a complete burst.
    pub ticks: u64,
    /// Request frames handed to the transport.
    pub frames: u64,
    /// Flushes forced by the backpressure boundary.
    pub forced_flushes: u64,
    /// Stream id of the last request written.
    pub last_stream_id: Option<u32>,
}

/// Writes request bursts on a timer, regardless of peer demand.
#[derive(Debug)]
pub struct BurstScheduler<P> {
    config: BurstConfig,
    setup: SetupFrame,
    serializer: P,
    request: Request,
    metadata: Bytes,
    stream_ids: StreamIdSequence,
}

impl<P: PayloadSerializer> BurstScheduler<P> {
    /// Scheduler writing `request` serialized by `serializer` on the route
    /// named in `config`, after announcing itself with `setup`.
    ///
    /// The data mime type advertised by `setup` is replaced by the one the
    /// serializer produces.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidTag`] if the route is not a valid
    /// routing tag.
    ///
    /// # Panics
    ///
    /// Panics if `config.period` is zero.
    pub fn new(
        config: BurstConfig,
        setup: SetupFrame,
        serializer: P,
        request: Request,
    ) -> Result<Self, FrameError> {
        assert!(!config.period.is_zero(), "burst period must be non-zero");
        let tags = RoutingTags::new([config.route.as_str()])?;
        let metadata = CompositeMetadata::routing(&tags)?.freeze();
        let setup = setup.data_mime_type(serializer.mime_type());
        Ok(Self {
            config,
            setup,
            serializer,
            request,
            metadata,
            stream_ids: StreamIdSequence::new(),
        })
    }

    /// Replace the stream id sequence, e.g. to resume numbering.
    #[must_use]
    pub fn with_stream_ids(mut self, stream_ids: StreamIdSequence) -> Self {
        self.stream_ids = stream_ids;
        self
    }

    /// Build the next request frame body on a freshly allocated stream id.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Encode`] if the payload cannot be serialized or
    /// [`FlowError::Frame`] if the frame does not fit its length prefix. No
    /// bytes are produced in either case.
    pub fn next_request(&mut self) -> Result<(u32, Bytes), FlowError> {
        let stream_id = self.stream_ids.next_id();
        let data = self
            .serializer
            .serialize(&self.request)
            .map_err(FlowError::Encode)?;
        let body = RequestFrame::new(stream_id, self.metadata.clone(), data).encode()?;
        Ok((stream_id, body))
    }

    /// Wrap `writer` in the frame codec and write the setup frame.
    ///
    /// The caller keeps the read side of the connection idle until this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the setup frame cannot be encoded or written.
    pub async fn start<W>(&self, writer: W) -> Result<OutboundFrames<W>, FlowError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut framed = FramedWrite::new(writer, LengthPrefixedCodec::default());
        framed.set_backpressure_boundary(self.config.backpressure_boundary);
        framed
            .send(self.setup.encode()?)
            .await
            .map_err(transport)?;
        metrics::inc_frames(FrameKind::Setup);
        info!(
            metadata_mime = self.setup.metadata_mime(),
            data_mime = self.setup.data_mime(),
            "setup frame sent"
        );
        Ok(framed)
    }

    /// Write bursts on every tick until `stop` is cancelled or the tick
    /// limit is reached, then close the writer.
    ///
    /// Cancellation is honoured mid-burst and while a write is blocked on a
    /// peer that stopped reading. Frames still buffered at that point are
    /// dropped rather than flushed, and the interrupted burst is not counted
    /// as a tick.
    ///
    /// # Errors
    ///
    /// A failure to build or write a frame aborts the run. The frame being
    /// built is discarded, the connection is closed and the error returned.
    pub async fn run<W>(
        mut self,
        mut framed: OutboundFrames<W>,
        stop: CancellationToken,
    ) -> Result<BurstStats, FlowError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut ticker = time::interval(self.config.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
        let mut stats = BurstStats::default();
        info!(
            route = %self.config.route,
            burst_size = self.config.burst_size,
            period_ms = self.config.period.as_millis(),
            "burst scheduler started"
        );

        while self.config.max_ticks.is_none_or(|max| stats.ticks < max) {
            tokio::select! {
                biased;
                () = stop.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let burst = tokio::select! {
                biased;
                () = stop.cancelled() => break,
                result = self.emit_burst(&mut framed, &mut stats) => result,
            };
            if let Err(err) = burst {
                error!(error = %err, frames = stats.frames, "burst aborted; closing connection");
                if let Err(close_err) = close(framed, &stop).await {
                    debug!(error = %close_err, "close after failed burst also failed");
                }
                return Err(err);
            }
            stats.ticks += 1;
            debug!(tick = stats.ticks, frames = stats.frames, "burst written");
        }

        close(framed, &stop).await?;
        info!(
            ticks = stats.ticks,
            frames = stats.frames,
            forced_flushes = stats.forced_flushes,
            cancelled = stop.is_cancelled(),
            "burst scheduler stopped"
        );
        Ok(stats)
    }

    /// Write the setup frame to `writer`, then run until stopped.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start) and [`run`](Self::run).
    pub async fn run_on<W>(self, writer: W, stop: CancellationToken) -> Result<BurstStats, FlowError>
    where
        W: AsyncWrite + Unpin,
    {
        let framed = self.start(writer).await?;
        self.run(framed, stop).await
    }

    async fn emit_burst<W>(
        &mut self,
        framed: &mut OutboundFrames<W>,
        stats: &mut BurstStats,
    ) -> Result<(), FlowError>
    where
        W: AsyncWrite + Unpin,
    {
        for _ in 0..self.config.burst_size {
            let (stream_id, body) = self.next_request()?;
            framed.feed(body).await.map_err(transport)?;
            stats.frames += 1;
            stats.last_stream_id = Some(stream_id);
            metrics::inc_frames(FrameKind::Request);

            if framed.write_buffer().len() >= framed.backpressure_boundary() {
                trace!(buffered = framed.write_buffer().len(), "outbound buffer not writable; flushing");
                framed.flush().await.map_err(transport)?;
                stats.forced_flushes += 1;
                metrics::inc_forced_flushes();
            }
        }
        framed.flush().await.map_err(transport)
    }
}

/// Flush and close `framed`, abandoning anything still buffered once `stop`
/// fires.
async fn close<W>(mut framed: OutboundFrames<W>, stop: &CancellationToken) -> Result<(), FlowError>
where
    W: AsyncWrite + Unpin,
{
    tokio::select! {
        biased;
        () = stop.cancelled() => {
            debug!("stopped; dropping unflushed frames");
            Ok(())
        }
        result = framed.close() => result.map_err(transport),
    }
}

/// Report a peer hang-up as such rather than as a bare transport error.
fn transport(err: io::Error) -> FlowError {
    match err.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => FlowError::ConnectionClosed,
        _ => FlowError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tokio::io::{AsyncReadExt, duplex};

    use super::*;
    use crate::payload::CborSerializer;

    fn scheduler(config: BurstConfig) -> BurstScheduler<CborSerializer> {
        BurstScheduler::new(
            config,
            SetupFrame::composite_cbor(),
            CborSerializer,
            Request::new("data"),
        )
        .expect("valid scheduler")
    }

    #[test]
    fn requests_use_consecutive_odd_stream_ids() {
        let mut scheduler = scheduler(BurstConfig::default());
        let ids: Vec<u32> = (0..4)
            .map(|_| scheduler.next_request().expect("encode request").0)
            .collect();
        assert_eq!(ids, [1, 3, 5, 7]);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_long(&"r".repeat(256))]
    fn invalid_route_is_rejected(#[case] route: &str) {
        let config = BurstConfig {
            route: route.to_owned(),
            ..BurstConfig::default()
        };
        let result = BurstScheduler::new(
            config,
            SetupFrame::composite_cbor(),
            CborSerializer,
            Request::new("data"),
        );
        assert!(matches!(result, Err(FrameError::InvalidTag { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn small_boundary_forces_flushes() {
        let config = BurstConfig {
            burst_size: 10,
            max_ticks: Some(1),
            backpressure_boundary: 1,
            ..BurstConfig::default()
        };
        let (client, mut server) = duplex(64 * 1024);
        let stats = scheduler(config)
            .run_on(client, CancellationToken::new())
            .await
            .expect("run scheduler");
        assert_eq!(stats.frames, 10);
        assert_eq!(stats.forced_flushes, 10);
        assert_eq!(stats.last_stream_id, Some(19));

        let mut written = Vec::new();
        server.read_to_end(&mut written).await.expect("read frames");
        assert!(!written.is_empty());
    }

    #[tokio::test]
    async fn peer_hang_up_is_reported_as_closed() {
        let (client, server) = duplex(4096);
        drop(server);
        let result = scheduler(BurstConfig::default())
            .run_on(client, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(FlowError::ConnectionClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_first_tick_writes_only_setup() {
        let stop = CancellationToken::new();
        stop.cancel();
        let (client, mut server) = duplex(4096);
        let stats = scheduler(BurstConfig::default())
            .run_on(client, stop)
            .await
            .expect("run scheduler");
        assert_eq!(stats, BurstStats::default());

        let mut written = Vec::new();
        server.read_to_end(&mut written).await.expect("read frames");
        let setup = SetupFrame::composite_cbor()
            .encode_prefixed()
            .expect("encode setup");
        assert_eq!(written, setup.to_vec());
    }
}
