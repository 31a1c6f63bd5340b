//! Utilities for driving `flowprobe` writers with in-memory streams during
//! tests.
//!
//! These helpers run a [`BurstScheduler`] against a `tokio::io::duplex`
//! stream, collect everything it writes and split the captured bytes back
//! into frames for assertions.
//!
//! ```rust
//! use flowprobe::{BurstConfig, BurstScheduler, CborSerializer, Request, SetupFrame};
//! use flowprobe_testing::{capture_run, decode_frames};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let config = BurstConfig { max_ticks: Some(1), ..BurstConfig::default() };
//! let scheduler =
//!     BurstScheduler::new(config, SetupFrame::composite_cbor(), CborSerializer, Request::new("x"))
//!         .unwrap();
//! let (stats, bytes) = capture_run(scheduler, CancellationToken::new()).await;
//! let frames = decode_frames(&bytes).unwrap();
//! assert_eq!(frames.len() as u64, stats.unwrap().frames + 1);
//! # }
//! ```

use std::{
    io,
    sync::atomic::{AtomicUsize, Ordering},
};

use bytes::{Bytes, BytesMut};
use flowprobe::{
    BurstScheduler,
    BurstStats,
    LengthPrefixedCodec,
    PayloadSerializer,
    FlowError,
    error::EncodeError,
    frame::{FrameHeader, FrameType},
    metadata::WellKnownMimeType,
    payload::Request,
};
use rstest::fixture;
use serde::Serialize;
use tokio::io::{AsyncReadExt, duplex};
use tokio_util::{codec::Decoder, sync::CancellationToken};

const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Small request keeping captured output compact.
#[fixture]
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
pub fn small_request() -> Request { Request::new("data") }

/// Default length-prefixed codec.
#[fixture]
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
pub fn codec() -> LengthPrefixedCodec { LengthPrefixedCodec::default() }

/// Run `scheduler` on an in-memory connection and return its result with
/// every byte it wrote.
///
/// The peer end is read concurrently so the scheduler never stalls on a full
/// pipe.
pub async fn capture_run<P>(
    scheduler: BurstScheduler<P>,
    stop: CancellationToken,
) -> (Result<BurstStats, FlowError>, Vec<u8>)
where
    P: PayloadSerializer,
{
    capture_run_with_capacity(scheduler, stop, DEFAULT_CAPACITY).await
}

/// Like [`capture_run`] with an explicit duplex buffer `capacity`.
///
/// # Panics
///
/// Panics if reading the peer end fails.
pub async fn capture_run_with_capacity<P>(
    scheduler: BurstScheduler<P>,
    stop: CancellationToken,
    capacity: usize,
) -> (Result<BurstStats, FlowError>, Vec<u8>)
where
    P: PayloadSerializer,
{
    let (client, mut server) = duplex(capacity);
    let mut written = Vec::new();
    let (result, read) = tokio::join!(
        scheduler.run_on(client, stop),
        server.read_to_end(&mut written)
    );
    read.expect("read captured frames");
    (result, written)
}

/// Split captured bytes into frame bodies.
///
/// # Errors
///
/// Returns an error if the bytes do not end on a frame boundary or a frame
/// exceeds the codec maximum.
pub fn decode_frames(bytes: &[u8]) -> io::Result<Vec<Bytes>> {
    let mut codec = LengthPrefixedCodec::default();
    let mut buf = BytesMut::from(bytes);
    let mut frames = Vec::new();
    while let Some(frame) = codec.decode_eof(&mut buf)? {
        frames.push(frame);
    }
    Ok(frames)
}

/// Headers of every frame in `frames`.
///
/// # Panics
///
/// Panics if a frame is shorter than a header.
#[must_use]
pub fn headers(frames: &[Bytes]) -> Vec<FrameHeader> {
    frames
        .iter()
        .map(|frame| FrameHeader::parse(frame).expect("frame header"))
        .collect()
}

/// Stream ids of the request frames in `frames`, in write order.
#[must_use]
pub fn request_stream_ids(frames: &[Bytes]) -> Vec<u32> {
    headers(frames)
        .into_iter()
        .filter(|header| header.frame_type == FrameType::RequestResponse)
        .map(|header| header.stream_id)
        .collect()
}

/// Serializer that succeeds a fixed number of times and then fails.
#[derive(Debug)]
pub struct FailingSerializer {
    remaining: AtomicUsize,
}

impl FailingSerializer {
    /// Serializer failing after `successes` payloads.
    #[must_use]
    pub fn after(successes: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(successes),
        }
    }
}

impl PayloadSerializer for FailingSerializer {
    fn mime_type(&self) -> WellKnownMimeType { WellKnownMimeType::ApplicationOctetStream }

    fn serialize<T: Serialize>(&self, _value: &T) -> Result<Bytes, EncodeError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| Bytes::from_static(b"payload"))
            .map_err(|_| "payload serializer exhausted".into())
    }
}
