//! Optional reader draining inbound frames from the peer.
//!
//! By default nothing reads the connection, which lets responses pile up on
//! the peer. When enabled, this reader splits the byte stream into frames,
//! labels them by type and counts them.

use futures::StreamExt;
use log::warn;
use tokio::io::AsyncRead;
use tokio_util::{codec::FramedRead, sync::CancellationToken};
use tracing::{info, trace};

use crate::{
    error::FlowError,
    frame::{FrameHeader, FrameType, LengthPrefixedCodec},
};

/// Counters describing drained inbound traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InboundStats {
    /// Frames received.
    pub frames: u64,
    /// PAYLOAD frames among them.
    pub payloads: u64,
    /// ERROR frames among them.
    pub errors: u64,
    /// Frame body bytes received, excluding length prefixes.
    pub bytes: u64,
}

/// Read and count frames from `reader` until EOF or `stop` is cancelled.
///
/// Frames whose header cannot be parsed are counted and logged, not fatal.
///
/// # Errors
///
/// Returns [`FlowError::Io`] if the transport fails or the peer hangs up in
/// the middle of a frame.
pub async fn drain_inbound<R>(reader: R, stop: CancellationToken) -> Result<InboundStats, FlowError>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, LengthPrefixedCodec::default());
    let mut stats = InboundStats::default();
    loop {
        let next = tokio::select! {
            biased;
            () = stop.cancelled() => break,
            next = frames.next() => next,
        };
        let Some(frame) = next else { break };
        let frame = frame?;
        stats.frames += 1;
        stats.bytes += frame.len() as u64;
        match FrameHeader::parse(&frame) {
            Ok(header) => {
                match header.frame_type {
                    FrameType::Payload => stats.payloads += 1,
                    FrameType::Error => {
                        stats.errors += 1;
                        warn!("peer sent ERROR frame: stream_id={}", header.stream_id);
                    }
                    _ => {}
                }
                trace!(stream_id = header.stream_id, frame_type = ?header.frame_type, len = frame.len(), "inbound frame");
            }
            Err(e) => warn!("malformed inbound frame: error={e}"),
        }
    }
    info!(
        frames = stats.frames,
        payloads = stats.payloads,
        errors = stats.errors,
        "inbound drain finished"
    );
    Ok(stats)
}
