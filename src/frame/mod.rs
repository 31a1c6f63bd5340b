//! Hand-built frames and the 3-byte length-prefixed framing that carries
//! them.
//!
//! Frames are written in two phases: the body is built completely into a
//! growable buffer, then its length prefix is computed and both are committed
//! to the transport buffer together. A frame that fails to build never
//! reaches the transport.

pub mod codec;
pub mod error;
pub mod header;
pub mod length;
pub mod request;
pub mod setup;
pub mod stream_id;

use bytes::{Bytes, BytesMut};

pub use codec::LengthPrefixedCodec;
pub use error::FrameError;
pub use header::{FLAG_METADATA, FRAME_HEADER_SIZE, FrameHeader, FrameType};
pub use length::{
    LENGTH_PREFIX_SIZE,
    MAX_FRAME_LENGTH,
    decode_length,
    encode_length,
    length_prefixed,
    put_length_prefixed,
};
pub use request::RequestFrame;
pub use setup::{DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_MAX_LIFETIME, SetupFrame, Version};
pub use stream_id::{MAX_STREAM_ID, StreamIdSequence};

/// A frame that can be encoded into a body ready for its length prefix.
pub trait Frame {
    /// Header identifying the stream, type and flags.
    fn header(&self) -> FrameHeader;

    /// Append everything after the header to `dst`.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] if a field does not fit its encoding.
    fn encode_payload(&self, dst: &mut BytesMut) -> Result<(), FrameError>;

    /// Build the complete frame body (header and payload, no prefix).
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] if the payload cannot be encoded or the body
    /// is too large for the length prefix.
    fn encode(&self) -> Result<Bytes, FrameError> {
        let mut body = BytesMut::with_capacity(FRAME_HEADER_SIZE);
        self.header().encode(&mut body);
        self.encode_payload(&mut body)?;
        encode_length(body.len())?;
        Ok(body.freeze())
    }

    /// Build the frame body and prepend its length prefix.
    ///
    /// # Errors
    ///
    /// See [`encode`](Self::encode).
    fn encode_prefixed(&self) -> Result<Bytes, FrameError> { length_prefixed(&self.encode()?) }
}
