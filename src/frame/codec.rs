//! Tokio codec splitting a byte stream into length-prefixed frames.
//!
//! The encoder receives complete frame bodies and writes the prefix and the
//! body in a single call, so a frame is either fully buffered for the
//! transport or not buffered at all.

use std::io;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::length::{LENGTH_PREFIX_SIZE, MAX_FRAME_LENGTH, decode_length, put_length_prefixed};

/// Length-prefixed framing with a 3-byte big-endian prefix.
#[derive(Clone, Copy, Debug)]
pub struct LengthPrefixedCodec {
    max_frame_length: usize,
}

impl LengthPrefixedCodec {
    /// Construct a codec rejecting inbound frames longer than
    /// `max_frame_length`.
    ///
    /// Values above [`MAX_FRAME_LENGTH`] are clamped, the prefix cannot
    /// describe anything larger.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: max_frame_length.min(MAX_FRAME_LENGTH),
        }
    }

    /// Return the maximum inbound frame length.
    #[must_use]
    pub fn max_frame_length(&self) -> usize { self.max_frame_length }
}

impl Default for LengthPrefixedCodec {
    fn default() -> Self { Self::new(MAX_FRAME_LENGTH) }
}

impl Encoder<Bytes> for LengthPrefixedCodec {
    type Error = io::Error;

    fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        put_length_prefixed(&body, dst).map_err(io::Error::from)
    }
}

impl Decoder for LengthPrefixedCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(prefix) = read_prefix(src) else {
            src.reserve(LENGTH_PREFIX_SIZE - src.len());
            return Ok(None);
        };
        let len = decode_length(prefix);
        if len > self.max_frame_length {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame exceeds max length: {len} > {}", self.max_frame_length),
            ));
        }
        let needed = LENGTH_PREFIX_SIZE + len;
        if src.len() < needed {
            src.reserve(needed - src.len());
            return Ok(None);
        }
        src.advance(LENGTH_PREFIX_SIZE);
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => Err(premature_eof(src)),
        }
    }
}

fn read_prefix(src: &BytesMut) -> Option<[u8; LENGTH_PREFIX_SIZE]> {
    src.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()
}

/// Describe where in the frame the peer hung up.
fn premature_eof(src: &BytesMut) -> io::Error {
    let message = match read_prefix(src) {
        None => format!(
            "premature EOF during header: {} of {LENGTH_PREFIX_SIZE} header bytes",
            src.len()
        ),
        Some(prefix) => format!(
            "premature EOF: {} bytes of {} byte frame received",
            src.len() - LENGTH_PREFIX_SIZE,
            decode_length(prefix)
        ),
    };
    io::Error::new(io::ErrorKind::UnexpectedEof, message)
}
