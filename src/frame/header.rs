//! The 6-byte header shared by every frame: stream id, type and flags.

use bytes::{BufMut, BytesMut};

use super::FrameError;
use crate::byte_order::{read_network_u16, read_network_u32, write_network_u16, write_network_u32};

/// Size of the stream id plus the type/flags field.
pub const FRAME_HEADER_SIZE: usize = 6;

/// Bit position of the frame type inside the type/flags field.
const TYPE_SHIFT: u16 = 10;
/// Mask selecting the flag bits of the type/flags field.
const FLAGS_MASK: u16 = 0x03FF;
/// The stream id is 31 bits; the top bit is reserved.
const STREAM_ID_MASK: u32 = 0x7FFF_FFFF;

/// Metadata is present and preceded by its 3-byte length.
pub const FLAG_METADATA: u16 = 1 << 8;

/// Frame types understood by this crate.
///
/// Only SETUP and `REQUEST_RESPONSE` are ever written. The remaining
/// variants exist so inbound traffic can be labelled in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// Connection setup, always on stream 0.
    Setup,
    /// Keep-alive ping.
    KeepAlive,
    /// Request expecting exactly one response.
    RequestResponse,
    /// Additional demand for an open stream.
    RequestN,
    /// Stream cancellation.
    Cancel,
    /// Response payload.
    Payload,
    /// Error on a stream or the connection.
    Error,
    /// Any other type code.
    Unknown(u8),
}

impl FrameType {
    /// Return the 6-bit wire code of this frame type.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Setup => 0x01,
            Self::KeepAlive => 0x03,
            Self::RequestResponse => 0x04,
            Self::RequestN => 0x08,
            Self::Cancel => 0x09,
            Self::Payload => 0x0A,
            Self::Error => 0x0B,
            Self::Unknown(code) => code,
        }
    }

    /// Map a wire code back to a frame type.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x01 => Self::Setup,
            0x03 => Self::KeepAlive,
            0x04 => Self::RequestResponse,
            0x08 => Self::RequestN,
            0x09 => Self::Cancel,
            0x0A => Self::Payload,
            0x0B => Self::Error,
            other => Self::Unknown(other),
        }
    }
}

/// Stream id, frame type and flags of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    /// Stream the frame belongs to; 0 for connection-level frames.
    pub stream_id: u32,
    /// Frame type.
    pub frame_type: FrameType,
    /// Flag bits (the low 10 bits of the type/flags field).
    pub flags: u16,
}

impl FrameHeader {
    /// Header for `frame_type` on `stream_id` with `flags`.
    #[must_use]
    pub const fn new(stream_id: u32, frame_type: FrameType, flags: u16) -> Self {
        Self {
            stream_id,
            frame_type,
            flags,
        }
    }

    /// Whether the metadata flag is set.
    #[must_use]
    pub const fn has_metadata(&self) -> bool { self.flags & FLAG_METADATA != 0 }

    /// Append the header to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        let type_and_flags =
            (u16::from(self.frame_type.code()) << TYPE_SHIFT) | (self.flags & FLAGS_MASK);
        dst.reserve(FRAME_HEADER_SIZE);
        dst.put_slice(&write_network_u32(self.stream_id & STREAM_ID_MASK));
        dst.put_slice(&write_network_u16(type_and_flags));
    }

    /// Parse the header at the start of a frame body.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Truncated`] if `src` is shorter than
    /// [`FRAME_HEADER_SIZE`].
    pub fn parse(src: &[u8]) -> Result<Self, FrameError> {
        let truncated = || FrameError::Truncated {
            have: src.len(),
            need: FRAME_HEADER_SIZE,
        };
        let stream_id: [u8; 4] = src
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(truncated)?;
        let type_and_flags: [u8; 2] = src
            .get(4..FRAME_HEADER_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(truncated)?;
        let type_and_flags = read_network_u16(type_and_flags);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the type code occupies the top 6 bits of a u16"
        )]
        let code = (type_and_flags >> TYPE_SHIFT) as u8;
        Ok(Self {
            stream_id: read_network_u32(stream_id) & STREAM_ID_MASK,
            frame_type: FrameType::from_code(code),
            flags: type_and_flags & FLAGS_MASK,
        })
    }
}
