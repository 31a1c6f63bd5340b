//! Error types for frame construction and parsing.

use std::io;

use thiserror::Error;

/// Errors raised while building or inspecting a frame.
///
/// Every variant is detected before any byte reaches the transport, so a
/// rejected frame never leaves a partial write behind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The encoded length does not fit the 3-byte length prefix.
    #[error("frame length {size} exceeds prefix capacity {max}")]
    TooLarge {
        /// Length that was rejected.
        size: usize,
        /// Largest length the prefix can carry.
        max: usize,
    },

    /// A mime type is empty, non-ASCII or longer than the field allows.
    #[error("invalid mime type {mime:?}: must be 1..={max} ASCII bytes")]
    InvalidMime {
        /// Offending mime type.
        mime: String,
        /// Longest mime type the field can carry.
        max: usize,
    },

    /// A routing tag is empty or longer than 255 bytes.
    #[error("invalid routing tag: {len} bytes, must be 1..=255")]
    InvalidTag {
        /// Length of the offending tag in bytes.
        len: usize,
    },

    /// Not enough bytes to parse a frame header.
    #[error("truncated frame: have {have} bytes, need {need}")]
    Truncated {
        /// Bytes available.
        have: usize,
        /// Bytes required.
        need: usize,
    },
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        let kind = match err {
            FrameError::Truncated { .. } => io::ErrorKind::InvalidData,
            FrameError::TooLarge { .. }
            | FrameError::InvalidMime { .. }
            | FrameError::InvalidTag { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}
