//! Three-byte length prefix preceding every frame on a TCP connection.

use bytes::{BufMut, Bytes, BytesMut};

use super::FrameError;
use crate::byte_order::{U24_MAX, read_network_u24, write_network_u24};

/// Width of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 3;

/// Largest frame body the prefix can describe (`2^24 - 1`).
pub const MAX_FRAME_LENGTH: usize = U24_MAX as usize;

/// Encode `len` as a 3-byte big-endian length prefix.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if `len` does not fit in 24 bits. The
/// value is never truncated.
///
/// # Examples
///
/// ```
/// use flowprobe::frame::encode_length;
///
/// assert_eq!(encode_length(0x01_0203), Ok([0x01, 0x02, 0x03]));
/// assert!(encode_length(1 << 24).is_err());
/// ```
pub fn encode_length(len: usize) -> Result<[u8; LENGTH_PREFIX_SIZE], FrameError> {
    let value = u32::try_from(len)
        .ok()
        .filter(|value| *value <= U24_MAX)
        .ok_or(FrameError::TooLarge {
            size: len,
            max: MAX_FRAME_LENGTH,
        })?;
    Ok(write_network_u24(value))
}

/// Decode a 3-byte big-endian length prefix.
#[must_use]
pub fn decode_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> usize {
    read_network_u24(prefix) as usize
}

/// Append `body` to `dst` behind its length prefix.
///
/// The prefix is computed from the complete body before anything is written,
/// so `dst` is left untouched when the body is too large.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the body exceeds [`MAX_FRAME_LENGTH`].
pub fn put_length_prefixed(body: &[u8], dst: &mut BytesMut) -> Result<(), FrameError> {
    let prefix = encode_length(body.len())?;
    dst.reserve(LENGTH_PREFIX_SIZE + body.len());
    dst.put_slice(&prefix);
    dst.put_slice(body);
    Ok(())
}

/// Return a fresh buffer holding `body` behind its length prefix.
///
/// # Errors
///
/// Returns [`FrameError::TooLarge`] if the body exceeds [`MAX_FRAME_LENGTH`].
pub fn length_prefixed(body: &[u8]) -> Result<Bytes, FrameError> {
    let mut dst = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + body.len());
    put_length_prefixed(body, &mut dst)?;
    Ok(dst.freeze())
}
