//! Helpers for explicit network byte-order conversions.
//!
//! Every multi-byte integer on the wire is big-endian. Keeping the
//! conversions here scopes the Clippy expectations to the conversion points
//! so frame code can stay explicit about endianness.

/// Largest value representable by a 24-bit unsigned integer.
pub const U24_MAX: u32 = 0x00FF_FFFF;

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use flowprobe::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u16::from_be_bytes(bytes)
}

/// Serialise the low 24 bits of `value` in network byte order.
///
/// Bits above the 24th are discarded; callers that must not truncate check
/// against [`U24_MAX`] first.
///
/// # Examples
///
/// ```
/// use flowprobe::byte_order::write_network_u24;
///
/// assert_eq!(write_network_u24(0x01_0203), [0x01, 0x02, 0x03]);
/// ```
#[must_use]
pub fn write_network_u24(value: u32) -> [u8; 3] {
    let [_, hi, mid, lo] = write_network_u32(value);
    [hi, mid, lo]
}

/// Parse a network-order 24-bit integer.
///
/// # Examples
///
/// ```
/// use flowprobe::byte_order::read_network_u24;
///
/// assert_eq!(read_network_u24([0x01, 0x02, 0x03]), 0x01_0203);
/// ```
#[must_use]
pub fn read_network_u24(bytes: [u8; 3]) -> u32 {
    let [hi, mid, lo] = bytes;
    read_network_u32([0, hi, mid, lo])
}

/// Serialise a `u32` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use flowprobe::byte_order::write_network_u32;
///
/// assert_eq!(write_network_u32(0x1234_5678), [0x12, 0x34, 0x56, 0x78]);
/// ```
#[must_use]
pub fn write_network_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u32` from its on-wire representation.
#[must_use]
pub fn read_network_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u32::from_be_bytes(bytes)
}
