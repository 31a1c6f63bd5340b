//! The SETUP frame opening every connection.

use std::time::Duration;

use bytes::{BufMut, BytesMut};

use super::{Frame, FrameError, FrameHeader, FrameType};
use crate::{
    byte_order::write_network_u32,
    metadata::{WellKnownMimeType, mime::validate_ascii},
};

/// Default keep-alive interval advertised to the peer.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(100);
/// Default maximum lifetime advertised to the peer.
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(1000);
/// Setup mime types carry a 1-byte length.
const MAX_SETUP_MIME_LENGTH: usize = u8::MAX as usize;
/// Durations are advertised as positive 31-bit millisecond counts.
const MAX_MILLIS: u32 = 0x7FFF_FFFF;

/// Protocol version advertised in the setup frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
}

impl Version {
    /// Protocol version 1.0.
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    fn to_wire(self) -> u32 { (u32::from(self.major) << 16) | u32::from(self.minor) }
}

impl Default for Version {
    fn default() -> Self { Self::V1_0 }
}

/// Connection setup: protocol version, keep-alive and content types.
///
/// The keep-alive values are only advertised; nothing in this crate enforces
/// them.
///
/// # Examples
///
/// ```
/// use flowprobe::frame::{Frame, SetupFrame};
///
/// let setup = SetupFrame::new(
///     "message/x.rsocket.composite-metadata.v0",
///     "application/cbor",
/// )
/// .expect("valid mime types");
/// let body = setup.encode().expect("setup fits");
/// assert_eq!(&body[..4], &[0, 0, 0, 0]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupFrame {
    version: Version,
    keepalive_interval: Duration,
    max_lifetime: Duration,
    metadata_mime: String,
    data_mime: String,
}

impl SetupFrame {
    /// Setup frame advertising `metadata_mime` and `data_mime` with default
    /// version and keep-alive settings.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidMime`] if either mime type is empty,
    /// non-ASCII or longer than 255 bytes.
    pub fn new(
        metadata_mime: impl Into<String>,
        data_mime: impl Into<String>,
    ) -> Result<Self, FrameError> {
        let metadata_mime = metadata_mime.into();
        let data_mime = data_mime.into();
        validate_ascii(&metadata_mime, MAX_SETUP_MIME_LENGTH)?;
        validate_ascii(&data_mime, MAX_SETUP_MIME_LENGTH)?;
        Ok(Self {
            version: Version::default(),
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            metadata_mime,
            data_mime,
        })
    }

    /// Setup frame for composite metadata with CBOR data.
    #[must_use]
    pub fn composite_cbor() -> Self {
        Self {
            version: Version::default(),
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            metadata_mime: WellKnownMimeType::CompositeMetadata.as_str().to_owned(),
            data_mime: WellKnownMimeType::ApplicationCbor.as_str().to_owned(),
        }
    }

    /// Set the advertised protocol version.
    #[must_use]
    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Set the advertised keep-alive interval.
    #[must_use]
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Set the advertised maximum lifetime.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Advertise `mime` as the data mime type.
    #[must_use]
    pub fn data_mime_type(mut self, mime: WellKnownMimeType) -> Self {
        self.data_mime = mime.as_str().to_owned();
        self
    }

    /// Return the metadata mime type.
    #[must_use]
    pub fn metadata_mime(&self) -> &str { &self.metadata_mime }

    /// Return the data mime type.
    #[must_use]
    pub fn data_mime(&self) -> &str { &self.data_mime }
}

fn to_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).map_or(MAX_MILLIS, |millis| millis.min(MAX_MILLIS))
}

fn put_short_string(value: &str, dst: &mut BytesMut) {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "setup mime types are validated to at most 255 bytes"
    )]
    dst.put_u8(value.len() as u8);
    dst.put_slice(value.as_bytes());
}

impl Frame for SetupFrame {
    fn header(&self) -> FrameHeader { FrameHeader::new(0, FrameType::Setup, 0) }

    fn encode_payload(&self, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.reserve(12 + 2 + self.metadata_mime.len() + self.data_mime.len());
        dst.put_slice(&write_network_u32(self.version.to_wire()));
        dst.put_slice(&write_network_u32(to_millis(self.keepalive_interval)));
        dst.put_slice(&write_network_u32(to_millis(self.max_lifetime)));
        put_short_string(&self.metadata_mime, dst);
        put_short_string(&self.data_mime, dst);
        Ok(())
    }
}
