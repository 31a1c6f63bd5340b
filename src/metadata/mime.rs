//! Mime types used in setup frames and composite metadata entries.

use std::fmt;

use crate::frame::FrameError;

/// Longest custom mime type a composite metadata entry can name.
pub const MAX_CUSTOM_MIME_LENGTH: usize = 128;

/// Well-known mime types with a compact one-byte id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WellKnownMimeType {
    /// `application/cbor`
    ApplicationCbor,
    /// `application/json`
    ApplicationJson,
    /// `application/octet-stream`
    ApplicationOctetStream,
    /// `text/plain`
    TextPlain,
    /// `message/x.rsocket.routing.v0`
    Routing,
    /// `message/x.rsocket.composite-metadata.v0`
    CompositeMetadata,
}

impl WellKnownMimeType {
    const ALL: [Self; 6] = [
        Self::ApplicationCbor,
        Self::ApplicationJson,
        Self::ApplicationOctetStream,
        Self::TextPlain,
        Self::Routing,
        Self::CompositeMetadata,
    ];

    /// Return the 7-bit identifier of this mime type.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::ApplicationCbor => 0x01,
            Self::ApplicationJson => 0x05,
            Self::ApplicationOctetStream => 0x06,
            Self::TextPlain => 0x21,
            Self::Routing => 0x7E,
            Self::CompositeMetadata => 0x7F,
        }
    }

    /// Return the textual form of this mime type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationCbor => "application/cbor",
            Self::ApplicationJson => "application/json",
            Self::ApplicationOctetStream => "application/octet-stream",
            Self::TextPlain => "text/plain",
            Self::Routing => "message/x.rsocket.routing.v0",
            Self::CompositeMetadata => "message/x.rsocket.composite-metadata.v0",
        }
    }

    /// Look up a well-known mime type by its textual form.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.as_str() == mime)
    }

    /// Look up a well-known mime type by its identifier.
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> { Self::ALL.into_iter().find(|known| known.id() == id) }
}

impl fmt::Display for WellKnownMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Mime type of a composite metadata entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MimeType {
    /// Encoded as its one-byte id.
    WellKnown(WellKnownMimeType),
    /// Encoded as a length-prefixed ASCII string.
    Custom(String),
}

impl MimeType {
    /// Build a mime type, preferring the compact well-known form.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidMime`] if a custom mime type is empty,
    /// non-ASCII or longer than [`MAX_CUSTOM_MIME_LENGTH`] bytes.
    pub fn parse(mime: &str) -> Result<Self, FrameError> {
        if let Some(known) = WellKnownMimeType::from_mime(mime) {
            return Ok(Self::WellKnown(known));
        }
        validate_ascii(mime, MAX_CUSTOM_MIME_LENGTH)?;
        Ok(Self::Custom(mime.to_owned()))
    }
}

impl From<WellKnownMimeType> for MimeType {
    fn from(value: WellKnownMimeType) -> Self { Self::WellKnown(value) }
}

/// Check that `mime` is 1..=`max` ASCII bytes.
pub(crate) fn validate_ascii(mime: &str, max: usize) -> Result<(), FrameError> {
    if mime.is_empty() || mime.len() > max || !mime.is_ascii() {
        return Err(FrameError::InvalidMime {
            mime: mime.to_owned(),
            max,
        });
    }
    Ok(())
}
