//! Composite metadata: a sequence of typed, length-prefixed entries.
//!
//! Entry layout:
//!
//! ```text
//! well-known: 1 byte (0x80 | id)
//! custom:     1 byte (len - 1), then `len` ASCII bytes
//! then:       3-byte big-endian content length, then the content
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    MAX_CUSTOM_MIME_LENGTH,
    MimeType,
    RoutingTags,
    WellKnownMimeType,
    mime::validate_ascii,
};
use crate::frame::{FrameError, encode_length};

/// Marks the one-byte well-known form of an entry's mime type.
const WELL_KNOWN_FLAG: u8 = 0x80;

/// Builder accumulating composite metadata entries.
#[derive(Clone, Debug, Default)]
pub struct CompositeMetadata {
    buf: BytesMut,
}

impl CompositeMetadata {
    /// Create empty composite metadata.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Composite metadata holding a single routing entry for `tags`.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowprobe::metadata::{CompositeMetadata, RoutingTags};
    ///
    /// let tags = RoutingTags::new(["response"]).expect("valid tag");
    /// let metadata = CompositeMetadata::routing(&tags).expect("fits");
    /// assert_eq!(&metadata.freeze()[..], b"\xFE\x00\x00\x09\x08response");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLarge`] if the encoded tags exceed the
    /// 3-byte entry length.
    pub fn routing(tags: &RoutingTags) -> Result<Self, FrameError> {
        let mut metadata = Self::new();
        metadata.push(&WellKnownMimeType::Routing.into(), &tags.encode())?;
        Ok(metadata)
    }

    /// Append an entry of type `mime` carrying `content`.
    ///
    /// Nothing is appended when the entry is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::TooLarge`] if `content` exceeds the 3-byte
    /// entry length, or [`FrameError::InvalidMime`] if a custom mime type
    /// is empty, non-ASCII or longer than [`MAX_CUSTOM_MIME_LENGTH`] bytes.
    pub fn push(&mut self, mime: &MimeType, content: &[u8]) -> Result<&mut Self, FrameError> {
        if let MimeType::Custom(custom) = mime {
            validate_ascii(custom, MAX_CUSTOM_MIME_LENGTH)?;
        }
        let length = encode_length(content.len())?;
        match mime {
            MimeType::WellKnown(known) => {
                self.buf.reserve(1 + length.len() + content.len());
                self.buf.put_u8(WELL_KNOWN_FLAG | known.id());
            }
            MimeType::Custom(custom) => {
                self.buf
                    .reserve(1 + custom.len() + length.len() + content.len());
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "custom mime types are validated to 1..=128 bytes"
                )]
                self.buf.put_u8((custom.len() - 1) as u8);
                self.buf.put_slice(custom.as_bytes());
            }
        }
        self.buf.put_slice(&length);
        self.buf.put_slice(content);
        Ok(self)
    }

    /// Encoded length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Whether no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Finish building and return the encoded entries.
    #[must_use]
    pub fn freeze(self) -> Bytes { self.buf.freeze() }
}
