//! Routing metadata: a list of tags naming the remote operation.
//!
//! Each tag is written as a 1-byte length followed by its UTF-8 bytes.

use bytes::{BufMut, Bytes, BytesMut};

use crate::frame::FrameError;

/// Longest routing tag in bytes.
pub const MAX_TAG_LENGTH: usize = u8::MAX as usize;

/// Validated routing tags.
///
/// # Examples
///
/// ```
/// use flowprobe::metadata::RoutingTags;
///
/// let tags = RoutingTags::new(["response"]).expect("valid tag");
/// assert_eq!(&tags.encode()[..], b"\x08response");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingTags {
    tags: Vec<String>,
}

impl RoutingTags {
    /// Validate and collect `tags`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidTag`] if any tag is empty or longer than
    /// [`MAX_TAG_LENGTH`] bytes.
    pub fn new<I, S>(tags: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(Into::into)
            .map(|tag: String| {
                if tag.is_empty() || tag.len() > MAX_TAG_LENGTH {
                    Err(FrameError::InvalidTag { len: tag.len() })
                } else {
                    Ok(tag)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tags })
    }

    /// Encode the tags as routing metadata content.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.tags.iter().map(|tag| tag.len() + 1).sum());
        for tag in &self.tags {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "tag lengths are validated against MAX_TAG_LENGTH"
            )]
            dst.put_u8(tag.len() as u8);
            dst.put_slice(tag.as_bytes());
        }
        dst.freeze()
    }
}
