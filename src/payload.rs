//! Request payloads and the serializers that turn them into opaque bytes.
//!
//! Frames treat data as opaque. The [`PayloadSerializer`] trait is the seam
//! where an application plugs in its encoding; [`CborSerializer`] is the
//! default and matches the `application/cbor` data mime type advertised in
//! the setup frame.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{error::EncodeError, metadata::WellKnownMimeType};

/// Text repeated to build the default flood request.
pub const OVERFLOW_UNIT: &str = "response-overflow";
/// Number of [`OVERFLOW_UNIT`] repetitions in the default flood request.
pub const DEFAULT_OVERFLOW_REPEAT: usize = 1000;

/// Request record with a single text field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Message text.
    pub message: String,
}

impl Request {
    /// Request carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Large request built from `repeat` copies of [`OVERFLOW_UNIT`].
    #[must_use]
    pub fn overflow(repeat: usize) -> Self { Self::new(OVERFLOW_UNIT.repeat(repeat)) }
}

/// Serializes request payloads into data bytes.
pub trait PayloadSerializer {
    /// Data mime type produced by this serializer.
    fn mime_type(&self) -> WellKnownMimeType;

    /// Serialize `value` into bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Bytes, EncodeError>;
}

/// CBOR serializer backed by `ciborium`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CborSerializer;

impl PayloadSerializer for CborSerializer {
    fn mime_type(&self) -> WellKnownMimeType { WellKnownMimeType::ApplicationCbor }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<Bytes, EncodeError> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)?;
        Ok(Bytes::from(buf))
    }
}
