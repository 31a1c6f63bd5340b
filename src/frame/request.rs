//! `REQUEST_RESPONSE` frames carrying routing metadata and opaque data.

use bytes::{BufMut, Bytes, BytesMut};

use super::{FLAG_METADATA, Frame, FrameError, FrameHeader, FrameType, encode_length};

/// A single-response request on its own stream.
///
/// Metadata is always present: the metadata flag is set and the metadata is
/// preceded by its 3-byte length. Data follows directly and runs to the end
/// of the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestFrame {
    stream_id: u32,
    metadata: Bytes,
    data: Bytes,
}

impl RequestFrame {
    /// Request on `stream_id` with encoded composite `metadata` and `data`.
    #[must_use]
    pub fn new(stream_id: u32, metadata: Bytes, data: Bytes) -> Self {
        Self {
            stream_id,
            metadata,
            data,
        }
    }}

impl Frame for RequestFrame {
    fn header(&self) -> FrameHeader {
        FrameHeader::new(self.stream_id, FrameType::RequestResponse, FLAG_METADATA)
    }

    fn encode_payload(&self, dst: &mut BytesMut) -> Result<(), FrameError> {
        let metadata_length = encode_length(self.metadata.len())?;
        dst.reserve(metadata_length.len() + self.metadata.len() + self.data.len());
        dst.put_slice(&metadata_length);
        dst.put_slice(&self.metadata);
        dst.put_slice(&self.data);
        Ok(())
    }
}
