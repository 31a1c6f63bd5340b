//! Canonical error and result types for the crate.

use std::io;

use crate::frame::FrameError;

/// Boxed error returned by payload serializers.
pub type EncodeError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type exposed by `flowprobe`.
///
/// Every variant is fatal to the connection it occurred on; nothing in this
/// crate reconnects or retries.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// Transport error, including a failed connect.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// A frame could not be built.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
    /// The request payload could not be serialized.
    #[error("failed to serialize request payload")]
    Encode(#[source] EncodeError),
    /// The peer closed the connection.
    #[error("connection closed by peer")]
    ConnectionClosed,
}

/// Result type alias using [`FlowError`].
pub type Result<T, E = FlowError> = std::result::Result<T, E>;
