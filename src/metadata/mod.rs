//! Composite routing metadata attached to request frames.

pub mod composite;
pub mod mime;
pub mod routing;

pub use composite::CompositeMetadata;
pub use mime::{MAX_CUSTOM_MIME_LENGTH, MimeType, WellKnownMimeType};
pub use routing::{MAX_TAG_LENGTH, RoutingTags};

#[cfg(test)]
mod tests;
