//! Run configuration.
//!
//! [`FloodConfig`] describes a flood run against a remote peer and
//! [`ChannelConfig`] an in-process run of the payload source against one of
//! the demand-regulating consumers. Both carry the defaults the client was
//! designed around; the CLI only overrides what it is given.

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    time::Duration,
};

use crate::{
    client::SocketOptions,
    flow::{DEFAULT_WINDOW, paced},
    frame::{DEFAULT_KEEPALIVE_INTERVAL, DEFAULT_MAX_LIFETIME, FrameError, SetupFrame},
    metadata::WellKnownMimeType,
    payload::{DEFAULT_OVERFLOW_REPEAT, Request},
    scheduler::BurstConfig,
};

/// Peer address used when none is configured.
pub const DEFAULT_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7000));

/// Settings for a flood run.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use flowprobe::config::FloodConfig;
///
/// let config = FloodConfig::default()
///     .message_repeat(10)
///     .keepalive_interval(Duration::from_secs(5));
/// assert_eq!(config.request().message.len(), 170);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloodConfig {
    address: SocketAddr,
    socket: SocketOptions,
    burst: BurstConfig,
    keepalive_interval: Duration,
    max_lifetime: Duration,
    metadata_mime: String,
    message_repeat: usize,
    read_responses: bool,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            socket: SocketOptions::default(),
            burst: BurstConfig::default(),
            keepalive_interval: DEFAULT_KEEPALIVE_INTERVAL,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            metadata_mime: WellKnownMimeType::CompositeMetadata.as_str().to_owned(),
            message_repeat: DEFAULT_OVERFLOW_REPEAT,
            read_responses: false,
        }
    }
}

impl FloodConfig {
    /// Peer to connect to.
    #[must_use]
    pub fn address(mut self, address: SocketAddr) -> Self {
        self.address = address;
        self
    }

    /// Socket options applied before connecting.
    #[must_use]
    pub fn socket(mut self, socket: SocketOptions) -> Self {
        self.socket = socket;
        self
    }

    /// Burst scheduler settings.
    #[must_use]
    pub fn burst(mut self, burst: BurstConfig) -> Self {
        self.burst = burst;
        self
    }

    /// Keep-alive interval advertised in the setup frame.
    #[must_use]
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = interval;
        self
    }

    /// Maximum lifetime advertised in the setup frame.
    #[must_use]
    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Metadata mime type advertised in the setup frame.
    #[must_use]
    pub fn metadata_mime(mut self, mime: impl Into<String>) -> Self {
        self.metadata_mime = mime.into();
        self
    }

    /// Copies of the overflow text making up each request message.
    #[must_use]
    pub fn message_repeat(mut self, repeat: usize) -> Self {
        self.message_repeat = repeat;
        self
    }

    /// Drain and count inbound frames instead of leaving them unread.
    #[must_use]
    pub fn read_responses(mut self, enabled: bool) -> Self {
        self.read_responses = enabled;
        self
    }

    /// Configured peer address.
    #[must_use]
    pub fn peer(&self) -> SocketAddr { self.address }

    /// Configured socket options.
    #[must_use]
    pub fn socket_options(&self) -> &SocketOptions { &self.socket }

    /// Configured burst settings.
    #[must_use]
    pub fn burst_config(&self) -> &BurstConfig { &self.burst }

    /// Whether inbound frames are drained.
    #[must_use]
    pub fn reads_responses(&self) -> bool { self.read_responses }

    /// Build the setup frame announcing this configuration with `data` as
    /// the data mime type.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidMime`] if the configured metadata mime
    /// type cannot be encoded.
    pub fn setup_frame(&self, data: WellKnownMimeType) -> Result<SetupFrame, FrameError> {
        Ok(SetupFrame::new(self.metadata_mime.as_str(), data.as_str())?
            .keepalive_interval(self.keepalive_interval)
            .max_lifetime(self.max_lifetime))
    }

    /// Request written on every stream.
    #[must_use]
    pub fn request(&self) -> Request { Request::overflow(self.message_repeat) }
}

/// Consumer paired with the payload source in a channel run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consumer {
    /// Windowed subscriber replenishing `window` values at a time.
    Window {
        /// Initial demand window.
        window: u32,
    },
    /// Slow consumer requesting `batch` values every `interval`.
    Paced {
        /// Values requested per tick.
        batch: u64,
        /// Time between requests.
        interval: Duration,
    },
}

impl Default for Consumer {
    fn default() -> Self {
        Self::Window {
            window: DEFAULT_WINDOW,
        }
    }
}

impl Consumer {
    /// Paced consumer with the default batch and interval.
    #[must_use]
    pub fn paced() -> Self {
        Self::Paced {
            batch: paced::DEFAULT_BATCH,
            interval: paced::DEFAULT_INTERVAL,
        }
    }
}

/// Settings for an in-process channel run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Consumer regulating demand.
    pub consumer: Consumer,
    /// Complete the channel after this many values; `None` runs until
    /// stopped.
    pub values: Option<usize>,
    /// Fail the channel after this many values. Takes precedence over
    /// `values`.
    pub fail_after: Option<usize>,
    /// Request repeated by the source.
    pub request: Request,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            consumer: Consumer::default(),
            values: None,
            fail_after: None,
            request: Request::overflow(DEFAULT_OVERFLOW_REPEAT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    #[test]
    fn default_setup_frame_is_composite_cbor() {
        let built = FloodConfig::default()
            .setup_frame(WellKnownMimeType::ApplicationCbor)
            .expect("valid setup");
        assert_eq!(built, SetupFrame::composite_cbor());
    }

    #[test]
    fn setup_frame_carries_configured_durations() {
        let config = FloodConfig::default()
            .keepalive_interval(Duration::from_secs(1))
            .max_lifetime(Duration::from_secs(2));
        let body = config
            .setup_frame(WellKnownMimeType::ApplicationCbor)
            .expect("valid setup")
            .encode()
            .expect("encode");
        // header, version, then keep-alive and lifetime in milliseconds
        assert_eq!(&body[10..14], &1000u32.to_be_bytes());
        assert_eq!(&body[14..18], &2000u32.to_be_bytes());
    }

    #[test]
    fn invalid_mime_type_is_reported() {
        let config = FloodConfig::default().metadata_mime("");
        assert!(matches!(
            config.setup_frame(WellKnownMimeType::ApplicationCbor),
            Err(FrameError::InvalidMime { .. })
        ));
    }

    #[test]
    fn default_request_is_the_overflow_message() {
        let request = FloodConfig::default().request();
        assert_eq!(request.message.len(), 17 * DEFAULT_OVERFLOW_REPEAT);
        assert!(request.message.starts_with("response-overflow"));
    }
}
