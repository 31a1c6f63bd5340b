#![doc(html_root_url = "https://docs.rs/flowprobe/latest")]
//! Public API for the `flowprobe` library.
//!
//! This crate provides the pieces of a flow-control stress client for reactive
//! binary protocols: a hand-built frame encoder with 3-byte length prefixes,
//! a demand-driven payload source with the consumers that regulate it, and a
//! burst scheduler that floods a peer without regard for its demand.

pub mod byte_order;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod frame;
pub mod metadata;
pub mod metrics;
pub mod payload;
pub mod scenario;
pub mod scheduler;

pub use client::{Connection, SocketOptions};
pub use config::{ChannelConfig, Consumer, FloodConfig};
pub use error::{FlowError, Result};
pub use flow::{DemandSink, PayloadSource, WindowSubscriber};
pub use frame::{Frame, FrameError, LengthPrefixedCodec, RequestFrame, SetupFrame, StreamIdSequence};
pub use payload::{CborSerializer, PayloadSerializer, Request};
pub use scheduler::{BurstConfig, BurstScheduler, BurstStats};
