//! Command line interface for the `flowprobe` binary.
//!
//! Kept free of crate dependencies so the build script can render the man
//! page from it.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

/// Command line arguments for the `flowprobe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "flowprobe",
    version,
    about = "Flow-control client flooding a reactive peer with requests"
)]
pub struct Cli {
    /// Scenario to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Scenarios understood by the client.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Connect to a peer and write request bursts regardless of its demand.
    Flood(FloodArgs),
    /// Pair the payload source with a demand-regulating consumer in-process.
    Channel(ChannelArgs),
}

/// Arguments for the `flood` scenario.
#[derive(Debug, Args)]
pub struct FloodArgs {
    /// Peer address.
    #[arg(short, long, default_value = "127.0.0.1:7000")]
    pub address: SocketAddr,
    /// Requests written per tick.
    #[arg(long, default_value_t = 300)]
    pub burst_size: usize,
    /// Milliseconds between bursts.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub period_ms: u64,
    /// Stop after this many ticks instead of running until interrupted.
    #[arg(long)]
    pub ticks: Option<u64>,
    /// Routing tag naming the remote operation.
    #[arg(long, default_value = "response")]
    pub route: String,
    /// Copies of the overflow text in each request message.
    #[arg(long, default_value_t = 1000)]
    pub message_repeat: usize,
    /// Buffered bytes that force a flush.
    #[arg(long, default_value_t = 64 * 1024)]
    pub backpressure_boundary: usize,
    /// Socket send buffer size in bytes.
    #[arg(long)]
    pub send_buffer: Option<u32>,
    /// Disable Nagle's algorithm.
    #[arg(long)]
    pub nodelay: bool,
    /// Drain and count inbound frames instead of leaving them unread.
    #[arg(long)]
    pub read_responses: bool,
}

/// Arguments for the `channel` scenario.
#[derive(Debug, Args)]
pub struct ChannelArgs {
    /// Initial demand window of the windowed consumer.
    #[arg(long, default_value_t = 7777, value_parser = clap::value_parser!(u32).range(2..))]
    pub window: u32,
    /// Complete the channel after this many values.
    #[arg(long)]
    pub values: Option<usize>,
    /// Fail the channel after this many values.
    #[arg(long)]
    pub fail_after: Option<usize>,
    /// Use the slow consumer requesting a fixed batch per interval.
    #[arg(long)]
    pub paced: bool,
    /// Values requested per tick by the slow consumer.
    #[arg(long, default_value_t = 5)]
    pub batch: u64,
    /// Milliseconds between requests of the slow consumer.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,
    /// Copies of the overflow text in the repeated message.
    #[arg(long, default_value_t = 1000)]
    pub message_repeat: usize,
}
