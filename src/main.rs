//! `flowprobe` binary: floods a peer with requests or exercises the demand
//! consumers in-process.

mod cli;

use std::{process::ExitCode, time::Duration};

use clap::Parser;
use cli::{ChannelArgs, Cli, Command, FloodArgs};
use flowprobe::{
    client::SocketOptions,
    config::{ChannelConfig, Consumer, FloodConfig},
    payload::Request,
    scenario::{self, ChannelReport},
    scheduler::BurstConfig,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn flood_settings(args: FloodArgs) -> FloodConfig {
    let mut socket = SocketOptions::default();
    if args.nodelay {
        socket = socket.nodelay(true);
    }
    if let Some(size) = args.send_buffer {
        socket = socket.send_buffer_size(size);
    }
    FloodConfig::default()
        .address(args.address)
        .socket(socket)
        .burst(BurstConfig {
            period: Duration::from_millis(args.period_ms),
            burst_size: args.burst_size,
            route: args.route,
            max_ticks: args.ticks,
            backpressure_boundary: args.backpressure_boundary,
        })
        .message_repeat(args.message_repeat)
        .read_responses(args.read_responses)
}

fn channel_config(args: ChannelArgs) -> ChannelConfig {
    let consumer = if args.paced {
        Consumer::Paced {
            batch: args.batch,
            interval: Duration::from_millis(args.interval_ms),
        }
    } else {
        Consumer::Window {
            window: args.window,
        }
    };
    ChannelConfig {
        consumer,
        values: args.values,
        fail_after: args.fail_after,
        request: Request::overflow(args.message_repeat),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let stop = CancellationToken::new();
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted; stopping");
            interrupt.cancel();
        }
    });

    let outcome = match cli.command {
        Command::Flood(args) => scenario::run_flood(&flood_settings(args), stop)
            .await
            .map(|report| {
                info!(
                    ticks = report.burst.ticks,
                    frames = report.burst.frames,
                    forced_flushes = report.burst.forced_flushes,
                    inbound_frames = report.inbound.map(|stats| stats.frames),
                    "flood finished"
                );
            }),
        Command::Channel(args) => scenario::run_channel(&channel_config(args), stop)
            .await
            .map(|report| match report {
                ChannelReport::Window(stats) => info!(received = stats.received, "channel finished"),
                ChannelReport::Paced(stats) => info!(received = stats.received, "channel finished"),
            }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}
