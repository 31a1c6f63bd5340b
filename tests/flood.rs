//! Tests for flood runs over TCP and for draining inbound frames.

use std::time::Duration;

use bytes::{BufMut, BytesMut};
use flowprobe::{
    BurstConfig,
    FloodConfig,
    FlowError,
    client::drain_inbound,
    frame::{FrameHeader, FrameType, put_length_prefixed},
    scenario::run_flood,
};
use flowprobe_testing::{decode_frames, request_stream_ids};
use rstest::rstest;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, duplex},
    net::TcpListener,
};
use tokio_util::sync::CancellationToken;

fn frame(stream_id: u32, frame_type: FrameType, data: &[u8], dst: &mut BytesMut) {
    let mut body = BytesMut::new();
    FrameHeader::new(stream_id, frame_type, 0).encode(&mut body);
    body.put_slice(data);
    put_length_prefixed(&body, dst).expect("frame fits");
}

fn flood_config(addr: std::net::SocketAddr, ticks: u64) -> FloodConfig {
    FloodConfig::default()
        .address(addr)
        .message_repeat(2)
        .burst(BurstConfig {
            burst_size: 10,
            period: Duration::from_millis(20),
            max_ticks: Some(ticks),
            ..BurstConfig::default()
        })
}

#[tokio::test]
async fn flood_writes_setup_then_bursts_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut received = Vec::new();
        stream.read_to_end(&mut received).await.expect("read flood");
        received
    });

    let report = run_flood(&flood_config(addr, 2), CancellationToken::new())
        .await
        .expect("flood run");
    assert_eq!(report.burst.frames, 20);
    assert_eq!(report.inbound, None);

    let received = peer.await.expect("peer task");
    let frames = decode_frames(&received).expect("whole frames");
    assert_eq!(frames.len(), 21);
    assert_eq!(request_stream_ids(&frames), (0..20).map(|i| 2 * i + 1).collect::<Vec<_>>());
}

#[tokio::test]
async fn flood_drains_responses_when_asked() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (mut reader, mut writer) = stream.into_split();
        let mut responses = BytesMut::new();
        frame(1, FrameType::Payload, b"pong", &mut responses);
        frame(3, FrameType::Error, b"overloaded", &mut responses);
        writer.write_all(&responses).await.expect("write responses");
        let mut received = Vec::new();
        reader.read_to_end(&mut received).await.expect("read flood");
    });

    let config = flood_config(addr, 10).read_responses(true);
    let report = run_flood(&config, CancellationToken::new())
        .await
        .expect("flood run");
    let inbound = report.inbound.expect("inbound stats");
    assert_eq!(inbound.frames, 2);
    assert_eq!(inbound.payloads, 1);
    assert_eq!(inbound.errors, 1);
    peer.await.expect("peer task");
}

#[tokio::test]
async fn flood_fails_when_nothing_listens() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);

    let result = run_flood(&flood_config(addr, 1), CancellationToken::new()).await;
    assert!(matches!(result, Err(FlowError::Io(_))));
}

#[tokio::test]
async fn drain_counts_frames_by_type() {
    let (mut peer, client) = duplex(1024);
    let mut inbound = BytesMut::new();
    frame(1, FrameType::Payload, b"a", &mut inbound);
    frame(3, FrameType::Payload, b"b", &mut inbound);
    frame(5, FrameType::Error, b"c", &mut inbound);
    frame(0, FrameType::KeepAlive, &[0; 8], &mut inbound);
    put_length_prefixed(&[0xFF, 0xFF], &mut inbound).expect("short frame");
    peer.write_all(&inbound).await.expect("write frames");
    drop(peer);

    let stats = drain_inbound(client, CancellationToken::new())
        .await
        .expect("drain");
    assert_eq!(stats.frames, 5);
    assert_eq!(stats.payloads, 2);
    assert_eq!(stats.errors, 1);
}

#[rstest]
#[case::mid_header(&[0x00, 0x00][..])]
#[case::mid_frame(&[0x00, 0x00, 0x0A, 0x00, 0x00][..])]
#[tokio::test]
async fn drain_reports_truncated_input(#[case] bytes: &'static [u8]) {
    let (mut peer, client) = duplex(64);
    peer.write_all(bytes).await.expect("write bytes");
    drop(peer);

    let result = drain_inbound(client, CancellationToken::new()).await;
    assert!(matches!(result, Err(FlowError::Io(_))));
}

#[tokio::test]
async fn cancelled_drain_returns_immediately() {
    let (_peer, client) = duplex(64);
    let stop = CancellationToken::new();
    stop.cancel();
    let stats = drain_inbound(client, stop).await.expect("drain");
    assert_eq!(stats.frames, 0);
}
