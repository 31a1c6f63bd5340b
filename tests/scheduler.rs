//! Tests for the periodic burst scheduler.
//!
//! Runs the scheduler against in-memory connections with paused time and
//! checks the frames that reach the peer.

use std::time::Duration;

use flowprobe::{
    BurstConfig,
    BurstScheduler,
    CborSerializer,
    PayloadSerializer,
    FlowError,
    Request,
    SetupFrame,
    frame::{FrameType, MAX_STREAM_ID, StreamIdSequence},
    metadata::WellKnownMimeType,
};
use flowprobe_testing::{
    FailingSerializer,
    capture_run,
    capture_run_with_capacity,
    decode_frames,
    headers,
    request_stream_ids,
    small_request,
};
use rstest::rstest;
use tokio::io::{AsyncReadExt, duplex};
use tokio_util::sync::CancellationToken;

fn scheduler<P: PayloadSerializer>(
    config: BurstConfig,
    serializer: P,
    request: Request,
) -> BurstScheduler<P> {
    BurstScheduler::new(config, SetupFrame::composite_cbor(), serializer, request)
        .expect("valid scheduler")
}

fn expected_ids(count: u32) -> Vec<u32> { (0..count).map(|i| 2 * i + 1).collect() }

#[rstest]
#[tokio::test(start_paused = true)]
async fn ten_ticks_write_three_thousand_requests(small_request: Request) {
    let config = BurstConfig {
        max_ticks: Some(10),
        ..BurstConfig::default()
    };
    let (result, bytes) = capture_run(
        scheduler(config, CborSerializer, small_request),
        CancellationToken::new(),
    )
    .await;
    let stats = result.expect("scheduler run");
    assert_eq!(stats.ticks, 10);
    assert_eq!(stats.frames, 3000);
    assert_eq!(stats.last_stream_id, Some(5999));

    let frames = decode_frames(&bytes).expect("whole frames");
    assert_eq!(frames.len(), 3001);
    assert_eq!(request_stream_ids(&frames), expected_ids(3000));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn setup_frame_is_written_first(small_request: Request) {
    let config = BurstConfig {
        max_ticks: Some(1),
        ..BurstConfig::default()
    };
    let (result, bytes) = capture_run(
        scheduler(config, CborSerializer, small_request),
        CancellationToken::new(),
    )
    .await;
    result.expect("scheduler run");

    assert_eq!(&bytes[..3], &[0x00, 0x00, 75]);
    let frames = decode_frames(&bytes).expect("whole frames");
    let headers = headers(&frames);
    assert_eq!(headers[0].frame_type, FrameType::Setup);
    assert_eq!(headers[0].stream_id, 0);
    assert!(
        headers[1..]
            .iter()
            .all(|header| header.frame_type == FrameType::RequestResponse && header.has_metadata())
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn one_second_of_ticks_writes_ten_bursts(small_request: Request) {
    let stop = CancellationToken::new();
    let stopper = stop.clone();
    let run = capture_run(
        scheduler(BurstConfig::default(), CborSerializer, small_request),
        stop,
    );
    let ((result, bytes), ()) = tokio::join!(run, async move {
        tokio::time::sleep(Duration::from_millis(950)).await;
        stopper.cancel();
    });
    let stats = result.expect("scheduler run");
    assert_eq!(stats.ticks, 10);

    let frames = decode_frames(&bytes).expect("whole frames");
    assert_eq!(request_stream_ids(&frames), expected_ids(3000));
}

#[tokio::test(start_paused = true)]
async fn encode_failure_closes_connection_after_whole_frames() {
    let config = BurstConfig {
        burst_size: 10,
        ..BurstConfig::default()
    };
    let (result, bytes) = capture_run(
        scheduler(config, FailingSerializer::after(5), Request::new("unused")),
        CancellationToken::new(),
    )
    .await;
    assert!(matches!(result, Err(FlowError::Encode(_))));

    let frames = decode_frames(&bytes).expect("no partial frame on the wire");
    assert_eq!(request_stream_ids(&frames), expected_ids(5));
}

#[tokio::test(start_paused = true)]
async fn full_pipe_forces_a_flush_per_large_frame() {
    let config = BurstConfig {
        burst_size: 50,
        max_ticks: Some(2),
        backpressure_boundary: 1024,
        ..BurstConfig::default()
    };
    let (result, bytes) = capture_run_with_capacity(
        scheduler(config, CborSerializer, Request::overflow(100)),
        CancellationToken::new(),
        256,
    )
    .await;
    let stats = result.expect("scheduler run");
    assert_eq!(stats.frames, 100);
    assert_eq!(stats.forced_flushes, 100);

    let frames = decode_frames(&bytes).expect("whole frames");
    assert_eq!(request_stream_ids(&frames), expected_ids(100));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stream_ids_wrap_to_one(small_request: Request) {
    let config = BurstConfig {
        burst_size: 4,
        max_ticks: Some(1),
        ..BurstConfig::default()
    };
    let scheduler = scheduler(config, CborSerializer, small_request)
        .with_stream_ids(StreamIdSequence::starting_at(MAX_STREAM_ID - 2));
    let (result, bytes) = capture_run(scheduler, CancellationToken::new()).await;
    result.expect("scheduler run");

    let frames = decode_frames(&bytes).expect("whole frames");
    assert_eq!(request_stream_ids(&frames), [MAX_STREAM_ID - 2, MAX_STREAM_ID, 1, 3]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_releases_a_peer_that_never_reads() {
    let (client, _stalled) = duplex(1024);
    let stop = CancellationToken::new();
    let stopper = stop.clone();
    let config = BurstConfig {
        backpressure_boundary: 1024,
        ..BurstConfig::default()
    };
    let run = scheduler(config, CborSerializer, Request::overflow(10)).run_on(client, stop);
    let (result, ()) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(3), run),
        async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        }
    );
    let stats = result
        .expect("scheduler returns after cancellation")
        .expect("cancellation is not an error");
    assert_eq!(stats.ticks, 0);
    assert!(stats.frames < 300);
}

#[tokio::test(start_paused = true)]
async fn setup_advertises_the_serializer_data_mime() {
    let config = BurstConfig {
        max_ticks: Some(1),
        burst_size: 1,
        ..BurstConfig::default()
    };
    let (client, mut server) = duplex(4096);
    let result = scheduler(config, FailingSerializer::after(1), Request::new("unused"))
        .run_on(client, CancellationToken::new())
        .await;
    result.expect("scheduler run");

    let mut bytes = Vec::new();
    server.read_to_end(&mut bytes).await.expect("read frames");
    let frames = decode_frames(&bytes).expect("whole frames");
    let data_mime = WellKnownMimeType::ApplicationOctetStream.as_str().as_bytes();
    assert!(frames[0].ends_with(data_mime));
}
