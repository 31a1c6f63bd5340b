#![cfg(feature = "metrics")]
//! Tests for `flowprobe` metrics helpers.
//!
//! These tests verify that counters update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
use flowprobe::{
    flow::{DemandSink, WindowSubscriber, demand_channel},
    metrics::{self as counters, FrameKind},
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(k, _, _, _)| {
            k.key().name() == name
                && label.is_none_or(|(key, value)| {
                    k.key()
                        .labels()
                        .any(|l| l.key() == key && l.value() == value)
                })
        })
        .map(|(_, _, _, v)| match v {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[rstest]
#[case(FrameKind::Setup, "setup")]
#[case(FrameKind::Request, "request")]
fn frame_metric_is_labelled_by_kind(#[case] kind: FrameKind, #[case] label: &str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || counters::inc_frames(kind));
    assert_eq!(
        counter(&snapshotter, counters::FRAMES_SENT, Some(("kind", label))),
        1
    );
}

#[test]
fn forced_flush_metric_increments() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        counters::inc_forced_flushes();
        counters::inc_forced_flushes();
    });
    assert_eq!(counter(&snapshotter, counters::FORCED_FLUSHES, None), 2);
}

#[test]
fn demand_metric_counts_units_not_signals() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (mut handle, _receiver) = demand_channel();
    metrics::with_local_recorder(&recorder, || {
        handle.request(5);
        handle.request(0);
        handle.request(7);
    });
    assert_eq!(counter(&snapshotter, counters::DEMAND_REQUESTED, None), 12);
}

#[test]
fn window_replenishment_is_recorded() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (handle, _receiver) = demand_channel();
    metrics::with_local_recorder(&recorder, || {
        let mut subscriber = WindowSubscriber::new(4, handle);
        subscriber.on_subscribe();
        for _ in 0..6 {
            subscriber.on_next();
        }
    });
    assert_eq!(counter(&snapshotter, counters::WINDOW_REPLENISHED, None), 2);
    assert_eq!(counter(&snapshotter, counters::DEMAND_REQUESTED, None), 12);
}
