// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end behavior of the collector: merge semantics, the flush
//! lifecycle, and error propagation.

use std::sync::Arc;
use std::time::Duration;

use metron::test_util::TestTransport;
use metron::{MetricCollector, MetricsError, Observation, Unit};

fn collector_with(transport: Arc<TestTransport>) -> MetricCollector {
    MetricCollector::builder("MyService")
        .transport(transport)
        .build()
        .unwrap()
}

#[test]
fn construction_rejects_an_empty_namespace() {
    let err = MetricCollector::builder("")
        .transport(Arc::new(TestTransport::new()))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("namespace"));
}

#[test]
fn observations_sharing_a_key_merge_into_one_record() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    for value in [1.0, 2.0, 3.0] {
        collector
            .add_metric(Observation::new("eventCount", value).dimension("eventName", "signIn"))
            .unwrap();
    }

    let records = collector.get_metrics();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "eventCount");
    assert_eq!(records[0].values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn distinct_dimension_values_keep_distinct_records() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    collector
        .add_metrics(vec![
            Observation::new("eventCount", 1.0).dimension("eventName", "signIn"),
            Observation::new("eventCount", 1.0).dimension("eventName", "signOut"),
            Observation::new("errorCount", 1.0),
        ])
        .unwrap();

    let records = collector.get_metrics();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].dimensions[0].value, "signIn");
    assert_eq!(records[1].dimensions[0].value, "signOut");
    assert_eq!(records[2].name, "errorCount");
}

// The identity key is built from dimension values only. Pinned so nobody
// "fixes" it without revisiting the callers that rely on it.
#[test]
fn dimension_names_are_not_part_of_the_identity() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    collector
        .add_metric(Observation::new("eventCount", 1.0).dimension("eventName", "signIn"))
        .unwrap()
        .add_metric(Observation::new("eventCount", 2.0).dimension("operation", "signIn"))
        .unwrap();

    let records = collector.get_metrics();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].values, vec![1.0, 2.0]);
    // Metadata stays as the first observation supplied it.
    assert_eq!(records[0].dimensions[0].name, "eventName");
}

#[test]
fn merges_keep_the_first_observations_metadata() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    collector
        .add_metric(Observation::new("latency", 10.0).unit(Unit::Milliseconds))
        .unwrap()
        .add_metric(Observation::new("latency", 20.0).unit(Unit::Count))
        .unwrap();

    let records = collector.get_metrics();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].unit, Some(Unit::Milliseconds));
}

#[test]
fn sampled_observations_extend_the_record() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    collector
        .add_metric(Observation::new("latency", 5.0))
        .unwrap()
        .add_metric(Observation::new("latency", vec![7.0, 9.0]))
        .unwrap();

    assert_eq!(collector.get_metrics()[0].values, vec![5.0, 7.0, 9.0]);
}

#[test]
fn add_rejects_empty_input() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    assert!(collector.add_metrics(vec![]).is_err());
    assert!(collector.add_metric(Observation::new("", 1.0)).is_err());
    assert!(
        collector
            .add_metric(Observation::new("latency", Vec::<f64>::new()))
            .is_err()
    );
    // A rejected batch inserts nothing, even when only one member is bad.
    assert!(
        collector
            .add_metrics(vec![
                Observation::new("eventCount", 1.0),
                Observation::new("", 1.0),
            ])
            .is_err()
    );
    assert!(collector.get_metrics().is_empty());
}

#[test]
fn clear_metrics_empties_the_map() {
    let collector = collector_with(Arc::new(TestTransport::new()));
    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();
    assert!(collector.clear_metrics().get_metrics().is_empty());
}

#[tokio::test]
async fn flush_submits_the_expected_wire_shape_and_clears() {
    let transport = Arc::new(TestTransport::new());
    let collector = collector_with(transport.clone());
    collector
        .add_metric(Observation::new("eventCount", 1.0).dimension("eventName", "X"))
        .unwrap();

    collector.flush().await.unwrap();

    let batches = transport.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].namespace, "MyService");
    assert_eq!(batches[0].metric_data.len(), 1);
    let datum = &batches[0].metric_data[0];
    assert_eq!(datum.metric_name, "eventCount");
    assert_eq!(datum.dimensions.len(), 1);
    assert_eq!(datum.dimensions[0].name, "eventName");
    assert_eq!(datum.dimensions[0].value, "X");
    assert_eq!(datum.value, Some(1.0));
    assert_eq!(datum.statistic_values, None);

    assert!(collector.get_metrics().is_empty());
}

#[tokio::test]
async fn flushing_nothing_never_contacts_the_transport() {
    let transport = Arc::new(TestTransport::new());
    let collector = collector_with(transport.clone());
    collector.flush().await.unwrap();
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn transport_failure_surfaces_and_the_cycle_is_dropped() {
    let transport = Arc::new(TestTransport::failing_after(0));
    let collector = collector_with(transport.clone());
    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();

    let err = collector.flush().await.unwrap_err();
    assert!(matches!(err, MetricsError::Transport(_)));
    // The records were cleared before delivery began; the failed cycle's
    // data is gone by design.
    assert!(collector.get_metrics().is_empty());
}

#[tokio::test]
async fn stop_on_a_manual_collector_is_a_no_op() {
    let transport = Arc::new(TestTransport::new());
    let collector = collector_with(transport.clone());
    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();

    collector.stop().await.unwrap();
    collector.stop().await.unwrap();

    // A manual collector starts in the stopped state, so stop never runs
    // the final flush.
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn automatic_collection_flushes_on_the_interval() {
    let transport = Arc::new(TestTransport::new());
    let collector = MetricCollector::builder("MyService")
        .automatic(true)
        .flush_interval(Duration::from_millis(100))
        .transport(transport.clone())
        .build()
        .unwrap();

    collector
        .add_metric(Observation::new("eventCount", 1.0).unit(Unit::Count))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(550)).await;

    assert!(transport.batch_count() >= 1, "no automatic flush fired");
    assert_eq!(transport.batches()[0].metric_data[0].metric_name, "eventCount");
    assert!(collector.get_metrics().is_empty());

    collector.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_timer_and_flushes_once_more() {
    let transport = Arc::new(TestTransport::new());
    let collector = MetricCollector::builder("MyService")
        .automatic(true)
        .flush_interval(Duration::from_millis(100))
        .transport(transport.clone())
        .build()
        .unwrap();

    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();
    collector.stop().await.unwrap();
    let delivered = transport.batch_count();
    assert!(delivered >= 1, "stop skipped the final flush");

    // Stopped means stopped: no timer survives to fire again.
    collector
        .add_metric(Observation::new("eventCount", 2.0))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(transport.batch_count(), delivered);

    // And the second stop is a no-op, leaving the new observation buffered.
    collector.stop().await.unwrap();
    assert_eq!(transport.batch_count(), delivered);
    assert_eq!(collector.get_metrics().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn manual_flush_reschedules_the_timer() {
    let transport = Arc::new(TestTransport::new());
    let collector = MetricCollector::builder("MyService")
        .automatic(true)
        .flush_interval(Duration::from_millis(100))
        .transport(transport.clone())
        .build()
        .unwrap();

    // Flush manually just before the timer would fire; the rearm inside
    // flush discards the pending timer instead of stacking a second one.
    tokio::time::sleep(Duration::from_millis(90)).await;
    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();
    collector.flush().await.unwrap();
    assert_eq!(transport.batch_count(), 1);

    // The old timer would have fired at t=100ms; nothing happens there.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.batch_count(), 1);

    // The rescheduled timer fires a full interval after the manual flush.
    collector
        .add_metric(Observation::new("eventCount", 2.0))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(transport.batch_count(), 2);

    collector.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn scheduled_flush_failures_do_not_kill_the_timer() {
    let transport = Arc::new(TestTransport::failing_after(0));
    let collector = MetricCollector::builder("MyService")
        .automatic(true)
        .flush_interval(Duration::from_millis(100))
        .transport(transport.clone())
        .build()
        .unwrap();

    collector
        .add_metric(Observation::new("eventCount", 1.0))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    // The failed delivery was absorbed by the timer task and the timer kept
    // rearming: later cycles still attempt delivery.
    collector
        .add_metric(Observation::new("eventCount", 2.0))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(transport.calls() >= 2);

    let err = collector.stop().await;
    // The final flush had nothing buffered, so stop itself succeeds.
    assert!(err.is_ok());
}
