use super::test_helpers::{CURL_LINE, at, event};
use crate::conf::MonitorConfig;
use crate::ingest::LineSource;
use crate::pipeline::{
    AlertState, DisplayLimits, Pipeline, SeriesQuery, SeriesTotals, Subscribers, spawn_pipeline,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};

fn config(threshold: f64, window: usize) -> MonitorConfig {
    MonitorConfig {
        bucket_width_ms: 2_000,
        alert_threshold: threshold,
        alert_window: window,
        display_average_window: window,
        ..MonitorConfig::default()
    }
}

fn limits() -> watch::Receiver<DisplayLimits> {
    watch::channel(DisplayLimits {
        top_n: 10,
        history_width: 10,
    })
    .1
}

fn pipeline(cfg: &MonitorConfig) -> (Pipeline, Subscribers) {
    Pipeline::new(cfg, limits())
}

//-----------------------------------------------------------------------------
// Flush cycle
//-----------------------------------------------------------------------------

#[test]
fn close_window_appends_one_bucket() {
    // Arrange
    let (mut pipeline, mut subs) = pipeline(&config(400.0, 60));
    pipeline.record(&event("10.0.0.1", "report", 200, 10));
    pipeline.record(&event("10.0.0.1", "report", 200, 10));

    // Act
    let first = pipeline.close_window(at(2));
    let second = pipeline.close_window(at(4));

    // Assert
    assert_eq!(first.hits, 2);
    assert_eq!(second.hits, 0);
    assert_eq!(pipeline.series().len(), 2);
    assert_eq!(pipeline.series().total_hits(), 2);
    assert_eq!(subs.summary.try_recv().unwrap().hits, 2);
    assert_eq!(subs.summary.try_recv().unwrap().hits, 0);
}

#[test]
fn bucket_time_never_goes_backwards() {
    let (mut pipeline, _subs) = pipeline(&config(400.0, 60));

    pipeline.close_window(at(10));
    let stepped_back = pipeline.close_window(at(5));

    assert_eq!(stepped_back.closed_at, at(10));
}

#[test]
fn alert_raises_and_clears_across_cycles() {
    // Arrange
    let (mut pipeline, mut subs) = pipeline(&config(1.0, 2));

    // Act
    pipeline.record(&event("10.0.0.1", "report", 200, 1));
    pipeline.record(&event("10.0.0.1", "report", 200, 1));
    pipeline.record(&event("10.0.0.1", "report", 200, 1));
    pipeline.close_window(at(2));
    let raised = pipeline.alert_state();
    pipeline.close_window(at(4));
    pipeline.close_window(at(6));

    // Assert
    assert_eq!(raised, AlertState::Raised);
    assert_eq!(pipeline.alert_state(), AlertState::Cleared);
    let states: Vec<AlertState> = std::iter::from_fn(|| subs.alerts.try_recv().ok())
        .map(|n| n.state)
        .collect();
    assert_eq!(states, vec![AlertState::Raised, AlertState::Cleared]);
}

//-----------------------------------------------------------------------------
// Aggregation task
//-----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn flushes_on_every_tick_even_without_traffic() {
    // Arrange
    let (pipeline, mut subs) = pipeline(&config(400.0, 60));
    let (events_tx, events_rx) = mpsc::channel(16);
    let (_query_tx, query_rx) = mpsc::channel(4);
    let task = tokio::spawn(pipeline.run(events_rx, query_rx));

    // Act
    for _ in 0..3 {
        events_tx
            .send(event("10.0.0.1", "report", 200, 5))
            .await
            .unwrap();
    }
    let first = subs.summary.recv().await.unwrap();
    let second = subs.summary.recv().await.unwrap();

    // Assert
    assert_eq!(first.hits, 3);
    assert_eq!(first.bytes, 15);
    assert_eq!(second.hits, 0);
    assert!(first.closed_at <= second.closed_at);

    drop(events_tx);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn closed_event_stream_flushes_and_stops() {
    // Arrange
    let (pipeline, mut subs) = pipeline(&config(400.0, 60));
    let (events_tx, events_rx) = mpsc::channel(16);
    let (_query_tx, query_rx) = mpsc::channel(4);
    let task = tokio::spawn(pipeline.run(events_rx, query_rx));

    // Act
    events_tx
        .send(event("10.0.0.1", "report", 200, 5))
        .await
        .unwrap();
    drop(events_tx);
    task.await.unwrap();

    // Assert
    assert_eq!(subs.summary.recv().await.unwrap().hits, 1);
    assert!(subs.summary.recv().await.is_none());
    assert!(subs.alerts.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn malformed_line_is_dropped_and_ingestion_continues() {
    // Arrange
    let cfg = config(400.0, 60);
    let (lines_tx, lines_rx) = mpsc::channel::<String>(16);
    let source: Box<dyn LineSource> = Box::new(lines_rx);
    let mut running = spawn_pipeline(&cfg, source, limits()).unwrap();

    // Act
    lines_tx.send("not a log line".to_string()).await.unwrap();
    lines_tx.send(CURL_LINE.to_string()).await.unwrap();
    lines_tx.send(CURL_LINE.to_string()).await.unwrap();
    let summary = running.subscribers.summary.recv().await.unwrap();

    // Assert
    assert_eq!(summary.hits, 2);
    assert_eq!(running.subscribers.lines.recv().await.as_deref(), Some(CURL_LINE));
    assert_eq!(running.subscribers.lines.recv().await.as_deref(), Some(CURL_LINE));
    assert_eq!(summary.bytes, 2468);
    assert_eq!(
        running.series.totals().await,
        Some(SeriesTotals {
            buckets: 1,
            total_hits: 2,
            total_bytes: 2468,
            pending_hits: 0,
            alert: AlertState::Cleared,
        })
    );
    assert_eq!(running.series.last_bucket().await.unwrap().hits, 2);

    drop(lines_tx);
    let stats = running.producer.await.unwrap().unwrap();
    assert_eq!(stats.lines, 3);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.malformed, 1);

    running.aggregator.await.unwrap();
    assert_eq!(running.series.totals().await, None);
    assert_eq!(running.subscribers.lines.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn sustained_load_raises_one_alert() {
    // Arrange
    let cfg = config(400.0, 60);
    let (pipeline, mut subs) = pipeline(&cfg);
    let (events_tx, events_rx) = mpsc::channel(1024);
    let (_query_tx, query_rx) = mpsc::channel(4);
    let task = tokio::spawn(pipeline.run(events_rx, query_rx));

    // Act
    for _ in 0..200 {
        for _ in 0..401 {
            events_tx
                .send(event("10.0.0.1", "report", 200, 1))
                .await
                .unwrap();
        }
        let view = subs.averages.recv().await.unwrap();
        assert_eq!(view.avg_hits, 401.0);
    }
    drop(events_tx);
    task.await.unwrap();

    // Assert
    let raised = subs.alerts.recv().await.unwrap();
    assert_eq!(raised.state, AlertState::Raised);
    assert_eq!(raised.average, 401.0);
    assert!(subs.alerts.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn query_answers_without_closing_a_window() {
    let (pipeline, _subs) = pipeline(&config(400.0, 60));
    let (events_tx, events_rx) = mpsc::channel(16);
    let (query_tx, query_rx) = mpsc::channel(4);
    let task = tokio::spawn(pipeline.run(events_rx, query_rx));

    events_tx
        .send(event("10.0.0.1", "report", 200, 5))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let (reply, rx) = oneshot::channel();
    query_tx
        .send(SeriesQuery::Totals(reply))
        .await
        .unwrap();
    let totals = rx.await.unwrap();

    assert_eq!(totals.buckets, 0);
    assert_eq!(totals.pending_hits, 1);

    drop(events_tx);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn queries_are_answered_ahead_of_queued_events() {
    // Arrange
    let (pipeline, _subs) = pipeline(&config(400.0, 60));
    let (events_tx, events_rx) = mpsc::channel(1024);
    let (query_tx, query_rx) = mpsc::channel(4);
    for _ in 0..500 {
        events_tx
            .send(event("10.0.0.1", "report", 200, 1))
            .await
            .unwrap();
    }
    let (reply, rx) = oneshot::channel();
    query_tx.send(SeriesQuery::Totals(reply)).await.unwrap();

    // Act
    let task = tokio::spawn(pipeline.run(events_rx, query_rx));
    let totals = rx.await.unwrap();

    // Assert
    assert_eq!(totals.pending_hits, 0);

    drop(events_tx);
    task.await.unwrap();
}
