use crate::conf::{ConfigError, MonitorConfig};
use crate::ingest::LineSource;
use crate::pipeline::aggregator::WindowAggregator;
use crate::pipeline::alert::{AlertMonitor, AlertState};
use crate::pipeline::dispatch::{Dispatcher, DisplayLimits, LineFeed, Subscribers};
use crate::pipeline::parse::EventParser;
use crate::pipeline::series::TimeSeries;
use crate::pipeline::types::{Bucket, Event};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

const QUERY_QUEUE_CAPACITY: usize = 16;

/// Everything the aggregation task owns.
///
/// Built once at startup and moved into the aggregation task; nothing else holds
/// a reference to the series.
pub struct Pipeline {
    bucket_width: Duration,
    aggregator: WindowAggregator,
    series: TimeSeries,
    monitor: AlertMonitor,
    dispatcher: Dispatcher,
}

impl Pipeline {
    pub fn new(cfg: &MonitorConfig, limits: watch::Receiver<DisplayLimits>) -> (Self, Subscribers) {
        let (dispatcher, subscribers) = Dispatcher::new(limits, cfg.display_average_window);

        (
            Self {
                bucket_width: cfg.bucket_width(),
                aggregator: WindowAggregator::new(),
                series: TimeSeries::new(),
                monitor: AlertMonitor::new(cfg.alert_threshold, cfg.alert_window),
                dispatcher,
            },
            subscribers,
        )
    }

    pub fn record(&mut self, event: &Event) {
        self.aggregator.record(event);
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn alert_state(&self) -> AlertState {
        self.monitor.state()
    }

    pub fn line_feed(&self) -> LineFeed {
        self.dispatcher.line_feed()
    }

    /// One flush cycle: flush, append, evaluate the alert, dispatch views.
    pub fn close_window(&mut self, now: DateTime<Local>) -> Arc<Bucket> {
        // Wall clock can step backwards; the series must stay ordered.
        let closed_at = match self.series.last() {
            Ok(last) if last.closed_at > now => last.closed_at,
            _ => now,
        };

        let bucket = self.series.append(self.aggregator.flush(closed_at));
        let alert = self.monitor.evaluate(&self.series, closed_at);

        if let Err(e) = self
            .dispatcher
            .dispatch(&self.series, self.monitor.state(), alert)
        {
            error!(error = %e, "dispatch after append found no bucket");
        }

        debug!(
            hits = bucket.hits,
            bytes = bucket.bytes,
            buckets = self.series.len(),
            "window closed"
        );

        bucket
    }

    fn answer(&self, query: SeriesQuery) {
        // A dropped reply channel just means the caller gave up waiting.
        match query {
            SeriesQuery::Totals(reply) => {
                let _ = reply.send(SeriesTotals {
                    buckets: self.series.len(),
                    total_hits: self.series.total_hits(),
                    total_bytes: self.series.total_bytes(),
                    pending_hits: self.aggregator.pending_hits(),
                    alert: self.monitor.state(),
                });
            }
            SeriesQuery::LastBucket(reply) => {
                let _ = reply.send(self.series.last().ok().cloned());
            }
        }
    }

    /// Aggregation loop. Flushes every `bucket_width` regardless of traffic and
    /// performs a final flush once the event stream closes.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<Event>,
        mut queries: mpsc::Receiver<SeriesQuery>,
    ) {
        let mut flush = tokio::time::interval_at(Instant::now() + self.bucket_width, self.bucket_width);
        flush.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(bucket_width_ms = self.bucket_width.as_millis() as u64, "aggregation started");

        loop {
            tokio::select! {
                biased;

                _ = flush.tick() => {
                    self.close_window(Local::now());
                }

                // Ahead of events so a busy producer cannot starve readers.
                Some(query) = queries.recv() => self.answer(query),

                event = events.recv() => match event {
                    Some(event) => self.record(&event),
                    None => {
                        self.close_window(Local::now());
                        info!(buckets = self.series.len(), "event stream closed");
                        break;
                    }
                },
            }
        }
    }
}

/// Read requests served by the aggregation task.
#[derive(Debug)]
pub enum SeriesQuery {
    Totals(oneshot::Sender<SeriesTotals>),
    LastBucket(oneshot::Sender<Option<Arc<Bucket>>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesTotals {
    pub buckets: usize,
    pub total_hits: u64,
    pub total_bytes: u64,
    /// Hits recorded in the window that has not closed yet.
    pub pending_hits: u64,
    pub alert: AlertState,
}

/// Cloneable handle for querying the series through its owning task.
#[derive(Debug, Clone)]
pub struct SeriesHandle {
    tx: mpsc::Sender<SeriesQuery>,
}

impl SeriesHandle {
    /// `None` once the aggregation task has stopped.
    pub async fn totals(&self) -> Option<SeriesTotals> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SeriesQuery::Totals(reply)).await.ok()?;
        rx.await.ok()
    }

    pub async fn last_bucket(&self) -> Option<Arc<Bucket>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(SeriesQuery::LastBucket(reply)).await.ok()?;
        rx.await.ok().flatten()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub lines: u64,
    pub events: u64,
    pub malformed: u64,
}

/// Producer loop: read lines, parse, hand events to the aggregator and the
/// raw line to the line feed.
///
/// A full queue blocks here rather than dropping a parsed event.
pub async fn run_producer(
    mut source: Box<dyn LineSource>,
    parser: EventParser,
    events: mpsc::Sender<Event>,
    lines: LineFeed,
) -> std::io::Result<IngestStats> {
    let mut stats = IngestStats::default();

    while let Some(line) = source.next_line().await? {
        stats.lines += 1;

        match parser.parse(&line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    debug!("aggregator gone; stopping producer");
                    break;
                }
                stats.events += 1;
                lines.send(line);
            }
            Err(e) => {
                stats.malformed += 1;
                debug!(reason = %e.reason, line = %line, "dropping malformed line");
            }
        }
    }

    info!(
        lines = stats.lines,
        events = stats.events,
        malformed = stats.malformed,
        "line source exhausted"
    );

    Ok(stats)
}

pub struct RunningPipeline {
    pub subscribers: Subscribers,
    pub series: SeriesHandle,
    pub producer: JoinHandle<std::io::Result<IngestStats>>,
    pub aggregator: JoinHandle<()>,
}

/// Wire producer and aggregator tasks on the current Tokio runtime.
pub fn spawn_pipeline(
    cfg: &MonitorConfig,
    source: Box<dyn LineSource>,
    limits: watch::Receiver<DisplayLimits>,
) -> Result<RunningPipeline, ConfigError> {
    let parser = EventParser::new(&cfg.pattern)?;
    let (pipeline, subscribers) = Pipeline::new(cfg, limits);

    let (events_tx, events_rx) = mpsc::channel(cfg.queue_capacity);
    let (query_tx, query_rx) = mpsc::channel(QUERY_QUEUE_CAPACITY);

    let lines = pipeline.line_feed();
    let producer = tokio::spawn(run_producer(source, parser, events_tx, lines));
    let aggregator = tokio::spawn(pipeline.run(events_rx, query_rx));

    Ok(RunningPipeline {
        subscribers,
        series: SeriesHandle { tx: query_tx },
        producer,
        aggregator,
    })
}
