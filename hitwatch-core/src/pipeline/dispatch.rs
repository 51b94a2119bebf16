use crate::pipeline::alert::{AlertNotification, AlertState};
use crate::pipeline::error::EmptySeries;
use crate::pipeline::series::TimeSeries;
use crate::pipeline::types::{Bucket, Dimension, RankedCount};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use tokio::sync::{mpsc, watch};

/// How much the display can show; published by the display task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLimits {
    /// Entries per dimension in the summary view.
    pub top_n: usize,
    /// Buckets in the history (sparkline) view.
    pub history_width: usize,
}

impl DisplayLimits {
    /// Limits for a terminal of the given size, leaving room for the fixed panes.
    pub fn for_terminal(width: u16, height: u16) -> Self {
        Self {
            top_n: usize::from(height).saturating_sub(24).max(1),
            history_width: usize::from(width).saturating_sub(38).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionTop {
    pub dimension: Dimension,
    pub entries: Vec<RankedCount>,
}

/// Top talkers of the latest bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub closed_at: DateTime<Local>,
    pub hits: u64,
    pub bytes: u64,
    pub top: Vec<DimensionTop>,
}

impl SummaryView {
    pub fn from_bucket(bucket: &Bucket, top_n: usize) -> Self {
        Self {
            closed_at: bucket.closed_at,
            hits: bucket.hits,
            bytes: bucket.bytes,
            top: Dimension::ALL
                .into_iter()
                .map(|dimension| DimensionTop {
                    dimension,
                    entries: bucket.ranked(dimension).top(top_n).to_vec(),
                })
                .collect(),
        }
    }

    pub fn top(&self, dimension: Dimension) -> &[RankedCount] {
        self.top
            .iter()
            .find(|t| t.dimension == dimension)
            .map(|t| t.entries.as_slice())
            .unwrap_or(&[])
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.top(Dimension::Section) {
            writeln!(f, " /{} : {}", entry.label, entry.count)?;
        }
        Ok(())
    }
}

/// Recent per-bucket values for sparklines, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryView {
    pub hits: Vec<u64>,
    pub bytes: Vec<u64>,
    pub last_hits: u64,
    pub last_bytes: u64,
}

impl HistoryView {
    pub fn from_series(series: &TimeSeries, width: usize) -> Result<Self, EmptySeries> {
        let last = series.last()?;
        let recent = series.recent(width);

        Ok(Self {
            hits: recent.iter().map(|b| b.hits).collect(),
            bytes: recent.iter().map(|b| b.bytes).collect(),
            last_hits: last.hits,
            last_bytes: last.bytes,
        })
    }
}

/// Running totals and trailing averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragesView {
    pub window: usize,
    pub avg_hits: f64,
    pub avg_bytes: f64,
    pub total_hits: u64,
    pub total_bytes: u64,
    pub buckets: usize,
    pub alert: AlertState,
}

impl AveragesView {
    pub fn from_series(
        series: &TimeSeries,
        window: usize,
        alert: AlertState,
    ) -> Result<Self, EmptySeries> {
        Ok(Self {
            window,
            avg_hits: series.average_hits(window)?,
            avg_bytes: series.average_bytes(window)?,
            total_hits: series.total_hits(),
            total_bytes: series.total_bytes(),
            buckets: series.len(),
            alert,
        })
    }
}

impl fmt::Display for AveragesView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " avg hits: {:.1}   avg bytes: {:.1}",
            self.avg_hits, self.avg_bytes
        )
    }
}

/// Receiving ends handed to the display collaborators, one per view.
#[derive(Debug)]
pub struct Subscribers {
    pub summary: mpsc::UnboundedReceiver<SummaryView>,
    pub history: mpsc::UnboundedReceiver<HistoryView>,
    pub averages: mpsc::UnboundedReceiver<AveragesView>,
    pub alerts: mpsc::UnboundedReceiver<AlertNotification>,
    /// Raw lines that parsed into events, in arrival order.
    pub lines: mpsc::UnboundedReceiver<String>,
}

/// Sending side of the raw line feed, held by the producer.
///
/// Never blocks; lines are discarded once the display is gone.
#[derive(Debug, Clone)]
pub struct LineFeed {
    tx: mpsc::UnboundedSender<String>,
}

impl LineFeed {
    pub fn send(&self, line: String) {
        let _ = self.tx.send(line);
    }
}

struct Outlet<T> {
    name: &'static str,
    tx: mpsc::UnboundedSender<T>,
    closed: bool,
}

impl<T> Outlet<T> {
    fn new(name: &'static str) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name,
                tx,
                closed: false,
            },
            rx,
        )
    }

    // Unbounded send never waits, so a slow subscriber cannot stall the flush loop.
    fn deliver(&mut self, view: T) {
        if self.closed {
            return;
        }
        if self.tx.send(view).is_err() {
            self.closed = true;
            tracing::debug!(subscriber = self.name, "subscriber dropped");
        }
    }
}

/// Fans each cycle's derived views out to the subscribers.
pub struct Dispatcher {
    limits: watch::Receiver<DisplayLimits>,
    average_window: usize,
    summary: Outlet<SummaryView>,
    history: Outlet<HistoryView>,
    averages: Outlet<AveragesView>,
    alerts: Outlet<AlertNotification>,
    lines: LineFeed,
}

impl Dispatcher {
    pub fn new(
        limits: watch::Receiver<DisplayLimits>,
        average_window: usize,
    ) -> (Self, Subscribers) {
        let (summary, summary_rx) = Outlet::new("summary");
        let (history, history_rx) = Outlet::new("history");
        let (averages, averages_rx) = Outlet::new("averages");
        let (alerts, alerts_rx) = Outlet::new("alerts");
        let (lines_tx, lines_rx) = mpsc::unbounded_channel();

        (
            Self {
                limits,
                average_window,
                summary,
                history,
                averages,
                alerts,
                lines: LineFeed { tx: lines_tx },
            },
            Subscribers {
                summary: summary_rx,
                history: history_rx,
                averages: averages_rx,
                alerts: alerts_rx,
                lines: lines_rx,
            },
        )
    }

    /// A feed for raw lines; the subscriber queue closes once every feed
    /// and the dispatcher are dropped.
    pub fn line_feed(&self) -> LineFeed {
        self.lines.clone()
    }

    /// Compute and send every view for the series as of the latest append.
    pub fn dispatch(
        &mut self,
        series: &TimeSeries,
        alert_state: AlertState,
        alert: Option<AlertNotification>,
    ) -> Result<(), EmptySeries> {
        let limits = *self.limits.borrow();
        let last = series.last()?;

        let summary = SummaryView::from_bucket(last, limits.top_n);
        let history = HistoryView::from_series(series, limits.history_width)?;
        let averages = AveragesView::from_series(series, self.average_window, alert_state)?;

        self.summary.deliver(summary);
        self.history.deliver(history);
        self.averages.deliver(averages);
        if let Some(alert) = alert {
            self.alerts.deliver(alert);
        }

        Ok(())
    }
}
