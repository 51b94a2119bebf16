use crate::pipeline::series::TimeSeries;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use tracing::info;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Cleared,
    Raised,
}

impl AlertState {
    /// Hysteresis: raise strictly above the threshold, clear strictly below it.
    ///
    /// Returns the new state, or `None` when the state holds (including an average
    /// sitting exactly on the threshold).
    pub fn transition(self, average: f64, threshold: f64) -> Option<AlertState> {
        match self {
            AlertState::Cleared if average > threshold => Some(AlertState::Raised),
            AlertState::Raised if average < threshold => Some(AlertState::Cleared),
            _ => None,
        }
    }
}

/// Emitted once per state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertNotification {
    /// State entered by this transition.
    pub state: AlertState,
    pub average: f64,
    pub threshold: f64,
    /// Buckets the average was taken over.
    pub window: usize,
    pub at: DateTime<Local>,
}

impl fmt::Display for AlertNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.state {
            AlertState::Raised => "exceeded",
            AlertState::Cleared => "fell below",
        };
        write!(
            f,
            "avg hits {:.1} over last {} buckets {} alert threshold of {} at {}",
            self.average,
            self.window,
            verb,
            self.threshold,
            self.at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Two-state threshold alert over the trailing average of hits.
#[derive(Debug, Clone)]
pub struct AlertMonitor {
    state: AlertState,
    threshold: f64,
    window: usize,
}

impl AlertMonitor {
    pub fn new(threshold: f64, window: usize) -> Self {
        Self {
            state: AlertState::Cleared,
            threshold,
            window,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Evaluate against the series as it stands right after an append.
    ///
    /// With fewer buckets than the window, the average covers what is there.
    pub fn evaluate(&mut self, series: &TimeSeries, at: DateTime<Local>) -> Option<AlertNotification> {
        let average = series.average_hits(self.window).ok()?;
        self.observe(average, at)
    }

    /// Feed one trailing-average sample.
    pub fn observe(&mut self, average: f64, at: DateTime<Local>) -> Option<AlertNotification> {
        let next = self.state.transition(average, self.threshold)?;

        info!(
            event = "alert_transition",
            from = ?self.state,
            to = ?next,
            average,
            threshold = self.threshold,
            window = self.window,
        );
        self.state = next;

        Some(AlertNotification {
            state: next,
            average,
            threshold: self.threshold,
            window: self.window,
            at,
        })
    }
}
