//! Access-log Processing Pipeline
//!
//! Lines come in from a [`LineSource`](crate::ingest::LineSource), get parsed into
//! events, and are folded into fixed-width windows. Every window boundary produces
//! one immutable bucket that is appended to the time series; the alert monitor and
//! the dispatcher then look at the series as it stands after that append.
//!
//! The overall data processing architecture is:
//!
//! line source
//! EventParser
//! Event (bounded queue)
//! WindowAggregator
//! Bucket
//! TimeSeries
//! AlertMonitor + Dispatcher
//! subscribers
//!
//! One task produces events, one task owns everything from the aggregator down.
//! Other tasks read the series only through [`SeriesHandle`] or the views the
//! dispatcher sends them.

mod aggregator;
mod alert;
pub mod constants;
mod dispatch;
mod error;
mod parse;
mod run;
mod series;
#[cfg(test)]
mod tests;
mod types;

pub use aggregator::WindowAggregator;
pub use alert::{AlertMonitor, AlertNotification, AlertState};
pub use dispatch::{
    AveragesView, DimensionTop, Dispatcher, DisplayLimits, HistoryView, LineFeed, Subscribers,
    SummaryView,
};
pub use error::{EmptySeries, MalformedLine, MalformedReason};
pub use parse::{EventParser, section_of};
pub use run::{
    IngestStats, Pipeline, RunningPipeline, SeriesHandle, SeriesQuery, SeriesTotals, run_producer,
    spawn_pipeline,
};
pub use series::TimeSeries;
pub use types::{Bucket, Dimension, Event, RankedCount, RankedList};
