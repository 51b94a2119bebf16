use super::test_helpers::{at, event, series_of};
use crate::pipeline::{
    AlertMonitor, AlertState, Dimension, Dispatcher, DisplayLimits, EmptySeries, HistoryView,
    RankedCount, SummaryView, TimeSeries, WindowAggregator,
};
use pretty_assertions::assert_eq;
use tokio::sync::watch;

fn limits(top_n: usize, history_width: usize) -> watch::Receiver<DisplayLimits> {
    let (_tx, rx) = watch::channel(DisplayLimits {
        top_n,
        history_width,
    });
    rx
}

#[test]
fn limits_follow_terminal_size() {
    assert_eq!(
        DisplayLimits::for_terminal(120, 40),
        DisplayLimits {
            top_n: 16,
            history_width: 82
        }
    );
    assert_eq!(
        DisplayLimits::for_terminal(10, 5),
        DisplayLimits {
            top_n: 1,
            history_width: 1
        }
    );
}

#[test]
fn dispatch_on_empty_series_fails() {
    let (mut dispatcher, _subs) = Dispatcher::new(limits(5, 5), 3);

    let result = dispatcher.dispatch(&TimeSeries::new(), AlertState::Cleared, None);

    assert_eq!(result, Err(EmptySeries));
}

#[test]
fn every_view_is_sent_once_per_cycle() {
    // Arrange
    let (mut dispatcher, mut subs) = Dispatcher::new(limits(5, 5), 2);
    let series = series_of(&[4, 6]);

    // Act
    dispatcher.dispatch(&series, AlertState::Cleared, None).unwrap();

    // Assert
    let summary = subs.summary.try_recv().unwrap();
    let history = subs.history.try_recv().unwrap();
    let averages = subs.averages.try_recv().unwrap();

    assert_eq!(summary.hits, 6);
    assert_eq!(history.hits, vec![4, 6]);
    assert_eq!(history.last_hits, 6);
    assert_eq!(averages.avg_hits, 5.0);
    assert_eq!(averages.total_hits, 10);
    assert_eq!(averages.buckets, 2);
    assert_eq!(averages.alert, AlertState::Cleared);

    assert!(subs.summary.try_recv().is_err());
    assert!(subs.alerts.try_recv().is_err());
}

#[test]
fn alert_is_forwarded_when_present() {
    let (mut dispatcher, mut subs) = Dispatcher::new(limits(5, 5), 2);
    let series = series_of(&[50]);
    let mut monitor = AlertMonitor::new(10.0, 2);
    let note = monitor.evaluate(&series, at(0));

    dispatcher.dispatch(&series, monitor.state(), note).unwrap();

    let alert = subs.alerts.try_recv().unwrap();
    assert_eq!(alert.state, AlertState::Raised);
    assert_eq!(alert.average, 50.0);
    assert_eq!(subs.averages.try_recv().unwrap().alert, AlertState::Raised);
}

#[test]
fn summary_is_truncated_to_top_n() {
    // Arrange
    let mut agg = WindowAggregator::new();
    for section in ["a", "b", "b", "c", "c", "c"] {
        agg.record(&event("10.0.0.1", section, 200, 1));
    }
    let bucket = agg.flush(at(2));

    // Act
    let view = SummaryView::from_bucket(&bucket, 2);

    // Assert
    assert_eq!(
        view.top(Dimension::Section),
        &[RankedCount::new("c", 3), RankedCount::new("b", 2)]
    );
    assert_eq!(view.top(Dimension::Address), &[RankedCount::new("10.0.0.1", 6)]);
    assert_eq!(view.to_string(), " /c : 3\n /b : 2\n");
}

#[test]
fn history_keeps_latest_buckets() {
    let series = series_of(&[1, 2, 3, 4, 5]);

    let view = HistoryView::from_series(&series, 3).unwrap();

    assert_eq!(view.hits, vec![3, 4, 5]);
    assert_eq!(view.bytes, vec![300, 400, 500]);
    assert_eq!(view.last_bytes, 500);
}

#[test]
fn limits_are_read_each_cycle() {
    // Arrange
    let (tx, rx) = watch::channel(DisplayLimits {
        top_n: 5,
        history_width: 5,
    });
    let (mut dispatcher, mut subs) = Dispatcher::new(rx, 2);
    let series = series_of(&[1, 2, 3, 4]);

    // Act
    dispatcher.dispatch(&series, AlertState::Cleared, None).unwrap();
    tx.send_replace(DisplayLimits {
        top_n: 5,
        history_width: 2,
    });
    dispatcher.dispatch(&series, AlertState::Cleared, None).unwrap();

    // Assert
    assert_eq!(subs.history.try_recv().unwrap().hits.len(), 4);
    assert_eq!(subs.history.try_recv().unwrap().hits, vec![3, 4]);
}

#[test]
fn dropped_subscriber_does_not_stop_the_others() {
    let (mut dispatcher, subs) = Dispatcher::new(limits(5, 5), 2);
    let mut averages = subs.averages;
    drop(subs.summary);
    drop(subs.history);

    let series = series_of(&[1]);
    dispatcher.dispatch(&series, AlertState::Cleared, None).unwrap();
    dispatcher.dispatch(&series, AlertState::Cleared, None).unwrap();

    assert!(averages.try_recv().is_ok());
    assert!(averages.try_recv().is_ok());
}

#[test]
fn line_feed_forwards_raw_lines_until_every_sender_is_gone() {
    // Arrange
    let (dispatcher, mut subs) = Dispatcher::new(limits(5, 5), 2);
    let feed = dispatcher.line_feed();

    // Act
    feed.send("first".to_string());
    feed.clone().send("second".to_string());
    drop(feed);
    let still_open = subs.lines.try_recv();
    drop(dispatcher);

    // Assert
    assert_eq!(still_open.as_deref(), Ok("first"));
    assert_eq!(subs.lines.try_recv().as_deref(), Ok("second"));
    assert_eq!(
        subs.lines.try_recv(),
        Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
    );
}
