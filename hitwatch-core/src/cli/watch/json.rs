use crate::pipeline::{AlertNotification, AveragesView, HistoryView, Subscribers, SummaryView};
use serde::Serialize;
use std::io::{self, Write};

/// One line of `--json` output, tagged with the channel it came from.
#[derive(Debug, Serialize)]
#[serde(tag = "channel", rename_all = "snake_case")]
pub enum ViewRecord<'a> {
    Summary(&'a SummaryView),
    History(&'a HistoryView),
    Averages(&'a AveragesView),
    Alert(&'a AlertNotification),
    Line { line: &'a str },
}

/// Write every view as a JSON line until all subscriber queues close.
pub async fn run_json<W: Write + Send>(mut subscribers: Subscribers, mut out: W) -> io::Result<()> {
    loop {
        let line = tokio::select! {
            // Within one cycle, views come out in dispatch order.
            biased;

            Some(view) = subscribers.summary.recv() => serde_json::to_string(&ViewRecord::Summary(&view)),
            Some(view) = subscribers.history.recv() => serde_json::to_string(&ViewRecord::History(&view)),
            Some(view) = subscribers.averages.recv() => serde_json::to_string(&ViewRecord::Averages(&view)),
            Some(alert) = subscribers.alerts.recv() => serde_json::to_string(&ViewRecord::Alert(&alert)),
            Some(line) = subscribers.lines.recv() => serde_json::to_string(&ViewRecord::Line { line: &line }),
            else => break,
        };

        writeln!(out, "{}", line?)?;
        out.flush()?;
    }

    Ok(())
}
