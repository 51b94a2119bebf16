use crate::cli::watch::sparkline::sparkline;
use crate::conf::DisplayConfig;
use crate::pipeline::{
    AlertNotification, AlertState, AveragesView, DisplayLimits, HistoryView, Subscribers,
    SummaryView,
};
use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;
use tokio::sync::watch;

const CLOCK_TICK: Duration = Duration::from_secs(1);
const ALERT_HISTORY: usize = 5;
const RECENT_LINES: usize = 5;

/// Latest value of every view, as last drawn.
#[derive(Debug, Default)]
pub struct Screen {
    pub summary: Option<SummaryView>,
    pub history: Option<HistoryView>,
    pub averages: Option<AveragesView>,
    pub alerts: VecDeque<AlertNotification>,
    pub lines: VecDeque<String>,
}

impl Screen {
    pub fn push_alert(&mut self, alert: AlertNotification) {
        self.alerts.push_back(alert);
        if self.alerts.len() > ALERT_HISTORY {
            self.alerts.pop_front();
        }
    }

    pub fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        if self.lines.len() > RECENT_LINES {
            self.lines.pop_front();
        }
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts
            .back()
            .map(|a| a.state)
            .or_else(|| self.averages.as_ref().map(|a| a.alert))
            .unwrap_or(AlertState::Cleared)
    }
}

pub fn render_screen(screen: &Screen, now: DateTime<Local>) -> String {
    let mut out = String::new();

    let averages = screen
        .averages
        .as_ref()
        .map(|a| format!("{a}   (last {} buckets)", a.window))
        .unwrap_or_else(|| " waiting for the first window...".to_string());
    out.push_str(&format!(
        "{:<72} {}\n\n",
        averages,
        now.format("%Y-%m-%d %H:%M:%S")
    ));

    match (&screen.averages, &screen.history) {
        (Some(totals), Some(history)) => {
            out.push_str(&format!(
                " total hits:  {:<12} {} {}\n",
                totals.total_hits,
                sparkline(&history.hits).cyan(),
                history.last_hits
            ));
            out.push_str(&format!(
                " total bytes: {:<12} {} {}\n",
                totals.total_bytes,
                sparkline(&history.bytes).cyan(),
                history.last_bytes
            ));
        }
        _ => out.push_str(" total hits:  0\n total bytes: 0\n"),
    }

    out.push_str("\nTop sections (last window):\n");
    match &screen.summary {
        Some(summary) if summary.hits > 0 => out.push_str(&summary.to_string()),
        _ => out.push_str(" <no traffic>\n"),
    }

    out.push_str("\nRecent lines:\n");
    if screen.lines.is_empty() {
        out.push_str(" <waiting for traffic>\n");
    }
    for line in &screen.lines {
        out.push_str(&format!(" {}\n", line.dimmed()));
    }

    let header = match screen.alert_state() {
        AlertState::Raised => format!("{}", " Alerts: RAISED ".white().on_red()),
        AlertState::Cleared => " Alerts:".to_string(),
    };
    out.push_str(&format!("\n{header}\n"));

    if screen.alerts.is_empty() {
        out.push_str(" <none>\n");
    }
    for alert in &screen.alerts {
        let line = match alert.state {
            AlertState::Raised => format!("{}", alert.red()),
            AlertState::Cleared => format!("{}", alert.green()),
        };
        out.push_str(&format!(" {line}\n"));
    }

    out
}

/// Display limits for the current terminal, from `COLUMNS`/`LINES` when set.
pub fn terminal_limits(display: DisplayConfig) -> DisplayLimits {
    let dim = |var: &str, fallback: u16| {
        std::env::var(var)
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(fallback)
    };

    DisplayLimits::for_terminal(dim("COLUMNS", display.width), dim("LINES", display.height))
}

/// Redraw on every view and once a second for the clock, until all queues close.
pub async fn run_dashboard(
    mut subscribers: Subscribers,
    limits: watch::Sender<DisplayLimits>,
    display: DisplayConfig,
) -> io::Result<()> {
    limits.send_replace(terminal_limits(display));

    hide_cursor()?;

    let mut screen = Screen::default();
    let mut clock = tokio::time::interval(CLOCK_TICK);

    let mut summary_open = true;
    let mut history_open = true;
    let mut averages_open = true;
    let mut alerts_open = true;
    let mut lines_open = true;

    while summary_open || history_open || averages_open || alerts_open || lines_open {
        tokio::select! {
            view = subscribers.summary.recv(), if summary_open => match view {
                Some(view) => screen.summary = Some(view),
                None => summary_open = false,
            },
            view = subscribers.history.recv(), if history_open => match view {
                Some(view) => screen.history = Some(view),
                None => history_open = false,
            },
            view = subscribers.averages.recv(), if averages_open => match view {
                Some(view) => screen.averages = Some(view),
                None => averages_open = false,
            },
            alert = subscribers.alerts.recv(), if alerts_open => match alert {
                Some(alert) => screen.push_alert(alert),
                None => alerts_open = false,
            },
            line = subscribers.lines.recv(), if lines_open => match line {
                // Lines can arrive far faster than a terminal redraws; the clock repaints them.
                Some(line) => {
                    screen.push_line(line);
                    continue;
                }
                None => lines_open = false,
            },
            _ = clock.tick() => {
                let next = terminal_limits(display);
                limits.send_if_modified(|current| {
                    let changed = *current != next;
                    *current = next;
                    changed
                });
            }
        }

        redraw(&render_screen(&screen, Local::now()))?;
    }

    restore_terminal();
    Ok(())
}

fn redraw(output: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\x1b[2J\x1b[H{output}")?;
    stdout.flush()
}

fn hide_cursor() -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "\x1b[?25l")?;
    stdout.flush()
}

/// Show the cursor again; best effort, used on every exit path.
pub fn restore_terminal() {
    let mut stdout = io::stdout().lock();
    let _ = write!(stdout, "\x1b[?25h");
    let _ = stdout.flush();
}
