//! Plain-text rendering of the dashboard to any writer (stdout by default).

use crate::analyzers::activity::ActivityEntry;
use crate::analyzers::histogram::{ChartStyle, HistogramSeries};
use crate::analyzers::insights::TippedTrip;
use crate::analyzers::summary::SummaryStats;
use crate::dashboard::sinks::{
    ActivitySink, ChartHandle, ChartSink, Notification, Severity, StatsSink, StatusObserver,
};
use std::io::{self, Stdout, Write};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, info, warn};

const BAR_WIDTH: usize = 40;

pub struct TerminalView<W> {
    out: Mutex<W>,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

/// Handle for a chart already printed to the terminal.
#[derive(Debug)]
pub struct TerminalChart {
    title: &'static str,
}

impl ChartHandle for TerminalChart {
    fn dispose(self) {
        debug!(title = self.title, "Chart disposed");
    }
}

impl<W: Write + Send> ChartSink for TerminalView<W> {
    type Chart = TerminalChart;

    fn draw_chart(&self, series: &HistogramSeries) -> TerminalChart {
        self.emit(&render_series(series));
        TerminalChart {
            title: series.title,
        }
    }
}

impl<W: Write + Send> StatsSink for TerminalView<W> {
    fn show_stats(&self, stats: &SummaryStats) {
        self.emit(&format!(
            "\nTotal trips:      {}\nAverage fare:     {}\nAverage distance: {}\nAverage speed:    {}\n",
            stats.trips_display(),
            stats.fare_display(),
            stats.distance_display(),
            stats.speed_display(),
        ));
    }
}

impl<W: Write + Send> ActivitySink for TerminalView<W> {
    fn show_activity(&self, entries: &[ActivityEntry]) {
        let mut text = String::from("\nRecent activity\n");
        if entries.is_empty() {
            text.push_str("  (no trips)\n");
        }
        for entry in entries {
            text.push_str(&format!("  {}\n", entry));
        }
        self.emit(&text);
    }

    fn show_top_tipped(&self, trips: &[TippedTrip]) {
        if trips.is_empty() {
            return;
        }
        let mut text = String::from("\nTop tipped trips\n");
        for trip in trips {
            text.push_str(&format!(
                "  Trip #{}: {:.2}% (${:.2} on ${:.2})\n",
                trip.trip_id, trip.tip_pct, trip.tip_amount, trip.fare_amount
            ));
        }
        self.emit(&text);
    }
}

impl<W: Write + Send> StatusObserver for TerminalView<W> {
    fn set_loading(&self, loading: bool) {
        if loading {
            self.emit("Loading trips...\n");
        } else {
            debug!("Loading finished");
        }
    }

    // A terminal line cannot expire, so `ttl` only reaches the log.
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => {
                info!(ttl_secs = notification.ttl.as_secs(), text = %notification.message, "Notification")
            }
            Severity::Error => {
                error!(ttl_secs = notification.ttl.as_secs(), text = %notification.message, "Notification")
            }
        }
        self.emit(&format!("{}\n", notification));
    }
}

fn render_series(series: &HistogramSeries) -> String {
    let max = series.counts.iter().copied().max().unwrap_or(0);
    let label_width = series.labels.iter().map(String::len).max().unwrap_or(0);
    let mut text = format!("\n{}\n", series.title);

    for (label, &count) in series.labels.iter().zip(&series.counts) {
        let len = if max == 0 {
            0
        } else {
            (count as u128 * BAR_WIDTH as u128 / max as u128) as usize
        };
        let bar = match series.style {
            ChartStyle::Bar => "#".repeat(len),
            ChartStyle::Line if len == 0 => String::new(),
            ChartStyle::Line => format!("{}*", "-".repeat(len - 1)),
        };
        text.push_str(&format!(
            "{:>width$} | {:<bar_width$} {}\n",
            label,
            bar,
            count,
            width = label_width,
            bar_width = BAR_WIDTH
        ));
    }
    text
}
