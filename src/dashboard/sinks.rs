//! Collaborators the controller renders into.
//!
//! The controller never draws anything itself; it hands finished values to
//! these sinks. A type implementing all of them is a [`DashboardView`].

use crate::analyzers::activity::ActivityEntry;
use crate::analyzers::histogram::HistogramSeries;
use crate::analyzers::insights::TippedTrip;
use crate::analyzers::summary::SummaryStats;
use std::fmt;
use std::time::Duration;

/// A live chart. Released exactly once, before its replacement is drawn.
pub trait ChartHandle: Send {
    fn dispose(self);
}

pub trait ChartSink: Send + Sync {
    type Chart: ChartHandle;

    fn draw_chart(&self, series: &HistogramSeries) -> Self::Chart;
}

pub trait StatsSink: Send + Sync {
    fn show_stats(&self, stats: &SummaryStats);
}

pub trait ActivitySink: Send + Sync {
    fn show_activity(&self, entries: &[ActivityEntry]);

    fn show_top_tipped(&self, trips: &[TippedTrip]);
}

/// Busy indicator and transient user notifications.
pub trait StatusObserver: Send + Sync {
    fn set_loading(&self, loading: bool);

    fn notify(&self, notification: Notification);
}

pub trait DashboardView: ChartSink + StatsSink + ActivitySink + StatusObserver {}

impl<T> DashboardView for T where T: ChartSink + StatsSink + ActivitySink + StatusObserver {}

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A message shown to the user and dismissed after `ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub ttl: Duration,
}

impl Notification {
    pub fn info(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            ttl,
        }
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            ttl,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
