//! Refresh orchestration and the sinks it renders into.

pub mod controller;
pub mod sinks;
pub mod terminal;

pub use controller::{DashboardController, RefreshOutcome};
pub use sinks::{
    ActivitySink, ChartHandle, ChartSink, DashboardView, Notification, Severity, StatsSink,
    StatusObserver,
};
pub use terminal::TerminalView;
