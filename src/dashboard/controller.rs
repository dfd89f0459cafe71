//! One refresh cycle: load, derive, render, report.

use crate::analyzers::snapshot::{AnalysisOptions, DashboardSnapshot};
use crate::dashboard::sinks::{
    ChartHandle, ChartSink, DashboardView, Notification, StatusObserver, DEFAULT_TOAST_DURATION,
};
use crate::error::DashboardError;
use crate::fetch::PageSource;
use crate::loader::DatasetLoader;
use crate::model::DateRange;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of a call to [`DashboardController::refresh`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The snapshot was rendered.
    Rendered(DashboardSnapshot),
    /// The refresh failed and the user was notified.
    Failed(DashboardError),
    /// A newer refresh started before this one finished; its results were
    /// dropped without rendering or notifying.
    Superseded,
}

/// Owns the charts and the sinks, and runs refreshes against a loader.
///
/// Overlapping refreshes are allowed. The most recently started one wins:
/// results of older refreshes that complete later are discarded.
pub struct DashboardController<S, V: ChartSink> {
    loader: DatasetLoader<S>,
    view: V,
    options: AnalysisOptions,
    toast_duration: Duration,
    charts: Mutex<ChartSlots<V::Chart>>,
    latest_ticket: AtomicU64,
    in_flight: AtomicUsize,
}

impl<S: PageSource, V: DashboardView> DashboardController<S, V> {
    pub fn new(loader: DatasetLoader<S>, view: V) -> Self {
        Self {
            loader,
            view,
            options: AnalysisOptions::default(),
            toast_duration: DEFAULT_TOAST_DURATION,
            charts: Mutex::new(ChartSlots::default()),
            latest_ticket: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_toast_duration(mut self, toast_duration: Duration) -> Self {
        self.toast_duration = toast_duration;
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn loader(&self) -> &DatasetLoader<S> {
        &self.loader
    }

    /// Consumes the controller, disposing its charts, and hands back the view.
    pub fn into_view(self) -> V {
        self.view
    }

    /// Loads the full dataset for the given pickup-date bounds and renders
    /// it. Both bounds are needed for the filter to apply.
    ///
    /// Failures are reported through the view and returned as
    /// [`RefreshOutcome::Failed`]; the loading indicator is cleared on every
    /// path.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> RefreshOutcome {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::enter(&self.view, &self.in_flight);

        let range = DateRange::from_bounds(start, end);
        let result = self
            .loader
            .load(range)
            .await
            .and_then(|dataset| DashboardSnapshot::from_dataset(&dataset, &self.options));

        // Checked under the chart lock so a stale refresh can never render
        // over a newer one.
        let mut charts = self.charts.lock().unwrap_or_else(PoisonError::into_inner);
        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding results of a superseded refresh");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                self.render(&mut charts, &snapshot);
                if snapshot.truncated {
                    self.view.notify(Notification::info(
                        format!(
                            "Showing the first {} pages of trips; more data is available",
                            snapshot.pages_fetched
                        ),
                        self.toast_duration,
                    ));
                }
                info!(
                    trips = snapshot.stats.total_trips,
                    pages = snapshot.pages_fetched,
                    "Dashboard refreshed"
                );
                RefreshOutcome::Rendered(snapshot)
            }
            Err(e) => {
                error!(error = %e, "Dashboard refresh failed");
                self.view
                    .notify(Notification::error(e.user_message(), self.toast_duration));
                RefreshOutcome::Failed(e)
            }
        }
    }

    fn render(&self, charts: &mut ChartSlots<V::Chart>, snapshot: &DashboardSnapshot) {
        replace_chart(&mut charts.hourly, || {
            self.view.draw_chart(&snapshot.histograms.hourly_series())
        });
        replace_chart(&mut charts.weekly, || {
            self.view.draw_chart(&snapshot.histograms.weekly_series())
        });
        self.view.show_stats(&snapshot.stats);
        self.view.show_activity(&snapshot.activity);
        self.view.show_top_tipped(&snapshot.top_tipped);
    }
}

struct ChartSlots<C: ChartHandle> {
    hourly: Option<C>,
    weekly: Option<C>,
}

impl<C: ChartHandle> Default for ChartSlots<C> {
    fn default() -> Self {
        Self {
            hourly: None,
            weekly: None,
        }
    }
}

impl<C: ChartHandle> Drop for ChartSlots<C> {
    fn drop(&mut self) {
        for chart in [self.hourly.take(), self.weekly.take()].into_iter().flatten() {
            chart.dispose();
        }
    }
}

/// Disposes the chart in `slot`, if any, then stores a freshly drawn one.
fn replace_chart<C: ChartHandle>(slot: &mut Option<C>, draw: impl FnOnce() -> C) {
    if let Some(old) = slot.take() {
        old.dispose();
    }
    *slot = Some(draw());
}

/// Keeps the loading indicator on while at least one refresh is running.
struct LoadingGuard<'a, O: StatusObserver> {
    observer: &'a O,
    in_flight: &'a AtomicUsize,
}

impl<'a, O: StatusObserver> LoadingGuard<'a, O> {
    fn enter(observer: &'a O, in_flight: &'a AtomicUsize) -> Self {
        if in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            observer.set_loading(true);
        }
        Self {
            observer,
            in_flight,
        }
    }
}

impl<O: StatusObserver> Drop for LoadingGuard<'_, O> {
    fn drop(&mut self) {
        match self.in_flight.fetch_sub(1, Ordering::SeqCst) {
            1 => self.observer.set_loading(false),
            0 => warn!("Loading guard released more often than entered"),
            _ => {}
        }
    }
}
