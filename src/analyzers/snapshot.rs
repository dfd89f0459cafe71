use crate::analyzers::activity::{ActivityEntry, DEFAULT_ACTIVITY_WINDOW, recent_window};
use crate::analyzers::histogram::Histograms;
use crate::analyzers::insights::{TippedTrip, top_tipped};
use crate::analyzers::summary::SummaryStats;
use crate::error::Result;
use crate::model::{DateRange, Dataset};
use serde::Serialize;

pub const DEFAULT_TOP_TIPPED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub activity_window: usize,
    pub top_tipped: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            activity_window: DEFAULT_ACTIVITY_WINDOW,
            top_tipped: DEFAULT_TOP_TIPPED,
        }
    }
}

/// Everything the dashboard renders for one refresh, derived from a single
/// dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub range: Option<DateRange>,
    pub stats: SummaryStats,
    pub histograms: Histograms,
    pub activity: Vec<ActivityEntry>,
    pub top_tipped: Vec<TippedTrip>,
    pub pages_fetched: u32,
    pub truncated: bool,
}

impl DashboardSnapshot {
    /// Pure: the dataset is only read, and equal datasets give equal
    /// snapshots.
    pub fn from_dataset(dataset: &Dataset, options: &AnalysisOptions) -> Result<Self> {
        let histograms = Histograms::from_records(&dataset.records)?;

        Ok(Self {
            range: dataset.range,
            stats: SummaryStats::from_records(&dataset.records),
            histograms,
            activity: recent_window(&dataset.records, options.activity_window)
                .into_iter()
                .map(ActivityEntry::from)
                .collect(),
            top_tipped: top_tipped(&dataset.records, options.top_tipped),
            pages_fetched: dataset.pages_fetched,
            truncated: dataset.truncated,
        })
    }
}
