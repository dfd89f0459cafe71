use crate::error::{DashboardError, Result};
use crate::model::TripRecord;
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_WEEK: usize = 7;
pub const WEEKDAY_LABELS: [&str; DAYS_PER_WEEK] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Trip counts by hour of day and by day of week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histograms {
    pub hourly: [u64; HOURS_PER_DAY],
    pub weekly: [u64; DAYS_PER_WEEK],
}

/// How a chart sink should draw a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    Bar,
    Line,
}

/// A labelled histogram ready for a chart sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramSeries {
    pub title: &'static str,
    pub style: ChartStyle,
    pub labels: Vec<String>,
    pub counts: Vec<u64>,
}

impl Histograms {
    /// Counts every record into its hour and weekday bucket.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::DataIntegrity`] for the first record whose
    /// `hour_of_day` or `day_of_week` has no bucket.
    pub fn from_records(records: &[TripRecord]) -> Result<Self> {
        let mut histograms = Histograms {
            hourly: [0; HOURS_PER_DAY],
            weekly: [0; DAYS_PER_WEEK],
        };

        for (position, record) in records.iter().enumerate() {
            let hour = bucket(record.hour_of_day, HOURS_PER_DAY, "hour_of_day", position)?;
            let day = bucket(
                record.day_of_week,
                DAYS_PER_WEEK,
                "day_of_week",
                position,
            )?;
            histograms.hourly[hour] += 1;
            histograms.weekly[day] += 1;
        }

        Ok(histograms)
    }

    pub fn hourly_series(&self) -> HistogramSeries {
        HistogramSeries {
            title: "Trips per Hour",
            style: ChartStyle::Bar,
            labels: (0..HOURS_PER_DAY).map(|h| format!("{}:00", h)).collect(),
            counts: self.hourly.to_vec(),
        }
    }

    pub fn weekly_series(&self) -> HistogramSeries {
        HistogramSeries {
            title: "Trips per Day",
            style: ChartStyle::Line,
            labels: WEEKDAY_LABELS.iter().map(|d| d.to_string()).collect(),
            counts: self.weekly.to_vec(),
        }
    }
}

fn bucket(value: i64, len: usize, field: &'static str, position: usize) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&index| index < len)
        .ok_or(DashboardError::DataIntegrity {
            position,
            field,
            value,
            max: len as i64 - 1,
        })
}
