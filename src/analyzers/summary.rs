use crate::analyzers::utility::{group_thousands, mean_by, round2};
use crate::model::TripRecord;
use serde::Serialize;

/// Headline numbers of the dashboard.
///
/// Averages are rounded to two decimals and are `None` when there are no
/// trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_trips: usize,
    pub avg_fare: Option<f64>,
    pub avg_distance: Option<f64>,
    pub avg_speed: Option<f64>,
}

impl SummaryStats {
    pub fn from_records(records: &[TripRecord]) -> Self {
        Self {
            total_trips: records.len(),
            avg_fare: mean_by(records, |r| r.fare_amount).map(round2),
            avg_distance: mean_by(records, |r| r.distance_km).map(round2),
            avg_speed: mean_by(records, |r| r.speed_kmh).map(round2),
        }
    }

    pub fn trips_display(&self) -> String {
        group_thousands(self.total_trips as u64)
    }

    pub fn fare_display(&self) -> String {
        self.avg_fare
            .map(|v| format!("${:.2}", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn distance_display(&self) -> String {
        self.avg_distance
            .map(|v| format!("{:.2} km", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    pub fn speed_display(&self) -> String {
        self.avg_speed
            .map(|v| format!("{:.2} km/h", v))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

const NOT_AVAILABLE: &str = "n/a";
