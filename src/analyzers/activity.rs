use crate::model::TripRecord;
use serde::Serialize;
use std::fmt;

pub const DEFAULT_ACTIVITY_WINDOW: usize = 20;

/// The last `size` records, most recent first.
///
/// Dataset order is arrival order, so the tail of the dataset is treated as
/// the most recent activity.
pub fn recent_window(records: &[TripRecord], size: usize) -> Vec<&TripRecord> {
    records.iter().rev().take(size).collect()
}

/// One line of the recent-activity list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub trip_id: String,
    pub distance_km: f64,
    pub pickup_datetime: String,
}

impl From<&TripRecord> for ActivityEntry {
    fn from(record: &TripRecord) -> Self {
        Self {
            trip_id: record.trip_id.clone(),
            distance_km: record.distance_km,
            pickup_datetime: record.pickup_datetime.clone(),
        }
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trip #{} - {:.1} km ({})",
            self.trip_id, self.distance_km, self.pickup_datetime
        )
    }
}
