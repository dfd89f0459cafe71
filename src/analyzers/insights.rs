use crate::analyzers::utility::round2;
use crate::model::TripRecord;
use serde::Serialize;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

pub const MAX_TOP_TIPPED: usize = 200;

/// A trip ranked by its tip as a share of the fare.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TippedTrip {
    pub trip_id: String,
    /// Tip as a percentage of the fare, two decimals.
    pub tip_pct: f64,
    pub fare_amount: f64,
    pub tip_amount: f64,
}

// Greater means better ranked: higher ratio, then earlier position.
struct Candidate<'a> {
    ratio: f64,
    position: usize,
    record: &'a TripRecord,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ratio
            .total_cmp(&other.ratio)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `k` trips with the highest tip-to-fare ratio, best first.
///
/// Only trips with a positive fare and a known tip take part. `k` is capped
/// at [`MAX_TOP_TIPPED`]. A bounded min-heap keeps memory at `O(k)`.
pub fn top_tipped(records: &[TripRecord], k: usize) -> Vec<TippedTrip> {
    let k = k.min(MAX_TOP_TIPPED);
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate<'_>>> = BinaryHeap::with_capacity(k + 1);

    for (position, record) in records.iter().enumerate() {
        let Some(tip) = record.tip_amount else {
            continue;
        };
        if record.fare_amount <= 0.0 {
            continue;
        }

        let candidate = Candidate {
            ratio: tip / record.fare_amount,
            position,
            record,
        };

        if heap.len() < k {
            heap.push(Reverse(candidate));
        } else if heap
            .peek()
            .is_some_and(|Reverse(weakest)| candidate > *weakest)
        {
            heap.pop();
            heap.push(Reverse(candidate));
        }
    }

    let mut ranked: Vec<_> = heap.into_iter().map(|Reverse(c)| c).collect();
    ranked.sort_by(|a, b| b.cmp(a));

    ranked
        .into_iter()
        .map(|c| TippedTrip {
            trip_id: c.record.trip_id.clone(),
            tip_pct: round2(c.ratio * 100.0),
            fare_amount: c.record.fare_amount,
            tip_amount: c.record.tip_amount.unwrap_or_default(),
        })
        .collect()
}
