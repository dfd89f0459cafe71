//! Trip records and the request/response shapes of the trip-listing API.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// One completed taxi trip as served by `/trips/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    #[serde(deserialize_with = "de_trip_id")]
    pub trip_id: String,
    #[serde(default, deserialize_with = "de_display_string")]
    pub pickup_datetime: String,
    #[serde(deserialize_with = "de_quantity")]
    pub fare_amount: f64,
    #[serde(deserialize_with = "de_quantity")]
    pub distance_km: f64,
    #[serde(deserialize_with = "de_quantity")]
    pub speed_kmh: f64,
    #[serde(default, deserialize_with = "de_optional_quantity")]
    pub tip_amount: Option<f64>,

    // signed so that out-of-range values survive parsing and are rejected by
    // the aggregator instead of the decoder
    pub hour_of_day: i64,
    pub day_of_week: i64,
}

/// One page of the trip listing plus the server's continuation flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<TripRecord>,
    pub has_next: bool,
}

/// Inclusive pickup-date filter. Only ever built with both bounds present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Builds a range when both bounds are given.
    ///
    /// A single bound is not a supported filter; it is dropped (with a
    /// warning) and the query runs unfiltered.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self::new(start, end)),
            (None, None) => None,
            (start, end) => {
                warn!(?start, ?end, "Partial date range supplied, date filter disabled");
                None
            }
        }
    }
}

/// Parameters of a single page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    pub range: Option<DateRange>,
}

impl PageRequest {
    /// Query-string pairs in the order the endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(range) = self.range {
            pairs.push(("start", range.start.format("%Y-%m-%d").to_string()));
            pairs.push(("end", range.end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

/// All records of one refresh, in fetch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<TripRecord>,
    pub range: Option<DateRange>,
    pub pages_fetched: u32,
    /// Set when loading stopped at the page ceiling while the server still
    /// reported more pages.
    pub truncated: bool,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Integer(i64),
    Text(String),
}

fn coerce_quantity(raw: NumberOrText) -> Result<f64, String> {
    let value = match raw {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{:?} is not a number", s))?,
    };
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} is not a non-negative quantity", value));
    }
    Ok(value)
}

fn de_quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    coerce_quantity(raw).map_err(D::Error::custom)
}

fn de_optional_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(raw) => coerce_quantity(raw).map(Some).map_err(D::Error::custom),
        None => Ok(None),
    }
}

fn de_trip_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Integer(n) => n.to_string(),
        IdRepr::Text(s) => s,
    })
}

fn de_display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<TripRecord, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_record_coerces_numeric_strings() {
        let record = parse(json!({
            "trip_id": 42,
            "pickup_datetime": "2016-03-14 17:24:55",
            "fare_amount": "12.50",
            "distance_km": " 3.2 ",
            "speed_kmh": 18,
            "tip_amount": "2.5",
            "hour_of_day": 17,
            "day_of_week": 0
        }))
        .unwrap();

        assert_eq!(record.trip_id, "42");
        assert_eq!(record.fare_amount, 12.5);
        assert_eq!(record.distance_km, 3.2);
        assert_eq!(record.speed_kmh, 18.0);
        assert_eq!(record.tip_amount, Some(2.5));
        assert_eq!(record.hour_of_day, 17);
    }

    #[test]
    fn test_record_optional_fields() {
        let record = parse(json!({
            "trip_id": "id2875421",
            "pickup_datetime": null,
            "fare_amount": 7,
            "distance_km": 1.1,
            "speed_kmh": 9.9,
            "hour_of_day": 3,
            "day_of_week": 6
        }))
        .unwrap();

        assert_eq!(record.trip_id, "id2875421");
        assert_eq!(record.pickup_datetime, "");
        assert_eq!(record.tip_amount, None);
    }

    #[test]
    fn test_record_rejects_non_numeric_fare() {
        let result = parse(json!({
            "trip_id": 1,
            "fare_amount": "twelve",
            "distance_km": 1.0,
            "speed_kmh": 1.0,
            "hour_of_day": 0,
            "day_of_week": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_rejects_negative_distance() {
        let result = parse(json!({
            "trip_id": 1,
            "fare_amount": 1.0,
            "distance_km": "-3",
            "speed_kmh": 1.0,
            "hour_of_day": 0,
            "day_of_week": 0
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_keeps_out_of_range_day() {
        let record = parse(json!({
            "trip_id": 1,
            "fare_amount": 1.0,
            "distance_km": 1.0,
            "speed_kmh": 1.0,
            "hour_of_day": 0,
            "day_of_week": 9
        }))
        .unwrap();
        assert_eq!(record.day_of_week, 9);
    }

    #[test]
    fn test_date_range_requires_both_bounds() {
        let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 1, 31).unwrap();

        assert_eq!(
            DateRange::from_bounds(Some(start), Some(end)),
            Some(DateRange::new(start, end))
        );
        assert_eq!(DateRange::from_bounds(Some(start), None), None);
        assert_eq!(DateRange::from_bounds(None, Some(end)), None);
        assert_eq!(DateRange::from_bounds(None, None), None);
    }

    #[test]
    fn test_query_pairs_with_range() {
        let request = PageRequest {
            page: 3,
            page_size: 10_000,
            range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 1, 7).unwrap(),
            )),
        };

        assert_eq!(
            request.query_pairs(),
            vec![
                ("page", "3".to_string()),
                ("page_size", "10000".to_string()),
                ("start", "2016-01-01".to_string()),
                ("end", "2016-01-07".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_without_range() {
        let request = PageRequest {
            page: 1,
            page_size: 10,
            range: None,
        };
        assert_eq!(request.query_pairs().len(), 2);
    }
}
