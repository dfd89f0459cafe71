use super::{HttpClient, PageSource, fetch_bytes};
use crate::error::{DashboardError, Result};
use crate::model::{Page, PageRequest, TripRecord};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// [`PageSource`] backed by `GET {base}/trips/all`.
pub struct TripsApi<C> {
    client: C,
    endpoint: Url,
}

impl<C: HttpClient> TripsApi<C> {
    /// `endpoint` is the full URL of the listing, e.g.
    /// `http://127.0.0.1:5000/trips/all`.
    pub fn new(client: C, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn page_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        url
    }
}

#[async_trait]
impl<C: HttpClient> PageSource for TripsApi<C> {
    #[tracing::instrument(skip(self), fields(page = request.page))]
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        let url = self.page_url(request);
        debug!(url = %url, "Requesting trip page");

        let req = reqwest::Request::new(Method::GET, url);
        let (status, body) = fetch_bytes(&self.client, req).await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Trip page received");

        parse_page(status, &body)
    }
}

/// Interprets a trip-listing response.
///
/// An `error` payload wins over the HTTP status, since the server reports
/// application failures as JSON bodies on 5xx responses. An empty or `false`
/// `error` is no error. `pagination.has_next` must be a boolean.
pub fn parse_page(status: StatusCode, body: &[u8]) -> Result<Page> {
    let json: Option<Value> = serde_json::from_slice(body).ok();

    if let Some(message) = json.as_ref().and_then(error_message) {
        return Err(DashboardError::Api(message));
    }

    if !status.is_success() {
        return Err(DashboardError::HttpStatus {
            status: status.as_u16(),
        });
    }

    let json = json
        .ok_or_else(|| DashboardError::Malformed("response body is not JSON".to_string()))?;

    let items = match json.get("data") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(DashboardError::Malformed(
                "`data` is not a sequence".to_string(),
            ));
        }
        None => return Err(DashboardError::Malformed("missing `data` field".to_string())),
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            TripRecord::deserialize(item)
                .map_err(|e| DashboardError::Malformed(format!("record {}: {}", i, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let has_next = match json.pointer("/pagination/has_next") {
        Some(Value::Bool(has_next)) => *has_next,
        Some(other) => {
            return Err(DashboardError::Malformed(format!(
                "`pagination.has_next` is not a boolean: {}",
                other
            )));
        }
        None => {
            return Err(DashboardError::Malformed(
                "missing `pagination.has_next`".to_string(),
            ));
        }
    };

    Ok(Page { records, has_next })
}

fn error_message(json: &Value) -> Option<String> {
    match json.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DateRange;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Mutex;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn trip(id: u32) -> serde_json::Value {
        json!({
            "trip_id": id,
            "pickup_datetime": "2016-06-30 23:59:58",
            "fare_amount": "10.00",
            "distance_km": "2.5",
            "speed_kmh": "15.0",
            "hour_of_day": 23,
            "day_of_week": 3
        })
    }

    #[test]
    fn test_parse_page_with_continuation() {
        let bytes = body(json!({
            "data": [trip(1), trip(2)],
            "pagination": { "page": 1, "page_size": 2, "has_next": true }
        }));

        let page = parse_page(StatusCode::OK, &bytes).unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].trip_id, "1");
        assert_eq!(page.records[1].trip_id, "2");
        assert!(page.has_next);
    }

    #[test]
    fn test_parse_page_last_page() {
        let bytes = body(json!({ "data": [], "pagination": { "has_next": false } }));
        let page = parse_page(StatusCode::OK, &bytes).unwrap();
        assert!(page.records.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn test_parse_page_missing_has_next_is_malformed() {
        let without_block = body(json!({ "data": [trip(1)] }));
        assert!(matches!(
            parse_page(StatusCode::OK, &without_block),
            Err(DashboardError::Malformed(_))
        ));

        let without_flag = body(json!({ "data": [trip(1)], "pagination": { "page": 1 } }));
        assert!(matches!(
            parse_page(StatusCode::OK, &without_flag),
            Err(DashboardError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_page_string_has_next_is_malformed() {
        let bytes = body(json!({ "data": [trip(1)], "pagination": { "has_next": "true" } }));
        match parse_page(StatusCode::OK, &bytes) {
            Err(DashboardError::Malformed(msg)) => assert!(msg.contains("has_next")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_falsy_error_is_ignored() {
        for error in [json!(""), json!(false), json!(null)] {
            let bytes = body(json!({
                "error": error,
                "data": [trip(1)],
                "pagination": { "has_next": false }
            }));
            let page = parse_page(StatusCode::OK, &bytes).unwrap();
            assert_eq!(page.records.len(), 1);
        }
    }

    #[test]
    fn test_parse_page_error_payload() {
        let bytes = body(json!({ "error": "Database connection failed" }));
        let result = parse_page(StatusCode::INTERNAL_SERVER_ERROR, &bytes);
        assert!(matches!(
            result,
            Err(DashboardError::Api(ref msg)) if msg == "Database connection failed"
        ));
    }

    #[test]
    fn test_parse_page_error_payload_on_success_status() {
        let bytes = body(json!({ "error": "bad page", "data": [] }));
        let result = parse_page(StatusCode::OK, &bytes);
        assert!(matches!(result, Err(DashboardError::Api(_))));
    }

    #[test]
    fn test_parse_page_non_success_without_payload() {
        let result = parse_page(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>");
        assert!(matches!(
            result,
            Err(DashboardError::HttpStatus { status: 502 })
        ));
    }

    #[test]
    fn test_parse_page_missing_data() {
        let bytes = body(json!({ "pagination": { "has_next": false } }));
        let result = parse_page(StatusCode::OK, &bytes);
        assert!(matches!(result, Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_parse_page_data_not_a_sequence() {
        let bytes = body(json!({ "data": { "trip_id": 1 } }));
        let result = parse_page(StatusCode::OK, &bytes);
        assert!(matches!(result, Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_parse_page_not_json() {
        let result = parse_page(StatusCode::OK, b"not json");
        assert!(matches!(result, Err(DashboardError::Malformed(_))));
    }

    #[test]
    fn test_parse_page_bad_record_names_position() {
        let mut bad = trip(2);
        bad["fare_amount"] = json!("free");
        let bytes = body(json!({ "data": [trip(1), bad] }));

        match parse_page(StatusCode::OK, &bytes) {
            Err(DashboardError::Malformed(msg)) => assert!(msg.starts_with("record 1:")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    struct NoopClient;

    #[async_trait]
    impl HttpClient for NoopClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("page_url tests never send")
        }
    }

    /// Answers every request with one canned response and remembers the
    /// URLs it was asked for.
    struct ScriptedClient {
        response: Option<(StatusCode, Vec<u8>)>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn answering(status: StatusCode, body: Vec<u8>) -> Self {
            Self {
                response: Some((status, body)),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                response: None,
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedClient {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.urls.lock().unwrap().push(req.url().to_string());
            match &self.response {
                Some((status, body)) => Ok(reqwest::Response::from(
                    http::Response::builder()
                        .status(status.as_u16())
                        .body(body.clone())
                        .unwrap(),
                )),
                // builder error: the URL does not parse
                None => Err(reqwest::Client::new().get("not a url").build().unwrap_err()),
            }
        }
    }

    fn endpoint() -> Url {
        Url::parse("http://127.0.0.1:5000/trips/all").unwrap()
    }

    fn first_page() -> PageRequest {
        PageRequest {
            page: 1,
            page_size: 500,
            range: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_page_sends_page_url_and_parses_body() {
        let client = ScriptedClient::answering(
            StatusCode::OK,
            body(json!({ "data": [trip(7)], "pagination": { "has_next": true } })),
        );
        let api = TripsApi::new(client, endpoint());

        let page = api.fetch_page(&first_page()).await.unwrap();

        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].trip_id, "7");
        assert!(page.has_next);
        assert_eq!(
            api.client.urls(),
            vec!["http://127.0.0.1:5000/trips/all?page=1&page_size=500"]
        );
    }

    #[tokio::test]
    async fn test_fetch_page_reports_server_error_payload() {
        let client = ScriptedClient::answering(
            StatusCode::INTERNAL_SERVER_ERROR,
            body(json!({ "error": "Database connection failed" })),
        );
        let api = TripsApi::new(client, endpoint());

        let result = api.fetch_page(&first_page()).await;

        assert!(matches!(
            result,
            Err(DashboardError::Api(ref msg)) if msg == "Database connection failed"
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_transport_failure() {
        let api = TripsApi::new(ScriptedClient::unreachable(), endpoint());

        let err = api.fetch_page(&first_page()).await.unwrap_err();

        assert!(matches!(err, DashboardError::Transport(_)));
        assert!(err.is_transport());
        assert!(err.user_message().starts_with("Error loading data from API"));
        assert_eq!(
            api.client.urls(),
            vec!["http://127.0.0.1:5000/trips/all?page=1&page_size=500"]
        );
    }

    #[test]
    fn test_page_url_carries_query() {
        let api = TripsApi::new(
            NoopClient,
            Url::parse("http://127.0.0.1:5000/trips/all").unwrap(),
        );
        let request = PageRequest {
            page: 2,
            page_size: 10_000,
            range: Some(DateRange::new(
                NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2016, 1, 2).unwrap(),
            )),
        };

        assert_eq!(
            api.page_url(&request).as_str(),
            "http://127.0.0.1:5000/trips/all?page=2&page_size=10000&start=2016-01-01&end=2016-01-02"
        );
    }
}
