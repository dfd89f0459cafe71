//! Page fetching against the trip-listing endpoint.
//!
//! [`PageSource`] is the single-page contract the loader drives; [`TripsApi`]
//! implements it over any [`HttpClient`].

mod basic;
mod client;
mod trips;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use trips::{TripsApi, parse_page};

use crate::error::Result;
use crate::model::{Page, PageRequest};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Fetches one page of trips. Single-shot: no retries.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;
}

/// Sends `req` and returns the status together with the full body.
///
/// Only transport failures are errors here; interpreting the status is left
/// to the caller.
pub async fn fetch_bytes<C: HttpClient>(
    client: &C,
    req: reqwest::Request,
) -> Result<(StatusCode, Vec<u8>)> {
    let resp = client.execute(req).await?;
    let status = resp.status();
    Ok((status, resp.bytes().await?.to_vec()))
}
