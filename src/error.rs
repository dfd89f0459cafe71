//! Failure taxonomy for a dashboard refresh.
//!
//! Fetching and loading propagate these unchanged; only the dashboard
//! controller turns them into user-visible notifications.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network-level failure: connect, timeout, body read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response that carried no application error payload.
    #[error("server responded with HTTP {status}")]
    HttpStatus { status: u16 },

    /// The server reported an application error in its `error` field.
    #[error("API error: {0}")]
    Api(String),

    /// The response body does not match the trip-listing contract.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A record carries a histogram index outside its fixed range.
    #[error("record {position}: {field} = {value} is outside 0..={max}")]
    DataIntegrity {
        position: usize,
        field: &'static str,
        value: i64,
        max: i64,
    },
}

impl DashboardError {
    /// Text shown to the user when a refresh fails.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::DataIntegrity { .. } => {
                format!("Trip data failed validation: {}", self)
            }
            _ => format!("Error loading data from API: {}", self),
        }
    }

    /// True for failures of the transport itself rather than of the payload.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DashboardError::Transport(_) | DashboardError::HttpStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
