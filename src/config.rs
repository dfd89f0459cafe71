//! Runtime configuration.
//!
//! Defaults, overridden by environment variables (a `.env` file is honoured),
//! overridden in turn by CLI flags in `main`.

use crate::analyzers::activity::DEFAULT_ACTIVITY_WINDOW;
use crate::analyzers::snapshot::{AnalysisOptions, DEFAULT_TOP_TIPPED};
use crate::dashboard::sinks::DEFAULT_TOAST_DURATION;
use crate::loader::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, LoaderOptions};
use anyhow::{Context, Result, bail};
use reqwest::Url;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub base_url: Url,
    pub page_size: u32,
    pub max_pages: u32,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub activity_window: usize,
    pub top_tipped: usize,
    pub toast_duration: Duration,
}

impl DashboardConfig {
    /// Reads the process environment after loading `.env`, if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = match lookup("TRIPS_API_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => parse_base_url(DEFAULT_BASE_URL)?,
        };

        let config = Self {
            base_url,
            page_size: parse_or(&lookup, "TRIPS_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            max_pages: parse_or(&lookup, "TRIPS_MAX_PAGES", DEFAULT_MAX_PAGES)?,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "TRIPS_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "TRIPS_CONNECT_TIMEOUT_SECS",
                10,
            )?),
            activity_window: parse_or(
                &lookup,
                "DASHBOARD_ACTIVITY_WINDOW",
                DEFAULT_ACTIVITY_WINDOW,
            )?,
            top_tipped: parse_or(&lookup, "DASHBOARD_TOP_TIPPED", DEFAULT_TOP_TIPPED)?,
            toast_duration: Duration::from_secs(parse_or(
                &lookup,
                "DASHBOARD_TOAST_SECS",
                DEFAULT_TOAST_DURATION.as_secs(),
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        Ok(())
    }

    /// Full URL of the paginated trip listing.
    pub fn trips_endpoint(&self) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("trips/all")
            .with_context(|| format!("cannot build trips endpoint from {}", self.base_url))
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            page_size: self.page_size,
            max_pages: self.max_pages,
        }
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            activity_window: self.activity_window,
            top_tipped: self.top_tipped,
        }
    }
}

/// Parses an absolute http(s) URL.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid base URL {:?}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("base URL must use http or https, got {:?}", other),
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}
