//! CLI entry point for the taxi trip dashboard.
//!
//! Provides subcommands for a full dashboard refresh rendered to the
//! terminal and for probing a single page of the trips API.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use taxi_dashboard::{
    config::{DashboardConfig, parse_base_url},
    dashboard::{DashboardController, RefreshOutcome, TerminalView},
    fetch::{BasicClient, PageSource, TripsApi},
    loader::DatasetLoader,
    model::{DateRange, PageRequest},
    output::{SnapshotRecord, append_snapshot, print_json},
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "taxi_dashboard")]
#[command(about = "A terminal dashboard over a paginated taxi trips API", long_about = None)]
struct Cli {
    /// Base URL of the trips API (overrides TRIPS_API_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Records requested per page (overrides TRIPS_PAGE_SIZE)
    #[arg(long, global = true)]
    page_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every page of trips and render the dashboard
    Refresh {
        /// First pickup date to include (YYYY-MM-DD); needs --end
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last pickup date to include (YYYY-MM-DD); needs --start
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Maximum number of pages to request (overrides TRIPS_MAX_PAGES)
        #[arg(long)]
        max_pages: Option<u32>,

        /// CSV file to append a summary row to
        #[arg(short, long)]
        output: Option<String>,

        /// Also log the full snapshot as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch a single page and report what it contains
    Probe {
        /// Page number to request
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// First pickup date to include (YYYY-MM-DD); needs --end
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last pickup date to include (YYYY-MM-DD); needs --start
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_logging()?;

    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env()?;
    if let Some(raw) = &cli.base_url {
        config.base_url = parse_base_url(raw)?;
    }
    if let Some(page_size) = cli.page_size {
        config.page_size = page_size;
    }

    match cli.command {
        Commands::Refresh {
            start,
            end,
            max_pages,
            output,
            json,
        } => {
            if let Some(max_pages) = max_pages {
                config.max_pages = max_pages;
            }
            config.validate()?;

            let loader = DatasetLoader::new(trips_api(&config)?, config.loader_options());
            let controller = DashboardController::new(loader, TerminalView::stdout())
                .with_options(config.analysis_options())
                .with_toast_duration(config.toast_duration);

            match controller.refresh(start, end).await {
                RefreshOutcome::Rendered(snapshot) => {
                    if json {
                        print_json(&snapshot)?;
                    }
                    if let Some(path) = output {
                        let record = SnapshotRecord::from_snapshot(&snapshot, Utc::now());
                        append_snapshot(&path, &record)?;
                        info!(path = %path, "Snapshot appended");
                    }
                }
                RefreshOutcome::Failed(e) => return Err(e.into()),
                RefreshOutcome::Superseded => warn!("Refresh was superseded"),
            }
        }
        Commands::Probe { page, start, end } => {
            config.validate()?;
            let api = trips_api(&config)?;

            let request = PageRequest {
                page,
                page_size: config.page_size,
                range: DateRange::from_bounds(start, end),
            };
            let fetched = api.fetch_page(&request).await?;

            info!(
                endpoint = %api.endpoint(),
                page,
                records = fetched.records.len(),
                has_next = fetched.has_next,
                "Page fetched"
            );
        }
    }

    Ok(())
}

/// Colored stderr output plus a JSON rolling log file.
///
/// The returned guard flushes the file writer and must be held until exit.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/taxi_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("taxi_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn trips_api(config: &DashboardConfig) -> Result<TripsApi<BasicClient>> {
    let client = BasicClient::new(config.request_timeout, config.connect_timeout)?;
    Ok(TripsApi::new(client, config.trips_endpoint()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_date_flags_documented_on_every_subcommand() {
        let cli = Cli::command();
        for name in ["refresh", "probe"] {
            let subcommand = cli.find_subcommand(name).unwrap();
            for flag in ["start", "end"] {
                let arg = subcommand
                    .get_arguments()
                    .find(|a| a.get_id().as_str() == flag)
                    .unwrap();
                assert!(arg.get_help().is_some(), "{} --{} has no help", name, flag);
            }
        }
    }

    #[test]
    fn test_probe_parses_dates() {
        let cli = Cli::try_parse_from([
            "taxi_dashboard",
            "probe",
            "--page",
            "3",
            "--start",
            "2016-01-01",
            "--end",
            "2016-01-31",
        ])
        .unwrap();

        let Commands::Probe { page, start, end } = cli.command else {
            panic!("expected the probe subcommand");
        };
        assert_eq!(page, 3);
        assert_eq!(start, NaiveDate::from_ymd_opt(2016, 1, 1));
        assert_eq!(end, NaiveDate::from_ymd_opt(2016, 1, 31));
    }
}
