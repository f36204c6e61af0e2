use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use suumo_scrape::config::Config;
use suumo_scrape::errors::AppError;
use suumo_scrape::events::TracingObserver;
use suumo_scrape::geocode::{GeocodeResolver, GeocodeStore, GoogleGeocoder};
use suumo_scrape::pipeline::{Pipeline, RunSummary};
use suumo_scrape::scraper::{list_wards, CancelToken, HttpFetcher, Throttle};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(15);

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,suumo_scrape=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<RunSummary, AppError> {
    let config = Config::from_env()?;

    let cancel = match config.deadline {
        Some(deadline) => CancelToken::with_deadline(deadline),
        None => CancelToken::new(),
    };

    let fetcher = HttpFetcher::new(
        Throttle::new(config.max_in_flight, config.request_delay),
        REQUEST_TIMEOUT,
    )?;

    let resolver = GeocodeResolver::new(
        GoogleGeocoder::new(config.google_api_key.clone(), GEOCODE_TIMEOUT)?,
        GeocodeStore::new(config.geocode_dir()),
        config.geocode_region.clone(),
    );

    info!("Getting wards for {}...", config.prefecture.name);
    let wards = list_wards(&fetcher, &config.prefecture, &cancel)?;
    info!("Found {} wards", wards.len());

    let observer = TracingObserver;
    let pipeline = Pipeline::new(
        &fetcher,
        &resolver,
        &observer,
        config.listings_dir(),
        config.max_pages,
        config.ward_workers,
    );

    let summary = pipeline.run(&wards, &cancel);

    info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        failed = summary.failed,
        records = summary.records,
        record_failures = summary.record_failures,
        "Done in {}s",
        (summary.finished_at - summary.started_at).num_seconds()
    );

    Ok(summary)
}
