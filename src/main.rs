//! Topic feed service: binary entrypoint.
//! Loads config, installs metrics, and boots the Axum router on Shuttle.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use topic_feeds::ingest::config::load_config_default;
use topic_feeds::metrics::Metrics;
use topic_feeds::{api, Aggregator};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - FEEDS_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("FEEDS_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feeds=debug,info"));

    // The hosting runtime may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = load_config_default()?;
    tracing::info!(
        target: "feeds",
        revalidate_secs = cfg.revalidate_secs,
        adapter_timeout_secs = cfg.adapter_timeout_secs,
        response_budget_secs = cfg.response_budget_secs,
        "feeds config loaded"
    );

    let metrics = Metrics::init(cfg.revalidate_secs)?;
    let aggregator = Aggregator::from_config(&cfg)?;

    let router = api::router(aggregator).merge(metrics.router());

    Ok(router.into())
}
