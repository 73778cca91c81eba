use std::sync::Arc;

use passfinder_catalog::{Aggregator, LogDiagnostics};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(aggregator: Aggregator) -> Arc<Self> {
        Arc::new(Self { aggregator })
    }
}

pub fn init_tracing() {
    let log_format =
        std::env::var("PASSFINDER_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    tracing::info!(
        "Upstream {} (base delay {:?}, penalty step {:?}, concurrency {})",
        config.catalog.base_url,
        config.catalog.throttle.base_delay,
        config.catalog.throttle.penalty_increment,
        config.catalog.concurrency
    );
    let aggregator = Aggregator::from_config(&config.catalog, Arc::new(LogDiagnostics));
    AppState::new(aggregator)
}
