use std::time::Duration;

use crate::fetcher::ThrottleConfig;
use crate::paginator::DEFAULT_BASE_URL;

/// Settings for building an [`Aggregator`](crate::Aggregator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Upstream host, without a trailing path.
    pub base_url: String,
    pub throttle: ThrottleConfig,
    /// How many experiences may have item listings in flight at once.
    /// 1 keeps the walk strictly sequential.
    pub concurrency: usize,
    /// Per-request HTTP timeout. `None` waits for the upstream indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            throttle: ThrottleConfig::default(),
            concurrency: 1,
            request_timeout: None,
        }
    }
}
