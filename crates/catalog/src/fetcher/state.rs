//! Retry state for a single logical fetch.

use std::time::Duration;

use crate::errors::CatalogError;

/// Wait applied before every attempt, including the first.
pub const BASE_DELAY: Duration = Duration::from_millis(100);

/// Amount added to the penalty on each consecutive rate-limit response.
pub const PENALTY_INCREMENT: Duration = Duration::from_millis(200);

/// Throttling parameters for the [`ThrottledFetcher`](super::ThrottledFetcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Fixed wait before every attempt.
    pub base_delay: Duration,
    /// Penalty growth per rate-limit response.
    pub penalty_increment: Duration,
    /// Upper bound on the penalty. `None` lets it grow without limit.
    pub max_penalty: Option<Duration>,
}

impl ThrottleConfig {
    /// No waiting at all. Handy for tests and local mirrors.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            penalty_increment: Duration::ZERO,
            max_penalty: None,
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            base_delay: BASE_DELAY,
            penalty_increment: PENALTY_INCREMENT,
            max_penalty: None,
        }
    }
}

/// Per-call retry state, threaded by value through the retry driver.
///
/// Created fresh for each logical fetch and dropped when it returns, so a
/// success always leaves the next call starting from a zero penalty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestState {
    config: ThrottleConfig,
    penalty: Duration,
}

impl RequestState {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            penalty: Duration::ZERO,
        }
    }

    /// Current penalty on top of the base delay.
    pub fn penalty(&self) -> Duration {
        self.penalty
    }

    /// Total wait before the next attempt.
    pub fn delay(&self) -> Duration {
        self.config.base_delay.saturating_add(self.penalty)
    }

    /// State after the upstream signalled a rate limit.
    pub fn on_rate_limited(self) -> Self {
        let raised = self.penalty.saturating_add(self.config.penalty_increment);
        let penalty = match self.config.max_penalty {
            Some(cap) => raised.min(cap),
            None => raised,
        };
        Self { penalty, ..self }
    }
}

/// Phases of the retry driver.
///
/// `Idle -> Waiting -> Requesting`, then `Done`, `Failed`, or back to
/// `Idle` with a raised penalty on a rate-limit signal.
#[derive(Debug)]
pub enum RetryPhase {
    Idle(RequestState),
    Waiting(RequestState),
    Requesting(RequestState),
    Done(String),
    Failed(CatalogError),
}
