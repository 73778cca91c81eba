//! Throttled upstream fetcher.
//!
//! Every attempt is preceded by a wait of `base_delay + penalty`. A
//! rate-limit signal raises the penalty and retries; any other failure is
//! returned immediately. There is no retry ceiling: the loop runs until the
//! upstream stops limiting us or fails for another reason.

mod delay;
mod state;

pub use delay::{Delay, TokioDelay};
pub use state::{RequestState, RetryPhase, ThrottleConfig, BASE_DELAY, PENALTY_INCREMENT};

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;

use crate::diagnostics::Diagnostics;
use crate::errors::{classify_attempt, AttemptOutcome, CatalogError};
use crate::transport::Transport;

/// Issues single logical requests with adaptive delay and rate-limit backoff.
pub struct ThrottledFetcher {
    transport: Arc<dyn Transport>,
    delay: Arc<dyn Delay>,
    diagnostics: Arc<dyn Diagnostics>,
    config: ThrottleConfig,
}

impl ThrottledFetcher {
    /// Create a fetcher that waits on the tokio timer.
    pub fn new(
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
        config: ThrottleConfig,
    ) -> Self {
        Self {
            transport,
            delay: Arc::new(TokioDelay),
            diagnostics,
            config,
        }
    }

    /// Replace the suspension strategy.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn config(&self) -> ThrottleConfig {
        self.config
    }

    /// Fetch `url` and decode the successful body as `T`.
    ///
    /// A body that fails to decode is a fatal error; it is not retried.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, CatalogError> {
        let body = self.fetch_body(url, query).await?;

        serde_json::from_str(&body).map_err(|e| CatalogError::MalformedResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch `url` and return the raw successful body.
    pub async fn fetch_body(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<String, CatalogError> {
        let mut phase = RetryPhase::Idle(RequestState::new(self.config));

        loop {
            phase = match self.step(phase, url, query).await {
                RetryPhase::Done(body) => return Ok(body),
                RetryPhase::Failed(e) => return Err(e),
                next => next,
            };
        }
    }

    /// Advance the retry driver by one phase.
    async fn step(
        &self,
        phase: RetryPhase,
        url: &str,
        query: &[(&'static str, String)],
    ) -> RetryPhase {
        match phase {
            RetryPhase::Idle(state) => RetryPhase::Waiting(state),
            RetryPhase::Waiting(state) => {
                self.delay.wait(state.delay()).await;
                RetryPhase::Requesting(state)
            }
            RetryPhase::Requesting(state) => {
                debug!("GET {} {:?}", url, query);
                match classify_attempt(self.transport.get(url, query).await) {
                    AttemptOutcome::Success(body) => RetryPhase::Done(body),
                    AttemptOutcome::RateLimited => {
                        let state = state.on_rate_limited();
                        self.diagnostics.penalty_increased(url, state.penalty());
                        RetryPhase::Idle(state)
                    }
                    AttemptOutcome::Fatal(e) => RetryPhase::Failed(e),
                }
            }
            terminal @ (RetryPhase::Done(_) | RetryPhase::Failed(_)) => terminal,
        }
    }
}
