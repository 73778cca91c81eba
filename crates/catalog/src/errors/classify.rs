//! Classification of a single upstream attempt.
//!
//! The upstream's only rate-limit signal is an error payload of the form
//! `{"errors": [{"message": "..."}]}` carrying a known phrase. Detection is
//! kept separate from the retry driver so the driver only ever sees one of
//! three tagged outcomes.

use serde::Deserialize;

use super::CatalogError;
use crate::transport::UpstreamResponse;

/// Substring that marks an upstream error message as a rate-limit signal.
pub const RATE_LIMIT_PHRASE: &str = "Too many requests";

/// Longest raw body excerpt carried into an [`CatalogError::Upstream`] message.
const MAX_BODY_EXCERPT: usize = 200;

/// Result of one physical attempt against the upstream.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The upstream answered with a success status; carries the body.
    Success(String),
    /// The upstream asked us to slow down. Retry after a longer wait.
    RateLimited,
    /// Anything else. Propagate without retrying.
    Fatal(CatalogError),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

/// Classify the result of a physical attempt.
///
/// Transport failures are always fatal. Non-success responses are rate
/// limited only when an error entry's message contains [`RATE_LIMIT_PHRASE`].
pub fn classify_attempt(result: Result<UpstreamResponse, CatalogError>) -> AttemptOutcome {
    let response = match result {
        Ok(response) => response,
        Err(e) => return AttemptOutcome::Fatal(e),
    };

    if response.is_success() {
        return AttemptOutcome::Success(response.body);
    }

    let messages: Vec<String> = serde_json::from_str::<ErrorEnvelope>(&response.body)
        .map(|envelope| {
            envelope
                .errors
                .into_iter()
                .filter_map(|entry| entry.message)
                .collect()
        })
        .unwrap_or_default();

    if messages.iter().any(|m| m.contains(RATE_LIMIT_PHRASE)) {
        return AttemptOutcome::RateLimited;
    }

    let message = if messages.is_empty() {
        response.body.chars().take(MAX_BODY_EXCERPT).collect()
    } else {
        messages.join("; ")
    };

    AttemptOutcome::Fatal(CatalogError::Upstream {
        status: response.status,
        message,
    })
}
