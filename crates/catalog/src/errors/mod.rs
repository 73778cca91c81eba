//! Error types and attempt classification for the catalog crate.
//!
//! This module provides:
//! - [`CatalogError`]: The main error enum for all catalog operations
//! - [`AttemptOutcome`]: Classification of a single physical upstream attempt

mod classify;

pub use classify::{classify_attempt, AttemptOutcome, RATE_LIMIT_PHRASE};

use thiserror::Error;

/// Errors that can occur while walking the upstream catalog.
///
/// Rate limiting never appears here: it is recovered inside the
/// throttled fetcher and is not surfaced to callers.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A network error occurred while talking to the upstream API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A transport failure that did not originate from the HTTP client.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure
        message: String,
    },

    /// The upstream answered with a non-success status that is not a
    /// rate-limit signal.
    #[error("Upstream error: HTTP {status} - {message}")]
    Upstream {
        /// HTTP status code returned by the upstream
        status: u16,
        /// Error messages extracted from the response body
        message: String,
    },

    /// The upstream answered successfully but the body could not be decoded.
    #[error("Malformed response from {url}: {message}")]
    MalformedResponse {
        /// The URL that produced the body
        url: String,
        /// The decoding error
        message: String,
    },

    /// The caller supplied an unusable identifier.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl CatalogError {
    /// Build a transport error from any displayable failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
