//! Passfinder Catalog Crate
//!
//! This crate walks a game platform's public catalog API and collects the
//! paid entitlement items a user sells across all of their experiences.
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!                          |    Aggregator    |  (join + filter + sort)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Paginator     |  (cursor walk per endpoint)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ThrottledFetcher |  (delay + rate-limit backoff)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Transport     |  (one physical GET)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Aggregator`] - Produces the price-sorted list of [`PricedItem`]s for a user
//! - [`Paginator`] - Walks every page of an [`Endpoint`]
//! - [`ThrottledFetcher`] - Single logical request with unbounded rate-limit retry
//! - [`Transport`] - Physical HTTP access, [`ReqwestTransport`] by default
//! - [`Diagnostics`] - Receiver for rate-limit and progress events

pub mod aggregator;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod paginator;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use aggregator::Aggregator;
pub use config::CatalogConfig;
pub use diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, RecordingDiagnostics};
pub use errors::{AttemptOutcome, CatalogError};
pub use fetcher::{Delay, RequestState, ThrottleConfig, ThrottledFetcher, TokioDelay};
pub use models::{EntitlementItem, Experience, ItemKind, Page, PricedItem};
pub use paginator::{Endpoint, PageQuery, Paginator, DEFAULT_BASE_URL};
pub use transport::{ReqwestTransport, Transport, UpstreamResponse};
