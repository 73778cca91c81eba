//! Physical HTTP access to the upstream catalog.
//!
//! A [`Transport`] performs exactly one GET and reports what came back.
//! It does not interpret status codes; that is the job of
//! [`classify_attempt`](crate::errors::classify_attempt).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::CatalogError;

/// Raw status and body of one upstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One physical GET against the upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url` with the given query pairs.
    ///
    /// Returns `Err` only when no response was received at all.
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<UpstreamResponse, CatalogError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport. Requests wait indefinitely unless `timeout` is set.
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<UpstreamResponse, CatalogError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(UpstreamResponse { status, body })
    }
}
