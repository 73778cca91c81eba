//! Joins per-experience item listings into one price-sorted collection.

use std::sync::Arc;
use std::time::Instant;

use futures::{stream, StreamExt, TryStreamExt};

use crate::config::CatalogConfig;
use crate::diagnostics::Diagnostics;
use crate::errors::CatalogError;
use crate::fetcher::ThrottledFetcher;
use crate::models::PricedItem;
use crate::paginator::Paginator;
use crate::transport::{ReqwestTransport, Transport};

/// Collects every priced entitlement item a user sells.
pub struct Aggregator {
    paginator: Paginator,
    diagnostics: Arc<dyn Diagnostics>,
    concurrency: usize,
}

impl Aggregator {
    /// Create a strictly sequential aggregator.
    pub fn new(paginator: Paginator, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            paginator,
            diagnostics,
            concurrency: 1,
        }
    }

    /// Build the full fetcher/paginator stack over a reqwest transport.
    pub fn from_config(config: &CatalogConfig, diagnostics: Arc<dyn Diagnostics>) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout));
        Self::with_transport(config, transport, diagnostics)
    }

    /// Build the full stack over a caller-supplied transport.
    pub fn with_transport(
        config: &CatalogConfig,
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let fetcher = ThrottledFetcher::new(transport, diagnostics.clone(), config.throttle);
        let paginator = Paginator::new(Arc::new(fetcher), config.base_url.clone());
        Self::new(paginator, diagnostics).with_concurrency(config.concurrency)
    }

    /// Allow up to `concurrency` experiences to be listed at once.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetch all of `user_id`'s experiences, list each one's items, keep the
    /// priced ones, and return them sorted by ascending price.
    ///
    /// Any failure aborts the whole run; no partial result is returned.
    pub async fn collect_priced_items(
        &self,
        user_id: &str,
    ) -> Result<Vec<PricedItem>, CatalogError> {
        if user_id.trim().is_empty() {
            return Err(CatalogError::InvalidIdentifier(user_id.to_string()));
        }

        let started = Instant::now();
        self.diagnostics.aggregation_started(user_id);

        let experiences = self.paginator.fetch_experiences(user_id).await?;

        // buffered() keeps experience order; at concurrency 1 listing N+1
        // does not start until N has finished.
        let batches: Vec<Vec<PricedItem>> = stream::iter(experiences.into_iter().enumerate())
            .map(|(index, experience)| {
                let paginator = self.paginator.clone();
                let diagnostics = self.diagnostics.clone();
                async move {
                    diagnostics.experience_started(index + 1, &experience);
                    let items = paginator.fetch_items(experience.id).await?;
                    Ok::<_, CatalogError>(
                        items
                            .into_iter()
                            .filter_map(PricedItem::from_item)
                            .collect::<Vec<_>>(),
                    )
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let mut priced: Vec<PricedItem> = batches.into_iter().flatten().collect();
        priced.sort_by(PricedItem::cmp_price);

        self.diagnostics
            .aggregation_finished(user_id, priced.len(), started.elapsed());

        Ok(priced)
    }
}
