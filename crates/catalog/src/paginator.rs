//! Cursor-based pagination over the throttled fetcher.
//!
//! Both upstream collections share one page shape
//! (`{data: [...], nextPageCursor}`) and one control flow; only the URL
//! template and the page size differ, which [`Endpoint`] captures.

use std::sync::Arc;

use log::debug;
use serde::de::DeserializeOwned;

use crate::errors::CatalogError;
use crate::fetcher::ThrottledFetcher;
use crate::models::{EntitlementItem, Experience, Page};

/// Default upstream host.
pub const DEFAULT_BASE_URL: &str = "https://games.roblox.com";

/// Page size for a user's experiences.
pub const EXPERIENCE_PAGE_SIZE: u32 = 50;

/// Page size for an experience's entitlement items.
pub const ITEM_PAGE_SIZE: u32 = 100;

/// Sort order requested from the upstream.
const SORT_ORDER: &str = "Asc";

/// A paginated upstream collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Experiences published by a user.
    UserExperiences { user_id: String },
    /// Entitlement items sold inside an experience.
    ExperienceItems { experience_id: u64 },
}

impl Endpoint {
    /// Absolute URL of the collection under `base_url`.
    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::UserExperiences { user_id } => {
                format!("{}/v2/users/{}/games", base, urlencoding::encode(user_id))
            }
            Self::ExperienceItems { experience_id } => {
                format!("{}/v1/games/{}/game-passes", base, experience_id)
            }
        }
    }

    pub fn page_size(&self) -> u32 {
        match self {
            Self::UserExperiences { .. } => EXPERIENCE_PAGE_SIZE,
            Self::ExperienceItems { .. } => ITEM_PAGE_SIZE,
        }
    }
}

/// Query parameters for one page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageQuery {
    pub limit: u32,
    pub cursor: Option<String>,
}

impl PageQuery {
    /// Wire form. The cursor is omitted entirely on the first page.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("sortOrder", SORT_ORDER.to_string()),
        ];
        if let Some(cursor) = &self.cursor {
            pairs.push(("cursor", cursor.clone()));
        }
        pairs
    }
}

/// Walks every page of an [`Endpoint`].
#[derive(Clone)]
pub struct Paginator {
    fetcher: Arc<ThrottledFetcher>,
    base_url: String,
}

impl Paginator {
    pub fn new(fetcher: Arc<ThrottledFetcher>, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
        }
    }

    /// Fetch every page of `endpoint`, in upstream order.
    ///
    /// Always performs at least one request and stops as soon as the
    /// upstream returns no cursor. Any error aborts the walk and the pages
    /// gathered so far are discarded.
    pub async fn fetch_all_pages<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Vec<T>, CatalogError> {
        let url = endpoint.url(&self.base_url);
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let query = PageQuery {
                limit: endpoint.page_size(),
                cursor: cursor.take(),
            };
            let page: Page<T> = self.fetcher.fetch(&url, &query.to_pairs()).await?;
            let (data, next) = page.into_parts();

            pages += 1;
            items.extend(data);
            cursor = next;

            if cursor.is_none() {
                break;
            }
        }

        debug!("Fetched {} items over {} pages from {}", items.len(), pages, url);
        Ok(items)
    }

    /// All experiences published by `user_id`.
    pub async fn fetch_experiences(&self, user_id: &str) -> Result<Vec<Experience>, CatalogError> {
        self.fetch_all_pages(&Endpoint::UserExperiences {
            user_id: user_id.to_string(),
        })
        .await
    }

    /// All entitlement items sold in `experience_id`.
    pub async fn fetch_items(&self, experience_id: u64) -> Result<Vec<EntitlementItem>, CatalogError> {
        self.fetch_all_pages(&Endpoint::ExperienceItems { experience_id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::fetcher::ThrottleConfig;
    use crate::test_support::{RecordingDelay, ScriptedTransport, RATE_LIMIT_BODY};
    use serde_json::json;

    const BASE: &str = "https://upstream.test";

    fn paginator(transport: &Arc<ScriptedTransport>) -> Paginator {
        let fetcher = ThrottledFetcher::new(
            transport.clone(),
            Arc::new(RecordingDiagnostics::new()),
            ThrottleConfig::default(),
        )
        .with_delay(Arc::new(RecordingDelay::new()));
        Paginator::new(Arc::new(fetcher), BASE)
    }

    fn items_page(ids: std::ops::Range<u64>, cursor: Option<&str>) -> serde_json::Value {
        let data: Vec<_> = ids
            .map(|id| json!({"id": id, "name": format!("Item {}", id), "price": id}))
            .collect();
        json!({"data": data, "nextPageCursor": cursor})
    }

    #[test]
    fn test_endpoint_urls() {
        let experiences = Endpoint::UserExperiences {
            user_id: "42".to_string(),
        };
        assert_eq!(
            experiences.url("https://games.roblox.com/"),
            "https://games.roblox.com/v2/users/42/games"
        );
        assert_eq!(experiences.page_size(), 50);

        let items = Endpoint::ExperienceItems { experience_id: 7 };
        assert_eq!(
            items.url(DEFAULT_BASE_URL),
            "https://games.roblox.com/v1/games/7/game-passes"
        );
        assert_eq!(items.page_size(), 100);
    }

    #[test]
    fn test_user_id_is_path_encoded() {
        let endpoint = Endpoint::UserExperiences {
            user_id: "../1?x=2".to_string(),
        };
        assert_eq!(endpoint.url(BASE), "https://upstream.test/v2/users/..%2F1%3Fx%3D2/games");
    }

    #[test]
    fn test_first_page_query_has_no_cursor() {
        let query = PageQuery {
            limit: 50,
            cursor: None,
        };
        assert_eq!(
            query.to_pairs(),
            vec![("limit", "50".to_string()), ("sortOrder", "Asc".to_string())]
        );
    }

    #[tokio::test]
    async fn test_walks_until_cursor_is_null() {
        let transport = Arc::new(ScriptedTransport::new());
        let url = Endpoint::ExperienceItems { experience_id: 1 }.url(BASE);
        transport.push_page(&url, None, items_page(0..100, Some("c1")));
        transport.push_page(&url, Some("c1"), items_page(100..200, Some("c2")));
        transport.push_page(&url, Some("c2"), items_page(200..230, None));

        let items = paginator(&transport).fetch_items(1).await.unwrap();

        assert_eq!(items.len(), 230);
        assert_eq!(transport.calls_to(&url), 3);
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, (0..230u64).collect::<Vec<_>>());

        let calls = transport.calls();
        assert_eq!(calls[0].param("cursor"), None);
        assert_eq!(calls[1].param("cursor"), Some("c1"));
        assert_eq!(calls[2].param("cursor"), Some("c2"));
        assert!(calls.iter().all(|c| c.param("limit") == Some("100")));
        assert!(calls.iter().all(|c| c.param("sortOrder") == Some("Asc")));
    }

    #[tokio::test]
    async fn test_single_empty_page_still_fetches_once() {
        let transport = Arc::new(ScriptedTransport::new());
        let url = Endpoint::UserExperiences {
            user_id: "9".to_string(),
        }
        .url(BASE);
        transport.push_page(&url, None, json!({"nextPageCursor": null}));

        let experiences = paginator(&transport).fetch_experiences("9").await.unwrap();

        assert!(experiences.is_empty());
        assert_eq!(transport.calls_to(&url), 1);
        assert_eq!(transport.calls()[0].param("limit"), Some("50"));
    }

    #[tokio::test]
    async fn test_rate_limited_page_is_retried_in_place() {
        let transport = Arc::new(ScriptedTransport::new());
        let url = Endpoint::ExperienceItems { experience_id: 3 }.url(BASE);
        transport.push_page(&url, None, items_page(0..2, Some("next")));
        transport.push(&url, Some("next"), 429, RATE_LIMIT_BODY);
        transport.push_page(&url, Some("next"), items_page(2..3, None));

        let items = paginator(&transport).fetch_items(3).await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(transport.calls_to(&url), 3);
    }

    #[tokio::test]
    async fn test_error_mid_walk_discards_partial_pages() {
        let transport = Arc::new(ScriptedTransport::new());
        let url = Endpoint::ExperienceItems { experience_id: 4 }.url(BASE);
        transport.push_page(&url, None, items_page(0..100, Some("c1")));
        transport.push(&url, Some("c1"), 500, r#"{"errors":[{"message":"InternalServerError"}]}"#);

        let result = paginator(&transport).fetch_items(4).await;

        assert!(matches!(
            result,
            Err(CatalogError::Upstream { status: 500, .. })
        ));
        assert_eq!(transport.calls_to(&url), 2);
    }
}
