//! HTTP client for the Azure update feed.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::{debug, info, warn};

use super::types::{FeedResponse, UpdateRecord};
use super::UpdateFeed;
use crate::config::FeedConfig;
use crate::error::FetchError;

/// Maximum records requested in the single page we fetch.
pub const PAGE_SIZE: usize = 100;

/// The feed rejects obviously scripted user agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Azure update feed client.
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn query(since: &str) -> [(&'static str, String); 5] {
        [
            ("$top", PAGE_SIZE.to_string()),
            ("$filter", format!("modified ge {since}")),
            ("$orderby", "modified desc".to_string()),
            ("$count", "true".to_string()),
            ("includeFacets", "true".to_string()),
        ]
    }
}

#[async_trait]
impl UpdateFeed for FeedClient {
    async fn fetch(&self, since: &str) -> Result<Vec<UpdateRecord>, FetchError> {
        debug!(url = %self.config.url, since, "Fetching update feed");

        let response = self
            .client
            .get(&self.config.url)
            .query(&Self::query(since))
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: FeedResponse = serde_json::from_slice(&body)?;

        // Only the first page is processed.
        if let Some(total) = parsed.total_count {
            if total > parsed.value.len() as u64 {
                warn!(
                    total,
                    returned = parsed.value.len(),
                    "Feed has more matching updates than one page; extra updates are not processed"
                );
            }
        }

        info!(count = parsed.value.len(), since, "Fetched update feed");
        Ok(parsed.value)
    }
}
