//! Update feed fetching.

mod client;
mod types;

pub use client::{FeedClient, PAGE_SIZE};
pub use types::{FeedResponse, Products, UpdateRecord};

use async_trait::async_trait;

use crate::error::FetchError;

/// Source of update records.
#[async_trait]
pub trait UpdateFeed: Send + Sync {
    /// Fetch records modified at or after `since` (`YYYY-MM-DDTHH:MM:SSZ`).
    async fn fetch(&self, since: &str) -> Result<Vec<UpdateRecord>, FetchError>;
}
