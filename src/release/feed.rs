//! Release feed trait for fetching OS release records

#[cfg(test)]
use mockall::automock;

use crate::release::error::FeedError;
use crate::release::types::ReleaseRecord;

/// Trait for fetching the raw release catalog from an upstream source
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseFeed: Send + Sync {
    /// Fetches every release record the feed publishes
    ///
    /// # Returns
    /// * `Ok(Vec<ReleaseRecord>)` - Records in feed order; no filtering or sorting applied
    /// * `Err(FeedError)` - If the fetch fails
    async fn fetch_releases(&self) -> Result<Vec<ReleaseRecord>, FeedError>;
}
