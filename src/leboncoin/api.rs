use anyhow::Result;
use async_trait::async_trait;

use super::types::Listing;

/// Interface for fetching listings, so the orchestrator can run against the
/// live site, a replay fixture, or a scripted mock without caring which.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch up to `limit` listings for a search query and location.
    ///
    /// The production client downgrades its own failures to an empty batch;
    /// replay and mock sources may still return `Err`, which callers treat
    /// the same way.
    async fn fetch_listings(&self, query: &str, location: &str, limit: usize)
        -> Result<Vec<Listing>>;
}
