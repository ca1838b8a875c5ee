use anyhow::Result;
use async_trait::async_trait;

use crate::leboncoin::types::Listing;

/// Delivery seam for deal alerts: Discord webhook in production, console in
/// paper mode, a recorder in tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert. Failures are the caller's to log; they never abort
    /// a cycle and never keep the listing out of the seen set.
    async fn notify(&self, listing: &Listing) -> Result<()>;
}
