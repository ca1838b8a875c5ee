use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::api::Notifier;
use crate::leboncoin::types::Listing;

/// Paper-mode notifier: logs the alert instead of delivering it anywhere.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        info!(
            "📝 [PAPER] 💰 {} - {} € (estimé {:.0} €) {}",
            listing.title,
            listing.price.unwrap_or_default(),
            listing.estimated_price.unwrap_or_default(),
            listing.link
        );
        Ok(())
    }
}
