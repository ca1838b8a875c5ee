use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use super::api::Notifier;
use crate::leboncoin::types::Listing;

/// Posts deal alerts to a Discord webhook.
pub struct DiscordNotifier {
    http_client: Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: String, timeout_secs: u64) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            webhook_url,
        }
    }

    /// The alert text, estimated value rounded to whole euros.
    fn message(listing: &Listing) -> String {
        format!(
            "💸 **BON PLAN DÉTECTÉ !**\n**{}**\nPrix réel : {} €\nValeur estimée : {:.0} €\n🔗 {}",
            listing.title,
            listing.price.unwrap_or_default(),
            listing.estimated_price.unwrap_or_default(),
            listing.link
        )
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        let payload = json!({ "content": Self::message(listing) });
        let resp = self
            .http_client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("Discord webhook returned status {}", resp.status());
        }
        Ok(())
    }
}
