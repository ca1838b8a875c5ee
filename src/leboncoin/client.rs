use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::api::ListingSource;
use super::parse;
use super::types::Listing;
use crate::config::HttpConfig;

const LEBONCOIN_BASE_URL: &str = "https://www.leboncoin.fr";
const USER_AGENT: &str = "Mozilla/5.0";

/// Scraping client for the Leboncoin search and ad pages.
///
/// Every failure on its own side degrades rather than propagates: a dead
/// search page yields an empty batch, a dead ad page yields an empty
/// description.
pub struct LeboncoinClient {
    http_client: Client,
    base_url: String,
    description_delay: Duration,
}

impl LeboncoinClient {
    pub fn new(config: &HttpConfig) -> Self {
        Self::with_base_url(config, LEBONCOIN_BASE_URL)
    }

    /// Same client against another host. Tests point this at a local mock
    /// server.
    pub fn with_base_url(config: &HttpConfig, base_url: &str) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            description_delay: Duration::from_millis(config.description_fetch_delay_ms),
        }
    }

    fn search_url(&self, query: &str, location: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?.join("/recherche")?;
        url.query_pairs_mut()
            .append_pair("text", query)
            .append_pair("locations", location);
        Ok(url)
    }

    async fn fetch_page(&self, url: Url) -> Result<String> {
        let resp = self.http_client.get(url).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("Leboncoin returned status {}", resp.status());
        }
        Ok(resp.text().await?)
    }

    /// Ad-page description, or "" when anything goes wrong (timeout, non-2xx,
    /// missing element). A bad description never costs the listing.
    async fn fetch_description(&self, link: &str) -> String {
        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(_) => return String::new(),
        };
        match self.fetch_page(url).await {
            Ok(html) => {
                parse::element_inner(&html, "adview_description_container").unwrap_or_default()
            }
            Err(e) => {
                debug!("Description fetch failed for {}: {}", link, e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl ListingSource for LeboncoinClient {
    async fn fetch_listings(&self, query: &str, location: &str, limit: usize) -> Result<Vec<Listing>> {
        let search_url = match self.search_url(query, location) {
            Ok(url) => url,
            Err(e) => {
                warn!("⚠️ Bad search URL for '{}' / '{}': {}", query, location, e);
                return Ok(Vec::new());
            }
        };

        let html = match self.fetch_page(search_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("⚠️ Search page fetch failed: {}", e);
                return Ok(Vec::new());
            }
        };

        let base = Url::parse(&self.base_url)?;
        let mut listings = Vec::new();
        for card in parse::listing_cards(&html).into_iter().take(limit) {
            // Cards without a title are ads or placeholders, skip them.
            let Some(title) = parse::element_inner(card, "aditem_title") else {
                continue;
            };
            let Some(href) = parse::card_href(card) else {
                continue;
            };
            let link = match base.join(&href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!("⚠️ Unresolvable href '{}': {}", href, e);
                    continue;
                }
            };
            let price = parse::element_inner(card, "aditem_price")
                .as_deref()
                .and_then(parse::extract_price);

            let description = self.fetch_description(&link).await;
            // Politeness pause between ad-page fetches.
            tokio::time::sleep(self.description_delay).await;

            listings.push(Listing {
                link,
                title,
                description,
                price,
                quality_score: 0,
                estimated_price: None,
            });
        }
        debug!("Fetched {} listings for '{}'", listings.len(), query);
        Ok(listings)
    }
}
