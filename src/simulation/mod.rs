use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::leboncoin::api::ListingSource;
use crate::leboncoin::types::Listing;

/// Replays listings from a JSON fixture instead of hitting the live site,
/// for offline runs and demos. The fixture is an array of listings in the
/// same shape the scraper produces.
pub struct ReplaySource {
    listings: Vec<Listing>,
}

impl ReplaySource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading simulation file {}", path.display()))?;
        let listings: Vec<Listing> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing simulation file {}", path.display()))?;
        info!("🎞️  Replay source loaded {} listings", listings.len());
        Ok(Self { listings })
    }
}

#[async_trait]
impl ListingSource for ReplaySource {
    async fn fetch_listings(&self, query: &str, _location: &str, limit: usize) -> Result<Vec<Listing>> {
        info!(
            "🎞️  Replaying {} of {} fixture listings for '{}'",
            limit.min(self.listings.len()),
            self.listings.len(),
            query
        );
        Ok(self.listings.iter().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replay_respects_limit() {
        let listings = vec![
            Listing {
                link: "https://x/ad/1".into(),
                title: "PS5 neuve".into(),
                description: String::new(),
                price: Some(400),
                quality_score: 0,
                estimated_price: None,
            },
            Listing {
                link: "https://x/ad/2".into(),
                title: "PS5 urgent".into(),
                description: String::new(),
                price: Some(250),
                quality_score: 0,
                estimated_price: None,
            },
        ];
        let source = ReplaySource::new(listings);
        let batch = source.fetch_listings("ps5", "paris", 1).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].link, "https://x/ad/1");
    }

    #[tokio::test]
    async fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.json");
        std::fs::write(
            &path,
            r#"[{"link":"https://x/ad/1","title":"PS5","price":300}]"#,
        )
        .unwrap();
        let source = ReplaySource::from_file(&path).unwrap();
        let batch = source.fetch_listings("ps5", "paris", 30).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].price, Some(300));
    }

    #[test]
    fn test_from_file_missing_is_an_error() {
        assert!(ReplaySource::from_file("/nonexistent/listings.json").is_err());
    }
}
