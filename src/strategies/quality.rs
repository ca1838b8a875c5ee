use tracing::debug;

use crate::config::FilterConfig;
use crate::leboncoin::types::Listing;

/// Wording that tends to mark a well-kept item, +2 each.
pub const DEFAULT_POSITIVE_PHRASES: &[&str] = &[
    "neuf",
    "comme neuf",
    "urgent",
    "sous garantie",
    "boîte scellée",
    "avec facture",
    "très bon état",
    "excellent état",
];

/// Wording that tends to mark a damaged or stripped item, -3 each.
pub const DEFAULT_NEGATIVE_PHRASES: &[&str] = &[
    "cassé",
    "hs",
    "hors service",
    "à réparer",
    "écran fissuré",
    "boîte vide",
    "ne fonctionne pas",
    "problème",
    "non fonctionnel",
    "pour pièces",
    "incomplet",
];

/// Scores listing text against the configured phrase lists and drops anything
/// that does not come out strictly positive.
pub struct QualityFilter {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl QualityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            positive: config.positive_phrases,
            negative: config.negative_phrases,
        }
    }

    /// Phrase score for one listing: +2 per positive phrase found as a
    /// substring of the lowercased text, -3 per negative phrase. Each phrase
    /// counts once regardless of how often it appears.
    pub fn score(&self, listing: &Listing) -> i32 {
        let text = listing.text().to_lowercase();
        let mut score = 0;
        for phrase in &self.positive {
            if text.contains(phrase.as_str()) {
                score += 2;
            }
        }
        for phrase in &self.negative {
            if text.contains(phrase.as_str()) {
                score -= 3;
            }
        }
        score
    }

    /// Score every listing in place and retain only `score > 0`. A listing
    /// matching no phrase at all scores 0 and is dropped too.
    pub fn apply(&self, listings: &mut Vec<Listing>) {
        for listing in listings.iter_mut() {
            listing.quality_score = self.score(listing);
        }
        listings.retain(|l| {
            if l.quality_score <= 0 {
                debug!("⏭️  Dropped (score {}): {}", l.quality_score, l.title);
            }
            l.quality_score > 0
        });
    }
}
