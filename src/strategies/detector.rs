use tracing::debug;

use crate::config::DetectorConfig;
use crate::leboncoin::types::Listing;

/// Flags listings priced well below the model's estimate and ranks them by
/// how far below they sit.
pub struct DealDetector {
    threshold_ratio: f64,
}

impl DealDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            threshold_ratio: config.deal_threshold_ratio,
        }
    }

    /// Listings where `price < threshold_ratio × estimated_price`, sorted by
    /// descending delta (estimate minus price). Listings missing either price
    /// are skipped, not errored. The sort is stable, so equal deltas keep
    /// their input order.
    pub fn detect(&self, listings: &[Listing]) -> Vec<Listing> {
        let mut deals: Vec<(f64, Listing)> = listings
            .iter()
            .filter_map(|l| {
                let price = l.price?;
                let estimate = l.estimated_price?;
                if f64::from(price) < self.threshold_ratio * estimate {
                    Some((l.delta()?, l.clone()))
                } else {
                    debug!(
                        "🔍 {} holds its price ({} € vs {:.0} € estimated)",
                        l.title, price, estimate
                    );
                    None
                }
            })
            .collect();
        deals.sort_by(|a, b| b.0.total_cmp(&a.0));
        deals.into_iter().map(|(_, l)| l).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(ratio: f64) -> DealDetector {
        DealDetector::new(DetectorConfig {
            deal_threshold_ratio: ratio,
        })
    }

    fn listing(link: &str, price: Option<u32>, estimate: Option<f64>) -> Listing {
        Listing {
            link: link.to_string(),
            title: link.to_string(),
            description: String::new(),
            price,
            quality_score: 1,
            estimated_price: estimate,
        }
    }

    #[test]
    fn test_only_sufficiently_underpriced_listings_pass() {
        let d = detector(0.7);
        let batch = vec![
            listing("cheap", Some(50), Some(400.0)),   // 0.125 < 0.7
            listing("fair", Some(350), Some(400.0)),   // 0.875, kept out
            listing("border", Some(280), Some(400.0)), // exactly 0.7, kept out
        ];
        let deals = d.detect(&batch);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].link, "cheap");
        for deal in &deals {
            let price = f64::from(deal.price.unwrap());
            assert!(price < 0.7 * deal.estimated_price.unwrap());
        }
    }

    #[test]
    fn test_output_sorted_by_descending_delta() {
        let d = detector(0.7);
        let batch = vec![
            listing("small", Some(60), Some(100.0)),  // delta 40
            listing("big", Some(100), Some(400.0)),   // delta 300
            listing("mid", Some(100), Some(250.0)),   // delta 150
        ];
        let deals = d.detect(&batch);
        let deltas: Vec<f64> = deals.iter().map(|l| l.delta().unwrap()).collect();
        for pair in deltas.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        assert_eq!(deals[0].link, "big");
    }

    #[test]
    fn test_missing_price_or_estimate_is_skipped() {
        let d = detector(0.7);
        let batch = vec![
            listing("no-price", None, Some(400.0)),
            listing("no-estimate", Some(50), None),
        ];
        assert!(d.detect(&batch).is_empty());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let batch = vec![listing("a", Some(80), Some(100.0))]; // ratio 0.8
        assert!(detector(0.7).detect(&batch).is_empty());
        assert_eq!(detector(0.9).detect(&batch).len(), 1);
    }

    #[test]
    fn test_equal_deltas_keep_input_order() {
        let d = detector(0.7);
        let batch = vec![
            listing("first", Some(100), Some(300.0)),
            listing("second", Some(100), Some(300.0)),
        ];
        let deals = d.detect(&batch);
        assert_eq!(deals[0].link, "first");
        assert_eq!(deals[1].link, "second");
    }
}
