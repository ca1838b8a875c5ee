use serde::{Deserialize, Serialize};

/// One classified ad as it moves through the pipeline.
///
/// Listings are rebuilt from scratch every cycle; only the link survives
/// between cycles, inside the seen set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Canonical ad URL. Globally unique, used as the dedup key.
    pub link: String,
    pub title: String,
    /// May be empty: a failed or timed-out description fetch degrades to "".
    #[serde(default)]
    pub description: String,
    /// Asking price in euros. `None` keeps the listing out of model training
    /// and out of deal detection.
    pub price: Option<u32>,
    // Filled in as the listing moves through the pipeline.
    #[serde(default)]
    pub quality_score: i32,
    #[serde(default)]
    pub estimated_price: Option<f64>,
}

impl Listing {
    /// Title and description joined into the text the filter and the price
    /// model both operate on.
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Estimated value minus asking price. The deal ranking key.
    pub fn delta(&self) -> Option<f64> {
        match (self.price, self.estimated_price) {
            (Some(price), Some(estimate)) => Some(estimate - f64::from(price)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(price: Option<u32>, estimate: Option<f64>) -> Listing {
        Listing {
            link: "https://www.leboncoin.fr/ad/1".to_string(),
            title: "PS5".to_string(),
            description: "comme neuve".to_string(),
            price,
            quality_score: 0,
            estimated_price: estimate,
        }
    }

    #[test]
    fn test_text_joins_title_and_description() {
        assert_eq!(listing(None, None).text(), "PS5 comme neuve");
    }

    #[test]
    fn test_delta_requires_both_prices() {
        assert_eq!(listing(Some(100), Some(250.0)).delta(), Some(150.0));
        assert_eq!(listing(None, Some(250.0)).delta(), None);
        assert_eq!(listing(Some(100), None).delta(), None);
    }

    #[test]
    fn test_deserializes_without_computed_fields() {
        let json = r#"{"link":"https://x/ad/1","title":"PS5","price":450}"#;
        let parsed: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.price, Some(450));
        assert_eq!(parsed.description, "");
        assert_eq!(parsed.quality_score, 0);
        assert!(parsed.estimated_price.is_none());
    }
}
