//! Text-to-price regression: a TF-IDF vectorizer over the batch's listing
//! text feeding a ridge regression of price on term weights.
//!
//! The model is deliberately fit on the cycle's own filtered batch and then
//! used to predict that same batch. There is no historical corpus; the
//! "estimated price" is an in-batch fit, which is exactly what makes cheap
//! outliers stand out against their peers.

use ndarray::{Array1, Array2};
use std::collections::HashMap;
use thiserror::Error;

use crate::config::ModelConfig;
use crate::leboncoin::types::Listing;

/// Common French function words stripped before building the vocabulary.
const FRENCH_STOP_WORDS: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "cette", "dans", "de", "des", "du", "elle", "en", "est",
    "et", "eux", "il", "ils", "je", "la", "le", "les", "leur", "lui", "ma", "mais", "me", "mes",
    "moi", "mon", "ne", "nos", "notre", "nous", "on", "ou", "où", "par", "pas", "plus", "pour",
    "qu", "que", "qui", "sa", "se", "ses", "son", "sont", "sur", "ta", "te", "tes", "toi", "ton",
    "tu", "un", "une", "vos", "votre", "vous",
];

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("not enough priced listings to fit a model ({got} < {min})")]
    InsufficientData { got: usize, min: usize },
}

/// A fitted vectorizer + regression. Rebuilt from scratch every cycle and
/// never persisted.
pub struct PriceModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    weights: Array1<f64>,
    intercept: f64,
}

impl PriceModel {
    /// Fit on the listings that carry a price. Listings without one are
    /// ignored here; the caller keeps them in the batch for prediction.
    pub fn fit(listings: &[Listing], config: &ModelConfig) -> Result<Self, EstimatorError> {
        let priced: Vec<&Listing> = listings.iter().filter(|l| l.price.is_some()).collect();
        let min = config.min_train_listings.max(2);
        if priced.len() < min {
            return Err(EstimatorError::InsufficientData { got: priced.len(), min });
        }

        let docs: Vec<Vec<String>> = priced.iter().map(|l| tokenize(&l.text())).collect();
        let (vocabulary, idf) = build_vocabulary(&docs, config.max_features);

        let n = docs.len();
        let d = vocabulary.len();
        let mut x = Array2::<f64>::zeros((n, d));
        for (i, doc) in docs.iter().enumerate() {
            let row = tfidf_row(doc, &vocabulary, &idf);
            for (j, v) in row.into_iter().enumerate() {
                x[[i, j]] = v;
            }
        }
        let y = Array1::from_iter(
            priced
                .iter()
                .map(|l| f64::from(l.price.unwrap_or_default())),
        );

        let (weights, intercept) = ridge_fit(&x, &y, config.ridge_alpha);

        Ok(Self {
            vocabulary,
            idf,
            weights,
            intercept,
        })
    }

    /// Predicted price for one listing: transform its text with the fitted
    /// vocabulary and idf weights, then apply the regression. Tokens the fit
    /// never saw contribute nothing; an all-unknown text lands on the
    /// intercept.
    pub fn predict(&self, listing: &Listing) -> f64 {
        let doc = tokenize(&listing.text());
        let row = tfidf_row(&doc, &self.vocabulary, &self.idf);
        let x = Array1::from(row);
        x.dot(&self.weights) + self.intercept
    }

    /// Fill `estimated_price` on every listing in the batch.
    pub fn estimate(&self, listings: &mut [Listing]) {
        for listing in listings.iter_mut() {
            listing.estimated_price = Some(self.predict(listing));
        }
    }
}

/// Lowercased runs of at least two word characters (alphanumerics plus
/// underscore), stop words removed. Accented letters count, so "état"
/// survives as one token.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !FRENCH_STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Vocabulary of the `max_features` most frequent terms (total count across
/// the batch, ties lexicographic), with smooth idf weights. Indices are
/// assigned in sorted term order so the mapping is deterministic.
fn build_vocabulary(docs: &[Vec<String>], max_features: usize) -> (HashMap<String, usize>, Vec<f64>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    for doc in docs {
        for token in doc {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        let mut seen: Vec<&str> = doc.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for token in seen {
            *doc_freq.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(max_features);

    let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
    terms.sort_unstable();

    let n = docs.len() as f64;
    let mut vocabulary = HashMap::with_capacity(terms.len());
    let mut idf = Vec::with_capacity(terms.len());
    for (index, term) in terms.into_iter().enumerate() {
        let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
        vocabulary.insert(term.to_string(), index);
        idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
    }
    (vocabulary, idf)
}

/// L2-normalized tf-idf vector for one tokenized document.
fn tfidf_row(doc: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> Vec<f64> {
    let mut row = vec![0.0; vocabulary.len()];
    for token in doc {
        if let Some(&j) = vocabulary.get(token) {
            row[j] += idf[j];
        }
    }
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in &mut row {
            *v /= norm;
        }
    }
    row
}

/// Ridge with an unpenalized intercept: center the data, solve in the sample
/// space (`w = Xcᵀ(XcXcᵀ + αI)⁻¹ yc`, exact for any α > 0), recover the
/// intercept from the means. The batch is at most a few dozen rows, so the
/// n×n solve is trivial.
fn ridge_fit(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> (Array1<f64>, f64) {
    let n = x.nrows();
    let x_mean = x.mean_axis(ndarray::Axis(0)).unwrap_or_else(|| Array1::zeros(x.ncols()));
    let y_mean = y.mean().unwrap_or(0.0);
    let xc = x - &x_mean.view().insert_axis(ndarray::Axis(0));
    let yc = y - y_mean;

    let mut gram = xc.dot(&xc.t());
    for i in 0..n {
        gram[[i, i]] += alpha;
    }
    let dual = solve_symmetric(gram, yc);
    let weights = xc.t().dot(&dual);
    let intercept = y_mean - x_mean.dot(&weights);
    (weights, intercept)
}

/// Gaussian elimination with partial pivoting. The caller only passes
/// `XcXcᵀ + αI`, which is positive definite for α > 0, so a vanishing pivot
/// cannot occur; the guard just freezes that variable instead of dividing by
/// zero.
fn solve_symmetric(mut a: Array2<f64>, mut b: Array1<f64>) -> Array1<f64> {
    let n = b.len();
    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if pivot != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot, k]];
                a[[pivot, k]] = tmp;
            }
            b.swap(col, pivot);
        }
        let diag = a[[col, col]];
        if diag.abs() < f64::EPSILON {
            continue;
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / diag;
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::zeros(n);
    for col in (0..n).rev() {
        let mut sum = b[col];
        for k in col + 1..n {
            sum -= a[[col, k]] * x[k];
        }
        let diag = a[[col, col]];
        x[col] = if diag.abs() < f64::EPSILON { 0.0 } else { sum / diag };
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            max_features: 3000,
            ridge_alpha: 1.0,
            min_train_listings: 2,
        }
    }

    fn listing(link: &str, title: &str, description: &str, price: Option<u32>) -> Listing {
        Listing {
            link: link.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price,
            quality_score: 0,
            estimated_price: None,
        }
    }

    #[test]
    fn test_tokenize_drops_short_tokens_and_stop_words() {
        let tokens = tokenize("La PS5 est en très bon état, à 200 €");
        assert_eq!(tokens, vec!["ps5", "très", "bon", "état", "200"]);
    }

    #[test]
    fn test_tokenize_keeps_accented_words_whole() {
        assert_eq!(tokenize("boîte scellée"), vec!["boîte", "scellée"]);
    }

    #[test]
    fn test_tokenize_treats_underscore_as_a_word_character() {
        assert_eq!(tokenize("ps5_pro vendu"), vec!["ps5_pro", "vendu"]);
    }

    #[test]
    fn test_insufficient_data_on_tiny_batch() {
        let batch = vec![listing("a", "PS5 neuve", "", Some(400))];
        match PriceModel::fit(&batch, &config()) {
            Err(EstimatorError::InsufficientData { got, min }) => {
                assert_eq!(got, 1);
                assert_eq!(min, 2);
            }
            _ => panic!("expected InsufficientData"),
        }
    }

    #[test]
    fn test_unpriced_listings_do_not_count_toward_training() {
        let batch = vec![
            listing("a", "PS5 neuve", "", None),
            listing("b", "PS5 occasion", "", None),
            listing("c", "PS5", "", Some(300)),
        ];
        assert!(PriceModel::fit(&batch, &config()).is_err());
    }

    #[test]
    fn test_constant_price_batch_predicts_that_price() {
        let batch = vec![
            listing("a", "PS5 neuve avec facture", "", Some(400)),
            listing("b", "PS5 occasion propre", "", Some(400)),
            listing("c", "console PS5 grise", "", Some(400)),
        ];
        let model = PriceModel::fit(&batch, &config()).unwrap();
        for l in &batch {
            assert!((model.predict(l) - 400.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_tokens_fall_back_to_batch_mean_on_flat_prices() {
        let batch = vec![
            listing("a", "PS5 neuve", "", Some(250)),
            listing("b", "PS5 occasion", "", Some(250)),
        ];
        let model = PriceModel::fit(&batch, &config()).unwrap();
        let alien = listing("z", "vélo hollandais", "", None);
        assert!((model.predict(&alien) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_texts_get_identical_predictions() {
        let batch = vec![
            listing("a", "PS5 avec manette", "", Some(100)),
            listing("b", "PS5 avec manette", "", Some(300)),
            listing("c", "PS5 seule", "", Some(200)),
        ];
        let model = PriceModel::fit(&batch, &config()).unwrap();
        assert!((model.predict(&batch[0]) - model.predict(&batch[1])).abs() < 1e-9);
    }

    #[test]
    fn test_text_signal_orders_predictions() {
        // Expensive wording vs cheap wording across a clean split.
        let batch = vec![
            listing("a", "PS5 édition collector scellée", "", Some(600)),
            listing("b", "PS5 édition collector scellée", "", Some(580)),
            listing("c", "PS5 abîmée sans manette", "", Some(150)),
            listing("d", "PS5 abîmée sans manette", "", Some(170)),
        ];
        let model = PriceModel::fit(&batch, &config()).unwrap();
        assert!(model.predict(&batch[0]) > model.predict(&batch[2]));
    }

    #[test]
    fn test_estimate_fills_every_listing() {
        let mut batch = vec![
            listing("a", "PS5 neuve", "", Some(400)),
            listing("b", "PS5 occasion", "", Some(250)),
            listing("c", "PS5 sans prix", "", None),
        ];
        let model = PriceModel::fit(&batch, &config()).unwrap();
        model.estimate(&mut batch);
        assert!(batch.iter().all(|l| l.estimated_price.is_some()));
    }

    #[test]
    fn test_vocabulary_cap_keeps_most_frequent_terms() {
        let docs = vec![
            tokenize("ps5 ps5 ps5 manette"),
            tokenize("ps5 manette câble"),
        ];
        let (vocab, idf) = build_vocabulary(&docs, 2);
        assert_eq!(vocab.len(), 2);
        assert_eq!(idf.len(), 2);
        assert!(vocab.contains_key("ps5"));
        assert!(vocab.contains_key("manette"));
        assert!(!vocab.contains_key("câble"));
    }

    #[test]
    fn test_vocabulary_ties_break_lexicographically() {
        let docs = vec![tokenize("zz aa mm")];
        let (vocab, _) = build_vocabulary(&docs, 2);
        assert!(vocab.contains_key("aa"));
        assert!(vocab.contains_key("mm"));
        assert!(!vocab.contains_key("zz"));
    }
}
