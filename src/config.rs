use serde::{Deserialize, Serialize};
use std::env;

use crate::strategies::quality::{DEFAULT_NEGATIVE_PHRASES, DEFAULT_POSITIVE_PHRASES};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub search: SearchConfig,
    pub agent: AgentConfig,
    pub filter: FilterConfig,
    pub model: ModelConfig,
    pub detector: DetectorConfig,
    pub http: HttpConfig,
    pub seen_file: String,
    pub discord_webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub query: String,
    pub location: String,
    pub max_listings: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub refresh_interval_minutes: u64,
    pub paper_alerts: bool,
    pub simulation_mode: bool,
    pub simulation_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    pub positive_phrases: Vec<String>,
    pub negative_phrases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    pub max_features: usize,
    pub ridge_alpha: f64,
    pub min_train_listings: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    pub deal_threshold_ratio: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub description_fetch_delay_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let search = SearchConfig {
            query: env::var("LBC_QUERY").unwrap_or_else(|_| "ps5".to_string()),
            location: env::var("LBC_LOCATION").unwrap_or_else(|_| "paris".to_string()),
            max_listings: env::var("MAX_LISTINGS_PER_CYCLE")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        };

        let agent = AgentConfig {
            // Clamped to 1: a zero interval would turn the scan loop into a
            // hammering of the search page.
            refresh_interval_minutes: env::var("REFRESH_INTERVAL_MINUTES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10)
                .max(1),
            paper_alerts: env::var("PAPER_ALERTS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            simulation_mode: env::var("SIMULATION_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            simulation_file: env::var("SIMULATION_FILE")
                .unwrap_or_else(|_| "listings.json".to_string()),
        };

        let filter = FilterConfig {
            positive_phrases: phrases_from_env("POSITIVE_PHRASES", DEFAULT_POSITIVE_PHRASES),
            negative_phrases: phrases_from_env("NEGATIVE_PHRASES", DEFAULT_NEGATIVE_PHRASES),
        };

        let model = ModelConfig {
            max_features: env::var("MODEL_MAX_FEATURES")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            ridge_alpha: env::var("RIDGE_ALPHA")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .unwrap_or(1.0),
            min_train_listings: env::var("MIN_TRAIN_LISTINGS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2)
                .max(2),
        };

        let detector = DetectorConfig {
            deal_threshold_ratio: env::var("DEAL_THRESHOLD_RATIO")
                .unwrap_or_else(|_| "0.7".to_string())
                .parse()
                .unwrap_or(0.7),
        };

        let http = HttpConfig {
            timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            description_fetch_delay_ms: env::var("DESCRIPTION_FETCH_DELAY_MS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
        };

        Ok(Config {
            search,
            agent,
            filter,
            model,
            detector,
            http,
            seen_file: env::var("SEEN_FILE").unwrap_or_else(|_| "seen.json".to_string()),
            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL").ok(),
        })
    }
}

/// Comma-separated env override for a phrase list, falling back to the
/// built-in French defaults.
fn phrases_from_env(var: &str, defaults: &[&str]) -> Vec<String> {
    match env::var(var) {
        Ok(raw) => raw
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect(),
        Err(_) => defaults.iter().map(|p| p.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_parsing_trims_and_lowercases() {
        std::env::set_var("TEST_PHRASES_A", " Neuf , sous GARANTIE ,, ");
        let phrases = phrases_from_env("TEST_PHRASES_A", DEFAULT_POSITIVE_PHRASES);
        assert_eq!(phrases, vec!["neuf".to_string(), "sous garantie".to_string()]);
    }

    #[test]
    fn test_phrase_default_fallback() {
        let phrases = phrases_from_env("TEST_PHRASES_UNSET", DEFAULT_NEGATIVE_PHRASES);
        assert_eq!(phrases.len(), DEFAULT_NEGATIVE_PHRASES.len());
        assert!(phrases.contains(&"cassé".to_string()));
    }
}
