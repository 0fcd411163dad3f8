//! Runtime configuration read from the environment (and `.env` via dotenvy)

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;

use crate::models::TrackedPair;
use crate::providers::{coinmarketcap, cryptocompare};

#[derive(Debug, Clone)]
pub struct Config {
    pub cryptocompare_url: String,
    pub coinmarketcap_url: String,
    pub database_path: String,
    /// Pairs seeded into the store on start
    pub tracked_pairs: Vec<TrackedPair>,
    pub refresh_interval: Duration,
    pub top_coins_limit: usize,
    pub http_timeout: Duration,
    pub log_level: LevelFilter,
}

impl Config {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let tracked_pairs = parse_pairs(&var("TRACKED_PAIRS", ""))?;

        let refresh_secs: u64 = var("REFRESH_INTERVAL_SECS", "60")
            .parse()
            .context("REFRESH_INTERVAL_SECS must be a whole number of seconds")?;
        let timeout_secs: u64 = var("HTTP_TIMEOUT_SECS", "10")
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?;
        let top_coins_limit = var("TOP_COINS_LIMIT", "100")
            .parse()
            .context("TOP_COINS_LIMIT must be a positive number")?;
        let log_level = var("LOG_LEVEL", "info")
            .parse()
            .context("LOG_LEVEL must be one of off, error, warn, info, debug, trace")?;

        Ok(Self {
            cryptocompare_url: var("CRYPTOCOMPARE_URL", cryptocompare::DEFAULT_BASE_URL),
            coinmarketcap_url: var("COINMARKETCAP_URL", coinmarketcap::DEFAULT_BASE_URL),
            database_path: var("DATABASE_PATH", "coin_tracker.db"),
            tracked_pairs,
            refresh_interval: Duration::from_secs(refresh_secs.max(1)),
            top_coins_limit,
            http_timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }
}

/// Parse a comma separated `FROM/TO` list
fn parse_pairs(raw: &str) -> Result<Vec<TrackedPair>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<TrackedPair>()
                .with_context(|| format!("Invalid entry in TRACKED_PAIRS: {}", entry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.cryptocompare_url, "https://min-api.cryptocompare.com");
        assert_eq!(config.coinmarketcap_url, "https://api.coinmarketcap.com");
        assert_eq!(config.database_path, "coin_tracker.db");
        assert!(config.tracked_pairs.is_empty());
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.top_coins_limit, 100);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.log_level, LevelFilter::INFO);
    }

    #[test]
    fn parses_tracked_pairs() {
        let config = config_from(&[("TRACKED_PAIRS", "BTC/USD, ETH/EUR,,")]).unwrap();
        assert_eq!(
            config.tracked_pairs,
            vec![TrackedPair::new("BTC", "USD"), TrackedPair::new("ETH", "EUR")]
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(config_from(&[("TRACKED_PAIRS", "BTCUSD")]).is_err());
        assert!(config_from(&[("REFRESH_INTERVAL_SECS", "soon")]).is_err());
        assert!(config_from(&[("LOG_LEVEL", "loud")]).is_err());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("LOG_LEVEL", "  "), ("TOP_COINS_LIMIT", "25")]).unwrap();
        assert_eq!(config.log_level, LevelFilter::INFO);
        assert_eq!(config.top_coins_limit, 25);
    }
}
