use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-tracked (from, to) currency pair, e.g. `BTC/USD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackedPair {
    pub from: String,
    pub to: String,
}

impl TrackedPair {
    /// Create a new pair. Codes are kept exactly as given; matching is case-sensitive.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for TrackedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

impl FromStr for TrackedPair {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("Invalid pair {:?}: expected FROM/TO", s))?;
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            anyhow::bail!("Invalid pair {:?}: empty currency code", s);
        }
        Ok(Self::new(from, to))
    }
}

/// Price snapshot for a pair as returned by the remote price source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub pair: TrackedPair,
    pub price: f64,
    pub change_pct_24h: f64,
    pub full_name: Option<String>,
    pub image_url: Option<String>,
    pub open_24h: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub market: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

impl PriceQuote {
    /// Create a quote carrying only price and 24h change
    pub fn new(pair: TrackedPair, price: f64, change_pct_24h: f64) -> Self {
        Self {
            pair,
            price,
            change_pct_24h,
            full_name: None,
            image_url: None,
            open_24h: None,
            high_24h: None,
            low_24h: None,
            volume_24h: None,
            market_cap: None,
            market: None,
            last_update: None,
        }
    }

    /// Absolute 24h price change derived from the open price, when known
    pub fn change_24h(&self) -> Option<f64> {
        self.open_24h.map(|open| self.price - open)
    }
}
