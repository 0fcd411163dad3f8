//! CoinMarketCap ticker payloads (`/v1/ticker/?limit=N`).

use anyhow::{Context, Result};

use crate::models::TopCoin;

pub const DEFAULT_BASE_URL: &str = "https://api.coinmarketcap.com";

/// Ticker endpoint, takes a `limit` query parameter
pub fn ticker_url(base_url: &str) -> String {
    format!("{}/v1/ticker/", base_url.trim_end_matches('/'))
}

/// Parse a ticker body, ordered by rank
pub fn parse_ticker(body: &str) -> Result<Vec<TopCoin>> {
    let mut coins: Vec<TopCoin> =
        serde_json::from_str(body).context("Failed to parse ticker response")?;
    coins.sort_by_key(|coin| coin.rank.trim().parse::<u32>().unwrap_or(u32::MAX));
    Ok(coins)
}
