//! CryptoCompare payloads.
//!
//! Endpoints:
//! - `/data/pricemultifull?fsyms=..&tsyms=..` quotes for the cross product of
//!   requested bases and quotes
//! - `/data/all/coinlist` full coin catalogue

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{CoinInfo, PriceQuote, TrackedPair};
use crate::tracker::reconcile::PriceRequest;

pub const DEFAULT_BASE_URL: &str = "https://min-api.cryptocompare.com";

/// Multi-pair price endpoint, parameters come from [`price_query`]
pub fn price_url(base_url: &str) -> String {
    format!("{}/data/pricemultifull", base_url.trim_end_matches('/'))
}

/// Query parameters for a price request, left unencoded
pub fn price_query(request: &PriceRequest) -> [(&'static str, &str); 2] {
    [("fsyms", request.fsyms.as_str()), ("tsyms", request.tsyms.as_str())]
}

/// Build the coin catalogue URL
pub fn coin_list_url(base_url: &str) -> String {
    format!("{}/data/all/coinlist", base_url.trim_end_matches('/'))
}

#[derive(Debug, Deserialize)]
struct PriceMultiFullResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "RAW", default)]
    raw: HashMap<String, HashMap<String, RawQuote>>,
}

#[derive(Debug, Deserialize)]
struct RawQuote {
    #[serde(rename = "PRICE", default)]
    price: f64,
    #[serde(rename = "CHANGEPCT24HOUR", default)]
    change_pct_24h: f64,
    #[serde(rename = "OPEN24HOUR", default)]
    open_24h: Option<f64>,
    #[serde(rename = "HIGH24HOUR", default)]
    high_24h: Option<f64>,
    #[serde(rename = "LOW24HOUR", default)]
    low_24h: Option<f64>,
    #[serde(rename = "VOLUME24HOUR", default)]
    volume_24h: Option<f64>,
    #[serde(rename = "MKTCAP", default)]
    market_cap: Option<f64>,
    #[serde(rename = "MARKET", default)]
    market: Option<String>,
    #[serde(rename = "LASTUPDATE", default)]
    last_update: Option<i64>,
}

/// Error payloads come back with HTTP 200 and `"Response": "Error"`
fn check_response(response: Option<&str>, message: Option<&str>) -> Result<()> {
    if response == Some("Error") {
        return Err(anyhow!(
            "CryptoCompare error: {}",
            message.unwrap_or("unknown error")
        ));
    }
    Ok(())
}

/// Parse a `pricemultifull` body into quotes, sorted by pair
pub fn parse_price_multi_full(body: &str) -> Result<Vec<PriceQuote>> {
    let response: PriceMultiFullResponse =
        serde_json::from_str(body).context("Failed to parse pricemultifull response")?;
    check_response(response.response.as_deref(), response.message.as_deref())?;

    let mut quotes: Vec<PriceQuote> = response
        .raw
        .into_iter()
        .flat_map(|(from, by_to)| {
            by_to.into_iter().map(move |(to, raw)| PriceQuote {
                pair: TrackedPair::new(from.clone(), to),
                price: raw.price,
                change_pct_24h: raw.change_pct_24h,
                full_name: None,
                image_url: None,
                open_24h: raw.open_24h,
                high_24h: raw.high_24h,
                low_24h: raw.low_24h,
                volume_24h: raw.volume_24h,
                market_cap: raw.market_cap,
                market: raw.market,
                last_update: raw.last_update.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            })
        })
        .collect();

    quotes.sort_by(|a, b| a.pair.cmp(&b.pair));
    Ok(quotes)
}

#[derive(Debug, Deserialize)]
struct CoinListResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "BaseImageUrl", default)]
    base_image_url: String,
    #[serde(rename = "Data", default)]
    data: HashMap<String, RawCoin>,
}

#[derive(Debug, Deserialize)]
struct RawCoin {
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "CoinName", default)]
    coin_name: String,
    #[serde(rename = "FullName", default)]
    full_name: String,
    #[serde(rename = "ImageUrl", default)]
    image_url: Option<String>,
    #[serde(rename = "SortOrder", default)]
    sort_order: Option<String>,
}

/// Parse a `coinlist` body, ordered by the source's sort order
pub fn parse_coin_list(body: &str) -> Result<Vec<CoinInfo>> {
    let response: CoinListResponse =
        serde_json::from_str(body).context("Failed to parse coinlist response")?;
    check_response(response.response.as_deref(), response.message.as_deref())?;

    let base = response.base_image_url.trim_end_matches('/').to_string();
    let mut coins: Vec<CoinInfo> = response
        .data
        .into_values()
        .map(|raw| CoinInfo {
            image_url: raw
                .image_url
                .filter(|path| !path.is_empty())
                .map(|path| format!("{}{}", base, path))
                .unwrap_or_default(),
            sort_order: raw.sort_order.and_then(|s| s.trim().parse().ok()),
            symbol: raw.symbol,
            coin_name: raw.coin_name,
            full_name: raw.full_name,
        })
        .collect();

    coins.sort_by(|a, b| {
        a.sort_order
            .unwrap_or(u32::MAX)
            .cmp(&b.sort_order.unwrap_or(u32::MAX))
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    Ok(coins)
}
