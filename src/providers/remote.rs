use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Request};
use tracing::{debug, info};

use crate::models::{CoinInfo, PriceQuote, TopCoin, TrackedPair};
use crate::providers::{coinmarketcap, cryptocompare};
use crate::tracker::reconcile::{price_request, PriceRequest};
use crate::traits::price_source::PriceSource;

/// HTTP price source backed by CryptoCompare and CoinMarketCap
pub struct RemotePriceSource {
    client: Client,
    cryptocompare_url: String,
    coinmarketcap_url: String,
}

impl RemotePriceSource {
    /// Create a new remote price source
    pub fn new(cryptocompare_url: String, coinmarketcap_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            cryptocompare_url,
            coinmarketcap_url,
        })
    }

    fn prices_http_request(&self, request: &PriceRequest) -> Result<Request> {
        self.client
            .get(cryptocompare::price_url(&self.cryptocompare_url))
            .query(&cryptocompare::price_query(request))
            .build()
            .context("Failed to build price request")
    }

    fn top_coins_http_request(&self, limit: usize) -> Result<Request> {
        self.client
            .get(coinmarketcap::ticker_url(&self.coinmarketcap_url))
            .query(&[("limit", limit)])
            .build()
            .context("Failed to build ticker request")
    }

    async fn fetch_text(&self, request: Request) -> Result<String> {
        let url = request.url().clone();
        debug!("GET {}", url);
        let response = self
            .client
            .execute(request)
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Request to {} returned status {}", url, status);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", url))
    }
}

#[async_trait]
impl PriceSource for RemotePriceSource {
    async fn fetch_prices(&self, pairs: &[TrackedPair]) -> Result<Vec<PriceQuote>> {
        let Some(request) = price_request(pairs) else {
            return Ok(Vec::new());
        };

        let body = self.fetch_text(self.prices_http_request(&request)?).await?;
        let quotes = cryptocompare::parse_price_multi_full(&body)?;

        debug!("Fetched {} quotes for {} pairs", quotes.len(), pairs.len());
        Ok(quotes)
    }

    async fn fetch_coin_list(&self) -> Result<Vec<CoinInfo>> {
        let request = self
            .client
            .get(cryptocompare::coin_list_url(&self.cryptocompare_url))
            .build()
            .context("Failed to build coin list request")?;
        let body = self.fetch_text(request).await?;
        let coins = cryptocompare::parse_coin_list(&body)?;

        info!("Fetched coin catalogue with {} entries", coins.len());
        Ok(coins)
    }

    async fn fetch_top_coins(&self, limit: usize) -> Result<Vec<TopCoin>> {
        let body = self.fetch_text(self.top_coins_http_request(limit)?).await?;
        coinmarketcap::parse_ticker(&body)
    }
}
