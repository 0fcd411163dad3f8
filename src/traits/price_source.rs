use async_trait::async_trait;

use crate::models::{CoinInfo, PriceQuote, TopCoin, TrackedPair};

/// Remote source of prices and coin metadata
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch current quotes for the given pairs.
    ///
    /// The result may contain quotes for pairs that were not asked for;
    /// callers filter against their tracked set.
    async fn fetch_prices(&self, pairs: &[TrackedPair]) -> anyhow::Result<Vec<PriceQuote>>;

    /// Fetch the full coin catalogue
    async fn fetch_coin_list(&self) -> anyhow::Result<Vec<CoinInfo>>;

    /// Fetch the top `limit` coins by market cap
    async fn fetch_top_coins(&self, limit: usize) -> anyhow::Result<Vec<TopCoin>>;
}
