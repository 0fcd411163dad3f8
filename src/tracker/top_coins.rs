use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::models::{DisplayItem, TopCoin, TrackedPair};
use crate::render::top_coin_rows;
use crate::tracker::queries::is_coin_added;
use crate::traits::{coin_store::CoinStore, price_source::PriceSource, view::TopCoinsView};

/// Quote currency used when a coin is added from the top list
pub const DEFAULT_QUOTE_CURRENCY: &str = "USD";

/// Top coins by market cap, with "add to tracked" support
pub struct TopCoinsTracker {
    price_source: Arc<dyn PriceSource>,
    store: Arc<dyn CoinStore>,
    view: Arc<dyn TopCoinsView>,
    coins: Vec<TopCoin>,
}

impl TopCoinsTracker {
    pub fn new(
        price_source: Arc<dyn PriceSource>,
        store: Arc<dyn CoinStore>,
        view: Arc<dyn TopCoinsView>,
    ) -> Self {
        Self {
            price_source,
            store,
            view,
            coins: Vec::new(),
        }
    }

    /// Loaded coins in rank order
    pub fn coins(&self) -> &[TopCoin] {
        &self.coins
    }

    /// Fetch the top `limit` coins and render them
    pub async fn load(&mut self, limit: usize) -> Result<usize> {
        let mut coins = self.price_source.fetch_top_coins(limit).await?;

        for coin in coins.iter_mut().filter(|c| c.image_url.is_none()) {
            if let Some(info) = self.store.coin_info(&coin.symbol).await? {
                coin.image_url = Some(info.image_url).filter(|url| !url.is_empty());
            }
        }

        info!("Loaded {} top coins", coins.len());
        self.coins = coins;
        self.render().await?;
        Ok(self.coins.len())
    }

    /// Re-render against the current tracked set
    pub async fn render(&self) -> Result<()> {
        let tracked = self.store.snapshot().await?;
        self.view.render(&top_coin_rows(&self.coins, &tracked));
        Ok(())
    }

    /// Track `symbol` against the default quote currency.
    /// Returns `false` if the coin was already tracked.
    pub async fn add_coin(&self, symbol: &str) -> Result<bool> {
        let coin = self
            .coins
            .iter()
            .find(|coin| coin.symbol == symbol)
            .ok_or_else(|| anyhow!("{} is not in the top coins list", symbol))?;

        let tracked = self.store.snapshot().await?;
        if is_coin_added(&tracked, symbol) {
            debug!("{} is already tracked", symbol);
            return Ok(false);
        }

        let (full_name, image_url) = match self.store.coin_info(symbol).await? {
            Some(info) => (info.full_name, info.image_url),
            None => (
                format!("{} ({})", coin.name, coin.symbol),
                coin.image_url.clone().unwrap_or_default(),
            ),
        };
        let item = DisplayItem::new(TrackedPair::new(symbol, DEFAULT_QUOTE_CURRENCY))
            .with_info(full_name, image_url);

        let added = self.store.add_pair(item).await?;
        if added {
            info!("Now tracking {}/{}", symbol, DEFAULT_QUOTE_CURRENCY);
            self.view.show_added(coin);
            self.render().await?;
        }
        Ok(added)
    }
}
