use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::models::{CoinInfo, DisplayItem, Holding, TrackedPair};
use crate::traits::coin_store::CoinStore;

/// In-process store, nothing survives a restart
pub struct MemoryStore {
    items: RwLock<Vec<DisplayItem>>,
    coin_info: Arc<DashMap<String, CoinInfo>>,
    holdings: RwLock<Vec<Holding>>,
    snapshots: watch::Sender<Vec<DisplayItem>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(Vec::new());
        Self {
            items: RwLock::new(Vec::new()),
            coin_info: Arc::new(DashMap::new()),
            holdings: RwLock::new(Vec::new()),
            snapshots,
        }
    }

    /// Create a store already tracking the given pairs
    pub fn with_pairs(pairs: impl IntoIterator<Item = TrackedPair>) -> Self {
        let items: Vec<DisplayItem> = pairs.into_iter().map(DisplayItem::new).collect();
        let mut store = Self::new();
        store.snapshots.send_replace(items.clone());
        store.items = RwLock::new(items);
        store
    }

    fn publish(&self, items: &[DisplayItem]) {
        self.snapshots.send_replace(stored(items));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip transient state before handing items out
fn stored(items: &[DisplayItem]) -> Vec<DisplayItem> {
    items
        .iter()
        .cloned()
        .map(|mut item| {
            item.selected = false;
            item
        })
        .collect()
}

#[async_trait]
impl CoinStore for MemoryStore {
    async fn replace_all(&self, snapshot: &[DisplayItem]) -> anyhow::Result<()> {
        let mut items = self.items.write().await;
        for incoming in snapshot {
            match items.iter_mut().find(|item| item.pair == incoming.pair) {
                Some(existing) => *existing = incoming.clone(),
                None => items.push(incoming.clone()),
            }
        }
        debug!("Stored snapshot of {} items", snapshot.len());
        self.publish(&items);
        Ok(())
    }

    async fn add_pair(&self, item: DisplayItem) -> anyhow::Result<bool> {
        let mut items = self.items.write().await;
        if items.iter().any(|existing| existing.pair == item.pair) {
            return Ok(false);
        }
        items.push(item);
        self.publish(&items);
        Ok(true)
    }

    async fn delete(&self, pairs: &[TrackedPair]) -> anyhow::Result<usize> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| !pairs.contains(&item.pair));
        let removed = before - items.len();
        if removed > 0 {
            self.publish(&items);
        }
        Ok(removed)
    }

    async fn snapshot(&self) -> anyhow::Result<Vec<DisplayItem>> {
        Ok(stored(&self.items.read().await))
    }

    fn subscribe(&self) -> watch::Receiver<Vec<DisplayItem>> {
        self.snapshots.subscribe()
    }

    async fn save_coin_info(&self, coins: &[CoinInfo]) -> anyhow::Result<()> {
        for coin in coins {
            self.coin_info.insert(coin.symbol.clone(), coin.clone());
        }
        Ok(())
    }

    async fn coin_info(&self, symbol: &str) -> anyhow::Result<Option<CoinInfo>> {
        Ok(self.coin_info.get(symbol).map(|entry| entry.value().clone()))
    }

    async fn add_holding(&self, holding: Holding) -> anyhow::Result<()> {
        let mut holdings = self.holdings.write().await;
        match holdings.iter_mut().find(|h| h.pair == holding.pair) {
            Some(existing) => *existing = holding,
            None => holdings.push(holding),
        }
        Ok(())
    }

    async fn holdings(&self) -> anyhow::Result<Vec<Holding>> {
        Ok(self.holdings.read().await.clone())
    }

    async fn remove_holding(&self, pair: &TrackedPair) -> anyhow::Result<()> {
        self.holdings.write().await.retain(|h| &h.pair != pair);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceQuote;

    fn usd(code: &str) -> TrackedPair {
        TrackedPair::new(code, "USD")
    }

    #[tokio::test]
    async fn add_pair_rejects_duplicates() {
        let store = MemoryStore::new();
        assert!(store.add_pair(DisplayItem::new(usd("BTC"))).await.unwrap());
        assert!(!store.add_pair(DisplayItem::new(usd("BTC"))).await.unwrap());
        assert_eq!(store.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_all_updates_by_pair_and_publishes() {
        let store = MemoryStore::with_pairs([usd("BTC"), usd("ETH")]);
        let mut rx = store.subscribe();

        let mut eth = DisplayItem::new(usd("ETH"));
        eth.apply_quote(PriceQuote::new(usd("ETH"), 3000.0, -2.1));
        eth.selected = true;
        store.replace_all(&[eth]).await.unwrap();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].price(), None);
        assert_eq!(snapshot[1].price(), Some(3000.0));
        assert!(!snapshot[1].selected);
    }

    #[tokio::test]
    async fn delete_removes_only_named_pairs() {
        let store = MemoryStore::with_pairs([usd("A"), usd("B"), usd("C")]);
        assert_eq!(store.delete(&[usd("B"), usd("Z")]).await.unwrap(), 1);
        let left: Vec<_> = store
            .snapshot()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.pair.from)
            .collect();
        assert_eq!(left, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn catalogue_and_holdings() {
        let store = MemoryStore::new();
        store
            .save_coin_info(&[CoinInfo {
                symbol: "BTC".to_string(),
                coin_name: "Bitcoin".to_string(),
                full_name: "Bitcoin (BTC)".to_string(),
                image_url: String::new(),
                sort_order: Some(1),
            }])
            .await
            .unwrap();
        assert!(store.coin_info("BTC").await.unwrap().is_some());
        assert!(store.coin_info("btc").await.unwrap().is_none());

        store.add_holding(Holding::new(usd("BTC"), 1.0, 10.0)).await.unwrap();
        store.add_holding(Holding::new(usd("BTC"), 2.0, 10.0)).await.unwrap();
        let holdings = store.holdings().await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, 2.0);

        store.remove_holding(&usd("BTC")).await.unwrap();
        assert!(store.holdings().await.unwrap().is_empty());
    }
}
