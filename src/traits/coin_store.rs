use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::{CoinInfo, DisplayItem, Holding, TrackedPair};

/// Local persistence for tracked pairs, the coin catalogue and holdings
#[async_trait]
pub trait CoinStore: Send + Sync {
    /// Write every item of the snapshot, replacing stored data for the same pair
    async fn replace_all(&self, items: &[DisplayItem]) -> anyhow::Result<()>;

    /// Start tracking a pair. Returns `false` if it was already tracked.
    async fn add_pair(&self, item: DisplayItem) -> anyhow::Result<bool>;

    /// Stop tracking the given pairs, returning how many were removed
    async fn delete(&self, pairs: &[TrackedPair]) -> anyhow::Result<usize>;

    /// Current tracked-pair snapshot in insertion order
    async fn snapshot(&self) -> anyhow::Result<Vec<DisplayItem>>;

    /// Stream of snapshots, updated after every change
    fn subscribe(&self) -> watch::Receiver<Vec<DisplayItem>>;

    /// Persist the coin catalogue
    async fn save_coin_info(&self, coins: &[CoinInfo]) -> anyhow::Result<()>;

    /// Look up a catalogue entry by symbol
    async fn coin_info(&self, symbol: &str) -> anyhow::Result<Option<CoinInfo>>;

    async fn add_holding(&self, holding: Holding) -> anyhow::Result<()>;

    async fn holdings(&self) -> anyhow::Result<Vec<Holding>>;

    async fn remove_holding(&self, pair: &TrackedPair) -> anyhow::Result<()>;
}
