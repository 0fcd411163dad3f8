use crate::models::{DisplayItem, Holding, TopCoin, TrackedPair};
use crate::render::TopCoinRow;

/// Rendering surface for the tracked coins list
pub trait CoinListView: Send + Sync {
    /// Re-render the whole list
    fn render(&self, items: &[DisplayItem], holdings: &[Holding]);

    /// Navigate to the detail page of a pair
    fn open_detail(&self, pair: &TrackedPair);

    fn hide_refreshing(&self);

    fn enable_swipe_to_refresh(&self);

    /// Report that `count` coins were deleted
    fn show_deleted(&self, count: usize);
}

/// Rendering surface for the top coins list
pub trait TopCoinsView: Send + Sync {
    fn render(&self, rows: &[TopCoinRow]);

    /// Report that a coin was added to the tracked list
    fn show_added(&self, coin: &TopCoin);
}
