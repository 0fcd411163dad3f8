//! Coin list orchestration and the pure logic behind it

pub mod reconcile;
pub mod selection;
pub mod queries;
pub mod coins_tracker;
pub mod top_coins;

pub use coins_tracker::{CoinsTracker, TrackerHandle};
pub use selection::{MultiSelector, TapOutcome};
pub use top_coins::TopCoinsTracker;
