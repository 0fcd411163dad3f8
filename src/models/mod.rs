//! Data models for the coin tracker

pub mod pair;
pub mod display;
pub mod coin;
pub mod holding;
pub mod event;

// Re-export for convenience
pub use pair::{TrackedPair, PriceQuote};
pub use display::DisplayItem;
pub use coin::{CoinInfo, TopCoin};
pub use holding::Holding;
pub use event::{CoinEvent, TrackerInput, COINS_PAGE, TOP_COINS_PAGE};
