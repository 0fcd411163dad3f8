//! Coin Tracker Library
//! 
//! A watch list tracker for cryptocurrency pairs: live prices from
//! CryptoCompare, top coins from CoinMarketCap, local persistence and
//! multi-select list management.

// Public modules - these are the API surface
pub mod config;
pub mod models;
pub mod traits;
pub mod providers;
pub mod handlers;
pub mod notifications;
pub mod tracker;
pub mod render;
pub mod utils;

// Re-export commonly used items for easier access
pub use config::Config;
pub use models::{
    pair::{TrackedPair, PriceQuote},
    display::DisplayItem,
    coin::{CoinInfo, TopCoin},
    holding::Holding,
    event::{CoinEvent, TrackerInput},
};
pub use traits::{
    price_source::PriceSource,
    coin_store::CoinStore,
    event_handler::CoinEventHandler,
    view::{CoinListView, TopCoinsView},
};
pub use providers::{
    remote::RemotePriceSource,
    memory_store::MemoryStore,
    sqlite_store::SqliteStore,
};
pub use handlers::{
    console::{ConsoleEventHandler, ConsoleView},
    channel::ChannelEventHandler,
    composite::CompositeEventHandler,
};
pub use notifications::EventQueue;
pub use tracker::{CoinsTracker, TrackerHandle, TopCoinsTracker};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for library functions
pub type Result<T> = std::result::Result<T, anyhow::Error>;
