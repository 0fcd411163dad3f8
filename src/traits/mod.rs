//! Collaborator traits for the coin tracker

pub mod price_source;
pub mod coin_store;
pub mod event_handler;
pub mod view;

// Re-export for convenience
pub use price_source::PriceSource;
pub use coin_store::CoinStore;
pub use event_handler::CoinEventHandler;
pub use view::{CoinListView, TopCoinsView};
