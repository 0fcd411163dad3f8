//! Concrete price sources and stores

pub mod cryptocompare;
pub mod coinmarketcap;
pub mod remote;
pub mod memory_store;
pub mod sqlite_store;

// Re-export for convenience
pub use remote::RemotePriceSource;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
