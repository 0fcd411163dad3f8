//! Event handlers and console views

pub mod console;
pub mod channel;
pub mod composite;

// Re-export for convenience
pub use console::{ConsoleEventHandler, ConsoleView};
pub use channel::ChannelEventHandler;
pub use composite::CompositeEventHandler;
