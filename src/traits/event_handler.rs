use async_trait::async_trait;

use crate::models::CoinEvent;

/// Handler for signals emitted by the trackers
#[async_trait]
pub trait CoinEventHandler: Send + Sync {
    /// Handle a tracker signal
    async fn handle_event(&self, event: CoinEvent);

    /// Handle an error that the tracker logged and swallowed
    async fn handle_error(&self, error: &anyhow::Error);
}
