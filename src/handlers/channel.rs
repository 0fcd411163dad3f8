use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::models::CoinEvent;
use crate::traits::event_handler::CoinEventHandler;

/// Forwards every event into a channel so a surface can consume them as a stream
pub struct ChannelEventHandler {
    sender: UnboundedSender<CoinEvent>,
}

impl ChannelEventHandler {
    /// Create the handler and the receiving end of its channel
    pub fn new() -> (Self, UnboundedReceiver<CoinEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl CoinEventHandler for ChannelEventHandler {
    async fn handle_event(&self, event: CoinEvent) {
        if self.sender.send(event).is_err() {
            debug!("Event receiver dropped, discarding {:?}", event);
        }
    }

    async fn handle_error(&self, error: &anyhow::Error) {
        warn!("Coin tracker error: {:#}", error);
    }
}
