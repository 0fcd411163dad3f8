use std::sync::Arc;
use async_trait::async_trait;

use crate::models::CoinEvent;
use crate::traits::event_handler::CoinEventHandler;

/// Composite event handler that can combine multiple handlers
pub struct CompositeEventHandler {
    handlers: Vec<Arc<dyn CoinEventHandler>>,
}

impl CompositeEventHandler {
    /// Create a new composite event handler
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// Add a handler to the composite
    pub fn add_handler(&mut self, handler: Arc<dyn CoinEventHandler>) {
        self.handlers.push(handler);
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoinEventHandler for CompositeEventHandler {
    async fn handle_event(&self, event: CoinEvent) {
        for handler in &self.handlers {
            handler.handle_event(event).await;
        }
    }

    async fn handle_error(&self, error: &anyhow::Error) {
        for handler in &self.handlers {
            handler.handle_error(error).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::channel::ChannelEventHandler;

    #[tokio::test]
    async fn forwards_to_every_handler() {
        let (first, mut first_rx) = ChannelEventHandler::new();
        let (second, mut second_rx) = ChannelEventHandler::new();
        let mut composite = CompositeEventHandler::new();
        composite.add_handler(Arc::new(first));
        composite.add_handler(Arc::new(second));

        composite.handle_event(CoinEvent::ListUpdated).await;

        assert_eq!(first_rx.recv().await, Some(CoinEvent::ListUpdated));
        assert_eq!(second_rx.recv().await, Some(CoinEvent::ListUpdated));
    }
}
