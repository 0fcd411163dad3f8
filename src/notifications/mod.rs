// src/notifications/mod.rs
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedSender, UnboundedReceiver, unbounded_channel};
use tracing::{error, warn};

use crate::models::CoinEvent;
use crate::traits::event_handler::CoinEventHandler;

/// Notification types
#[derive(Debug, Clone)]
pub enum Notification {
    Event(CoinEvent),
    Error(String),
    Shutdown,
}

/// Outbound event queue, delivered in order to a single handler task
pub struct EventQueue {
    sender: UnboundedSender<Notification>,
}

impl EventQueue {
    /// Create a new event queue
    pub fn new(handler: Arc<dyn CoinEventHandler>) -> Self {
        let (sender, receiver) = unbounded_channel();

        tokio::spawn(Self::process_notifications(receiver, handler));

        Self { sender }
    }

    async fn process_notifications(
        mut receiver: UnboundedReceiver<Notification>,
        handler: Arc<dyn CoinEventHandler>,
    ) {
        while let Some(notification) = receiver.recv().await {
            match notification {
                Notification::Event(event) => {
                    handler.handle_event(event).await;
                }
                Notification::Error(err_msg) => {
                    let err = anyhow::anyhow!("{}", err_msg);
                    handler.handle_error(&err).await;
                }
                Notification::Shutdown => {
                    warn!("Event processor shutting down");
                    break;
                }
            }
        }
    }

    /// Queue an event (non-blocking)
    pub fn notify(&self, event: CoinEvent) {
        if let Err(e) = self.sender.send(Notification::Event(event)) {
            error!("Failed to queue event: {}", e);
        }
    }

    /// Queue an error notification (non-blocking)
    pub fn notify_error(&self, error: &anyhow::Error) {
        if let Err(e) = self.sender.send(Notification::Error(format!("{:#}", error))) {
            error!("Failed to queue error notification: {}", e);
        }
    }

    /// Stop the processing task after already queued notifications
    pub fn shutdown(&self) {
        let _ = self.sender.send(Notification::Shutdown);
    }
}

impl Clone for EventQueue {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
