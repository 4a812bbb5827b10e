// src/events.rs
//
// Lifecycle event fan-out. The engine publishes without knowing about
// transports or connected clients; subscribers get at-least-once
// delivery and must tolerate duplicates (a sweep retried after a partial
// failure may re-announce a transition).
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::bids::Bid;
use crate::domain::core::AuctionId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AuctionEvent {
    #[serde(rename_all = "camelCase")]
    AuctionStarted { auction_id: AuctionId },

    #[serde(rename_all = "camelCase")]
    AuctionEnded { auction_id: AuctionId },

    #[serde(rename_all = "camelCase")]
    BidAccepted { auction_id: AuctionId, bid: Bid },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AuctionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        EventBus { sender }
    }

    /// Fire-and-forget: publishing with no subscribers is not an error.
    pub fn publish(&self, event: AuctionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(256)
    }
}
