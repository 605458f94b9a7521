//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Central event bus for the matching engine, built on tokio's broadcast channel. Publication
// is best-effort: an event with no subscribers is simply dropped, and a publish failure never
// propagates back into the matching path that triggered it.
//--------------------------------------------------------------------------------------------------

use tokio::sync::broadcast;
use tracing::debug;

use super::order::{Order, Trade};

#[derive(Debug, Clone)]
pub enum ExchangeEvent {
    OrderPlaced { market: String, order: Order },
    OrderCancelled { market: String, order: Order },
    /// A resting order was fully consumed by a market order's matching walk.
    OrderFilled { market: String, order: Order },
    /// A resting order was partially consumed and remains on the book.
    OrderPartiallyFilled { market: String, order: Order },
    TradeExecuted { market: String, trade: Trade },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ExchangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: ExchangeEvent) {
        if self.sender.receiver_count() == 0 {
            debug!("no subscribers, dropping event");
            return;
        }
        // A send error only means every receiver was dropped between the count check above
        // and now; that is a race against subscriber shutdown, not a matching-path fault.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExchangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
