use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Domain events emitted by the fulfillment engine. Consumers (chat/email
/// notification senders, dashboards) subscribe downstream; delivery is
/// fire-and-forget and never blocks or rolls back the operation that
/// produced the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Reseller order events
    OrderCreated(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCompleted(Uuid),
    OrderDeleted(Uuid),

    // Transfer order events
    TransferCreated(Uuid),
    TransferStatusChanged {
        transfer_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TransferDeleted(Uuid),

    // Ledger events
    StockAdjusted {
        key: String,
        delta: i32,
        new_quantity: i32,
    },

    // Document events
    DocumentGenerated { order_id: Uuid, url: String },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Fire-and-forget emit. A full or closed channel is logged and
    /// swallowed; notification delivery never blocks an order operation, so
    /// this never waits for channel capacity.
    pub fn emit(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!("event dropped: {}", e);
        }
    }
}

/// Drains the event channel, logging each event. Downstream delivery
/// (chat/email) hangs off this loop in the host application.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "event received");
    }
}
