//! Order event bus
//!
//! The status engine publishes [`OrderEvent`]s here and never touches
//! sockets; the realtime WebSocket endpoint is just one subscriber.
//!
//! ```text
//! OrderLifecycle ──publish──▶ EventBus (broadcast) ──▶ /ws/orders client 1
//!                                                 └──▶ /ws/orders client N
//! ```
//!
//! Fan-out is process-local: clients connected to another instance do not
//! see these events and fall back to polling the order list.

use serde_json::{Value, json};
use shared::models::OrderDetail;
use tokio::sync::broadcast;

/// Event name for a confirmed payment
pub const PAYMENT_SUCCESS: &str = "payment-success";
/// Event name for any order status change
pub const ORDER_STATUS_UPDATED: &str = "order-status-updated";

#[derive(Debug, Clone)]
pub enum OrderEvent {
    PaymentSucceeded { order_id: i64, message: String },
    StatusUpdated(Box<OrderDetail>),
}

impl OrderEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaymentSucceeded { .. } => PAYMENT_SUCCESS,
            Self::StatusUpdated(_) => ORDER_STATUS_UPDATED,
        }
    }

    /// Wire frame: `{"event": <name>, "data": <payload>}`
    pub fn to_frame(&self) -> Value {
        let data = match self {
            Self::PaymentSucceeded { order_id, message } => {
                json!({ "orderId": order_id, "message": message })
            }
            Self::StatusUpdated(detail) => serde_json::to_value(detail.as_ref()).unwrap_or(Value::Null),
        };
        json!({ "event": self.name(), "data": data })
    }
}

/// In-process broadcast of order events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire-and-forget; returns how many subscribers were reached
    pub fn publish(&self, event: OrderEvent) -> usize {
        let name = event.name();
        // 无订阅者时 send 返回 Err，安全忽略
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(event = name, receivers, "Order event published");
                receivers
            }
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
