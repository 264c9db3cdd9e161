use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Default buffer for the broadcast channel. A lagging subscriber loses the
/// oldest events and keeps receiving; clients recover by refetching.
const DEFAULT_CAPACITY: usize = 256;

/// Bulk closes emit one event per order up to this cap; above it a single
/// `order_id: 0` event tells clients to refresh everything.
pub const BULK_EVENT_CAP: usize = 20;

/// Order-lifecycle event kinds. The serialized names double as SSE event
/// names on the notification stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum OrderEventKind {
    #[strum(serialize = "ORDER_CREATED")]
    #[serde(rename = "ORDER_CREATED")]
    OrderCreated,
    #[strum(serialize = "ORDER_UPDATED")]
    #[serde(rename = "ORDER_UPDATED")]
    OrderUpdated,
    #[strum(serialize = "ORDER_CLOSED")]
    #[serde(rename = "ORDER_CLOSED")]
    OrderClosed,
}

/// Wire payload pushed to connected clients. Field names are camelCase on
/// the wire; receiving clients decide whether to react (admin-only,
/// ignore own session).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEventPayload {
    /// 0 means "bulk change, refresh everything".
    pub order_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Acting user's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Order type (Dine In / Take Away / Home Delivery).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
}

impl OrderEventPayload {
    /// Payload for a bulk close too large to enumerate.
    pub fn refresh_all(user: Option<String>, user_id: Option<i64>) -> Self {
        Self {
            order_id: 0,
            table_name: None,
            user,
            user_id,
            amount: None,
            order_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub payload: OrderEventPayload,
}

/// In-process pub/sub for order-lifecycle events.
///
/// Owned by the application state and handed to services at construction;
/// there is no global emitter. Publishing is best-effort: failures are
/// logged and never propagate into the write path that triggered them.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OrderEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers. Having no subscribers
    /// is normal (no terminal has the stream open) and not an error.
    pub fn publish(&self, kind: OrderEventKind, payload: OrderEventPayload) {
        let receivers = self.tx.receiver_count();
        let event = OrderEvent { kind, payload };
        match self.tx.send(event) {
            Ok(delivered) => {
                debug!(kind = %kind, delivered, "published order event");
            }
            Err(_) => {
                debug!(kind = %kind, receivers, "no subscribers for order event");
            }
        }
    }

    /// Subscribe to the stream of order events. Dropping the receiver
    /// tears the subscription down.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_payload() -> OrderEventPayload {
        OrderEventPayload {
            order_id: 42,
            table_name: Some("Table 7".into()),
            user: Some("maria".into()),
            user_id: Some(3),
            amount: Some(dec!(1250.00)),
            order_type: Some("Dine In".into()),
        }
    }

    #[test]
    fn publish_without_subscribers_does_not_fail() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(OrderEventKind::OrderClosed, sample_payload());
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(OrderEventKind::OrderCreated, sample_payload());

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.kind, OrderEventKind::OrderCreated);
        assert_eq!(event.payload.order_id, 42);
        assert_eq!(event.payload.table_name.as_deref(), Some("Table 7"));
    }

    #[test]
    fn payload_serializes_camel_case_wire_shape() {
        let json = serde_json::to_value(sample_payload()).unwrap();
        assert_eq!(json["orderId"], 42);
        assert_eq!(json["tableName"], "Table 7");
        assert_eq!(json["userId"], 3);
        assert_eq!(json["type"], "Dine In");
    }

    #[test]
    fn kind_display_matches_sse_event_names() {
        assert_eq!(OrderEventKind::OrderCreated.to_string(), "ORDER_CREATED");
        assert_eq!(OrderEventKind::OrderUpdated.to_string(), "ORDER_UPDATED");
        assert_eq!(OrderEventKind::OrderClosed.to_string(), "ORDER_CLOSED");
    }

    #[test]
    fn refresh_all_payload_uses_zero_sentinel() {
        let payload = OrderEventPayload::refresh_all(Some("Admin".into()), Some(1));
        assert_eq!(payload.order_id, 0);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("tableName").is_none());
    }
}
