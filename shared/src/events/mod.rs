// ============================================================================
// MERIDIAN - EVENT SYSTEM FOUNDATION
// ============================================================================
// Module: shared/src/events/mod.rs
// Description: Domain event definitions and event-driven plumbing
// ============================================================================

pub mod publisher;
pub mod subscriber;

pub use publisher::{EventPublisher, InMemoryEventPublisher, RedisEventPublisher};
pub use subscriber::{EventHandler, EventSubscriber, SubscriptionConfig};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Logical event streams. Physically distinct so retention and consumer
/// groups scale independently.
pub const ORDER_EVENTS: &str = "order-events";
pub const INVENTORY_EVENTS: &str = "inventory-events";
pub const PAYMENT_EVENTS: &str = "payment-events";

/// Closed set of domain event types carried on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "order.created")]
    OrderCreated,
    #[serde(rename = "order.paid")]
    OrderPaid,
    #[serde(rename = "order.shipped")]
    OrderShipped,
    #[serde(rename = "order.delivered")]
    OrderDelivered,
    #[serde(rename = "order.cancelled")]
    OrderCancelled,
    #[serde(rename = "order.failed")]
    OrderFailed,
    #[serde(rename = "order.status_changed")]
    OrderStatusChanged,
    #[serde(rename = "payment.processed")]
    PaymentProcessed,
    #[serde(rename = "payment.failed")]
    PaymentFailed,
    #[serde(rename = "inventory.reserved")]
    InventoryReserved,
    #[serde(rename = "inventory.released")]
    InventoryReleased,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "order.created",
            EventType::OrderPaid => "order.paid",
            EventType::OrderShipped => "order.shipped",
            EventType::OrderDelivered => "order.delivered",
            EventType::OrderCancelled => "order.cancelled",
            EventType::OrderFailed => "order.failed",
            EventType::OrderStatusChanged => "order.status_changed",
            EventType::PaymentProcessed => "payment.processed",
            EventType::PaymentFailed => "payment.failed",
            EventType::InventoryReserved => "inventory.reserved",
            EventType::InventoryReleased => "inventory.released",
        }
    }

    /// The stream an event of this type belongs on.
    pub fn stream(&self) -> &'static str {
        match self {
            EventType::PaymentProcessed | EventType::PaymentFailed => PAYMENT_EVENTS,
            EventType::InventoryReserved | EventType::InventoryReleased => INVENTORY_EVENTS,
            _ => ORDER_EVENTS,
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base domain event structure. The serialized payload is self-describing;
/// ordering is guaranteed only within one `aggregate_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: Uuid,
    pub event_type: EventType,
    pub aggregate_id: Uuid,
    pub actor_id: Option<Uuid>,
    /// Version of the aggregate after the change that produced this event.
    pub version: i32,
    pub timestamp: DateTime<Utc>,
    pub data: serde_json::Value,
    pub metadata: EventMetadata,
}

/// Event metadata for context and transport coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventMetadata {
    pub service: String,
    pub environment: String,
    pub stream: Option<String>,
}

impl DomainEvent {
    pub fn builder(event_type: EventType, aggregate_id: Uuid) -> DomainEventBuilder {
        DomainEventBuilder {
            event_type,
            aggregate_id,
            actor_id: None,
            version: 1,
            data: serde_json::Value::Null,
            metadata: EventMetadata::default(),
        }
    }

    pub fn stream(&self) -> &'static str {
        self.event_type.stream()
    }
}

/// Builder for creating domain events
pub struct DomainEventBuilder {
    event_type: EventType,
    aggregate_id: Uuid,
    actor_id: Option<Uuid>,
    version: i32,
    data: serde_json::Value,
    metadata: EventMetadata,
}

impl DomainEventBuilder {
    /// Set event data
    pub fn data<T: Serialize>(mut self, data: T) -> Result<Self> {
        self.data = serde_json::to_value(data).map_err(Error::Serialization)?;
        Ok(self)
    }

    /// Set the acting user
    pub fn actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set the aggregate version after the change
    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn build(self) -> DomainEvent {
        DomainEvent {
            event_id: Uuid::new_v4(),
            event_type: self.event_type,
            aggregate_id: self.aggregate_id,
            actor_id: self.actor_id,
            version: self.version,
            timestamp: Utc::now(),
            data: self.data,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_round_trip() {
        let aggregate_id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let event = DomainEvent::builder(EventType::OrderPaid, aggregate_id)
            .actor(actor)
            .version(2)
            .data(serde_json::json!({
                "previous_status": "created",
                "new_status": "paid",
                "total_amount": "25.00",
            }))
            .unwrap()
            .build();

        let serialized = serde_json::to_string(&event).unwrap();
        let decoded: DomainEvent = serde_json::from_str(&serialized).unwrap();

        assert_eq!(decoded.event_id, event.event_id);
        assert_eq!(decoded.event_type, EventType::OrderPaid);
        assert_eq!(decoded.aggregate_id, aggregate_id);
        assert_eq!(decoded.actor_id, Some(actor));
        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.data["new_status"], "paid");
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&EventType::InventoryReserved).unwrap();
        assert_eq!(json, "\"inventory.reserved\"");
    }

    #[test]
    fn test_stream_routing() {
        assert_eq!(EventType::OrderCreated.stream(), ORDER_EVENTS);
        assert_eq!(EventType::PaymentProcessed.stream(), PAYMENT_EVENTS);
        assert_eq!(EventType::InventoryReleased.stream(), INVENTORY_EVENTS);
    }
}
