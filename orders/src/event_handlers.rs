//! Order-event reactions owned by the coordinator: delivered orders turn
//! their holds into deductions, cancelled orders give them back.

use async_trait::async_trait;
use std::sync::Arc;

use meridian_shared::events::{DomainEvent, EventHandler, EventType};
use meridian_shared::Result;

use crate::coordinator::OrderInventoryCoordinator;

pub struct ReservationSettlementHandler {
    coordinator: Arc<OrderInventoryCoordinator>,
}

impl ReservationSettlementHandler {
    pub fn new(coordinator: Arc<OrderInventoryCoordinator>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl EventHandler for ReservationSettlementHandler {
    async fn handle(&self, event: &DomainEvent) -> Result<()> {
        match event.event_type {
            EventType::OrderDelivered => self.coordinator.handle_delivered(event.aggregate_id).await,
            EventType::OrderCancelled => self.coordinator.handle_cancelled(event.aggregate_id).await,
            _ => Ok(()),
        }
    }

    fn event_types(&self) -> Vec<EventType> {
        vec![EventType::OrderDelivered, EventType::OrderCancelled]
    }

    fn name(&self) -> String {
        "reservation-settlement".to_string()
    }
}
