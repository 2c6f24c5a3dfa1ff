// ============================================================================
// MERIDIAN - ORDER SERVICE
// ============================================================================
// Module: orders/src/service.rs
// Description: Order lifecycle engine: creation, validated transitions with
//              optimistic-lock retry, event emission after writes
// ============================================================================

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use meridian_shared::events::{DomainEvent, EventPublisher, EventType, ORDER_EVENTS, PAYMENT_EVENTS};
use meridian_shared::types::PageRequest;
use meridian_shared::{Error, Result};

use crate::models::{CreateOrderRequest, Order, OrderItem, OrderStatus, Payment};
use crate::repository::OrderRepository;

/// Bounded retries for optimistic-lock conflicts before surfacing the
/// failure to the caller.
const LOCK_RETRIES: u32 = 3;

pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    events: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>, events: Arc<dyn EventPublisher>) -> Self {
        Self { repository, events }
    }

    /// Events are emitted after the successful write. A publish failure is
    /// logged and not rolled back; consumers reconcile against the order
    /// aggregate of record.
    async fn publish(&self, stream: &str, event: DomainEvent) {
        if let Err(e) = self.events.publish(stream, &event).await {
            warn!(
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                "failed to publish order event: {e}"
            );
        }
    }

    // ========================================================================
    // CREATION & QUERIES
    // ========================================================================

    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        request.validate()?;

        let items: Vec<OrderItem> = request
            .items
            .iter()
            .map(|item| {
                OrderItem::new(
                    item.product_id,
                    item.sku.clone(),
                    item.name.clone(),
                    item.quantity,
                    item.price,
                )
            })
            .collect();
        let total_amount: Decimal = items.iter().map(|item| item.subtotal).sum();

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            items,
            total_amount,
            currency: "USD".to_string(),
            status: OrderStatus::Created,
            source: request.source,
            shipping_address: request.shipping_address,
            billing_address: request.billing_address,
            payment: None,
            tracking_code: None,
            notes: request.notes.into_iter().collect(),
            version: 1,
            created_at: now,
            updated_at: now,
            completed_at: None,
            location_id: request.location_id,
            staff_id: request.staff_id,
        };

        let order = self.repository.create(&order).await?;

        let event = DomainEvent::builder(EventType::OrderCreated, order.id)
            .version(order.version)
            .data(serde_json::json!({
                "user_id": order.user_id,
                "total_amount": order.total_amount,
                "item_count": order.items.len(),
                "source": order.source.as_str(),
            }))?;
        let event = match actor_id {
            Some(actor) => event.actor(actor),
            None => event,
        };
        self.publish(ORDER_EVENTS, event.build()).await;

        Ok(order)
    }

    pub async fn get(&self, id: Uuid) -> Result<Order> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("order {id}")))
    }

    pub async fn list_user_orders(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        self.repository.list_for_user(user_id, page).await
    }

    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        self.repository.list(status, page).await
    }

    pub async fn count_by_status(&self, status: OrderStatus) -> Result<i64> {
        self.repository.count_by_status(status).await
    }

    // ========================================================================
    // LIFECYCLE TRANSITIONS
    // ========================================================================

    /// Generic validated transition.
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: OrderStatus,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        let (order, previous) = self.transition(id, new_status, |_| {}).await?;
        self.emit_transition(&order, previous, actor_id, None).await;
        Ok(order)
    }

    /// Record a payment and move the order to `paid`.
    pub async fn add_payment(
        &self,
        id: Uuid,
        method: &str,
        transaction_id: &str,
        amount: Decimal,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        if method.is_empty() || transaction_id.is_empty() {
            return Err(Error::InvalidArgument(
                "payment method and transaction id are required".to_string(),
            ));
        }

        let payment = Payment {
            method: method.to_string(),
            transaction_id: transaction_id.to_string(),
            amount,
            paid_at: Utc::now(),
        };
        let (order, previous) = self
            .transition(id, OrderStatus::Paid, move |order| {
                order.payment = Some(payment.clone());
            })
            .await?;

        self.emit_transition(&order, previous, actor_id, None).await;

        let payment_event = DomainEvent::builder(EventType::PaymentProcessed, order.id)
            .version(order.version)
            .data(serde_json::json!({
                "method": method,
                "transaction_id": transaction_id,
                "amount": amount,
                "currency": order.currency,
            }))?
            .build();
        self.publish(PAYMENT_EVENTS, payment_event).await;

        Ok(order)
    }

    /// Attach a tracking code and move the order to `shipped`.
    pub async fn add_tracking(
        &self,
        id: Uuid,
        tracking_code: &str,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        if tracking_code.is_empty() {
            return Err(Error::InvalidArgument(
                "tracking code is required".to_string(),
            ));
        }

        let code = tracking_code.to_string();
        let (order, previous) = self
            .transition(id, OrderStatus::Shipped, move |order| {
                order.tracking_code = Some(code.clone());
            })
            .await?;
        self.emit_transition(&order, previous, actor_id, None).await;
        Ok(order)
    }

    pub async fn cancel(&self, id: Uuid, reason: &str, actor_id: Option<Uuid>) -> Result<Order> {
        let (order, previous) = self.transition(id, OrderStatus::Cancelled, |_| {}).await?;
        self.emit_transition(&order, previous, actor_id, Some(reason))
            .await;
        Ok(order)
    }

    /// Append a note. Notes are mutations too: the version moves.
    pub async fn add_note(&self, id: Uuid, note: &str, _actor_id: Option<Uuid>) -> Result<Order> {
        if note.is_empty() {
            return Err(Error::InvalidArgument("note must not be empty".to_string()));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.get(id).await?;
            let mut next = current.clone();
            next.notes.push(note.to_string());

            match self
                .repository
                .update_with_version(&next, current.version)
                .await
            {
                Ok(order) => return Ok(order),
                Err(Error::OptimisticLockFailed(_)) if attempt < LOCK_RETRIES => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Validated transition with bounded optimistic-lock retry: each retry
    /// re-reads the aggregate, so a conflicting writer's change is observed
    /// before the transition is re-validated.
    async fn transition<F>(
        &self,
        id: Uuid,
        new_status: OrderStatus,
        mutate: F,
    ) -> Result<(Order, OrderStatus)>
    where
        F: Fn(&mut Order),
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let current = self.get(id).await?;
            current.validate_transition(new_status)?;

            let mut next = current.clone();
            next.status = new_status;
            mutate(&mut next);
            if new_status == OrderStatus::Delivered {
                next.completed_at = Some(Utc::now());
            }

            match self
                .repository
                .update_with_version(&next, current.version)
                .await
            {
                Ok(order) => return Ok((order, current.status)),
                Err(Error::OptimisticLockFailed(_)) if attempt < LOCK_RETRIES => continue,
                Err(e) => return Err(e),
            }
        }
    }

    async fn emit_transition(
        &self,
        order: &Order,
        previous: OrderStatus,
        actor_id: Option<Uuid>,
        reason: Option<&str>,
    ) {
        let event_type = match order.status {
            OrderStatus::Paid => EventType::OrderPaid,
            OrderStatus::Shipped => EventType::OrderShipped,
            OrderStatus::Delivered => EventType::OrderDelivered,
            OrderStatus::Cancelled => EventType::OrderCancelled,
            OrderStatus::Failed => EventType::OrderFailed,
            _ => EventType::OrderStatusChanged,
        };

        let mut data = serde_json::json!({
            "previous_status": previous.as_str(),
            "new_status": order.status.as_str(),
            "total_amount": order.total_amount,
        });
        if let Some(reason) = reason {
            data["reason"] = serde_json::Value::String(reason.to_string());
        }

        let builder = DomainEvent::builder(event_type, order.id).version(order.version);
        let builder = match actor_id {
            Some(actor) => builder.actor(actor),
            None => builder,
        };
        match builder.data(data) {
            Ok(builder) => self.publish(ORDER_EVENTS, builder.build()).await,
            Err(e) => warn!("failed to serialize order event payload: {e}"),
        }
    }
}
