// ============================================================================
// MERIDIAN - ORDER / INVENTORY COORDINATOR
// ============================================================================
// Module: orders/src/coordinator.rs
// Description: Cross-service workflows: availability-checked creation,
//              reservation-backed fulfilment, release on cancellation
// ============================================================================

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use meridian_shared::clients::inventory::InventoryClient;
use meridian_shared::{Error, Result};

use crate::models::{CreateOrderRequest, Order, OrderStatus};
use crate::service::OrderService;

/// Default hold length the coordinator asks for when reserving: long enough
/// to cover payment-to-shipment, short enough that abandoned orders return
/// stock within a day.
pub const RESERVATION_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Inventory as seen from the order side. The production implementation is
/// the typed fabric client; tests plug in an in-memory fake or the
/// generated mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryPort: Send + Sync {
    async fn stock_for_product(&self, product_id: Uuid) -> Result<StockView>;

    async fn reserve(
        &self,
        item_id: &str,
        order_id: Uuid,
        quantity: i32,
        ttl_seconds: i64,
    ) -> Result<ReservationView>;

    async fn release(&self, reservation_id: &str, reason: &str) -> Result<()>;

    async fn fulfil(&self, reservation_id: &str) -> Result<()>;

    async fn reservations_for_order(&self, order_id: Uuid) -> Result<Vec<ReservationView>>;
}

#[derive(Debug, Clone)]
pub struct StockView {
    pub item_id: String,
    pub product_id: Uuid,
    pub available: i32,
}

#[derive(Debug, Clone)]
pub struct ReservationView {
    pub id: String,
    pub item_id: String,
    pub quantity: i32,
    pub active: bool,
}

pub struct OrderInventoryCoordinator {
    orders: Arc<OrderService>,
    inventory: Arc<dyn InventoryPort>,
    reservation_ttl_seconds: i64,
}

impl OrderInventoryCoordinator {
    pub fn new(orders: Arc<OrderService>, inventory: Arc<dyn InventoryPort>) -> Self {
        Self {
            orders,
            inventory,
            reservation_ttl_seconds: RESERVATION_TTL_SECONDS,
        }
    }

    pub fn with_reservation_ttl(mut self, ttl_seconds: i64) -> Self {
        self.reservation_ttl_seconds = ttl_seconds;
        self
    }

    /// Create an order after a stock pre-check, then advance it to
    /// `pending`.
    ///
    /// The pre-check is check-then-act and therefore racy across concurrent
    /// creates; that is acceptable for low-contention catalogs because
    /// fulfilment reserves atomically and is the step that actually holds
    /// stock.
    pub async fn create_order_checked(
        &self,
        request: CreateOrderRequest,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        request.validate()?;

        for item in &request.items {
            let stock = self
                .inventory
                .stock_for_product(item.product_id)
                .await
                .map_err(|e| match e {
                    Error::NotFound(_) => Error::InsufficientStock(format!(
                        "product {} has no inventory",
                        item.product_id
                    )),
                    other => other,
                })?;
            if stock.available < item.quantity {
                return Err(Error::InsufficientStock(format!(
                    "product {} has {} available, {} requested",
                    item.product_id, stock.available, item.quantity
                )));
            }
        }

        let order = self.orders.create_order(request, actor_id).await?;
        self.orders
            .update_status(order.id, OrderStatus::Pending, actor_id)
            .await
    }

    /// Reserve stock for a paid order and move it to `shipped`. On any
    /// reservation failure the holds already taken for this order are
    /// released (best effort) and the order is cancelled.
    pub async fn fulfil_order(&self, order_id: Uuid, actor_id: Option<Uuid>) -> Result<Order> {
        let order = self.orders.get(order_id).await?;
        if order.status != OrderStatus::Paid {
            return Err(Error::FailedPrecondition(format!(
                "order {order_id} is {}, only paid orders can be fulfilled",
                order.status.as_str()
            )));
        }

        let mut reserved: Vec<ReservationView> = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let stock = match self.inventory.stock_for_product(item.product_id).await {
                Ok(stock) => stock,
                Err(e) => {
                    self.abort_fulfilment(&order, &reserved, actor_id).await;
                    return Err(e);
                }
            };

            // Reserve is idempotent on (order, item): a retry of this whole
            // workflow lands on the same holds instead of doubling them.
            match self
                .inventory
                .reserve(
                    &stock.item_id,
                    order.id,
                    item.quantity,
                    self.reservation_ttl_seconds,
                )
                .await
            {
                Ok(reservation) => reserved.push(reservation),
                Err(e) => {
                    self.abort_fulfilment(&order, &reserved, actor_id).await;
                    return Err(e);
                }
            }
        }

        self.orders
            .update_status(order.id, OrderStatus::Shipped, actor_id)
            .await
    }

    async fn abort_fulfilment(
        &self,
        order: &Order,
        reserved: &[ReservationView],
        actor_id: Option<Uuid>,
    ) {
        for reservation in reserved {
            if let Err(e) = self
                .inventory
                .release(&reservation.id, "fulfilment aborted")
                .await
            {
                warn!(
                    order_id = %order.id,
                    reservation_id = %reservation.id,
                    "failed to release reservation while aborting fulfilment: {e}"
                );
            }
        }
        if let Err(e) = self
            .orders
            .cancel(order.id, "insufficient stock at fulfilment", actor_id)
            .await
        {
            warn!(order_id = %order.id, "failed to cancel order after aborted fulfilment: {e}");
        }
    }

    /// Cancel an order and give its holds back to availability.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<Order> {
        let order = self.orders.cancel(order_id, reason, actor_id).await?;
        self.release_order_reservations(order_id, reason).await;
        Ok(order)
    }

    /// Convert every active hold for a delivered order into a permanent
    /// deduction. Called from the order.delivered event.
    pub async fn handle_delivered(&self, order_id: Uuid) -> Result<()> {
        for reservation in self.inventory.reservations_for_order(order_id).await? {
            if !reservation.active {
                continue;
            }
            self.inventory.fulfil(&reservation.id).await?;
        }
        info!(order_id = %order_id, "reservations fulfilled for delivered order");
        Ok(())
    }

    /// Release every active hold for a cancelled order. Called from the
    /// order.cancelled event; releases are idempotent so a direct cancel
    /// path having run first is harmless.
    pub async fn handle_cancelled(&self, order_id: Uuid) -> Result<()> {
        self.release_order_reservations(order_id, "order cancelled")
            .await;
        Ok(())
    }

    async fn release_order_reservations(&self, order_id: Uuid, reason: &str) {
        let reservations = match self.inventory.reservations_for_order(order_id).await {
            Ok(reservations) => reservations,
            Err(e) => {
                warn!(order_id = %order_id, "failed to list reservations for release: {e}");
                return;
            }
        };

        for reservation in reservations {
            if !reservation.active {
                continue;
            }
            if let Err(e) = self.inventory.release(&reservation.id, reason).await {
                warn!(
                    order_id = %order_id,
                    reservation_id = %reservation.id,
                    "failed to release reservation: {e}"
                );
            }
        }
    }
}

// ============================================================================
// FABRIC CLIENT ADAPTER
// ============================================================================

#[async_trait]
impl InventoryPort for InventoryClient {
    async fn stock_for_product(&self, product_id: Uuid) -> Result<StockView> {
        let item = self
            .get_item_by_product(&product_id.to_string(), None)
            .await?;
        Ok(StockView {
            item_id: item.id,
            product_id,
            available: item.available,
        })
    }

    async fn reserve(
        &self,
        item_id: &str,
        order_id: Uuid,
        quantity: i32,
        ttl_seconds: i64,
    ) -> Result<ReservationView> {
        let reservation = InventoryClient::reserve(
            self,
            item_id,
            &order_id.to_string(),
            quantity,
            ttl_seconds,
        )
        .await?;
        Ok(ReservationView {
            active: reservation.status == "active",
            id: reservation.id,
            item_id: reservation.inventory_item_id,
            quantity: reservation.quantity,
        })
    }

    async fn release(&self, reservation_id: &str, reason: &str) -> Result<()> {
        InventoryClient::release(self, reservation_id, reason).await?;
        Ok(())
    }

    async fn fulfil(&self, reservation_id: &str) -> Result<()> {
        InventoryClient::fulfil(self, reservation_id).await?;
        Ok(())
    }

    async fn reservations_for_order(&self, order_id: Uuid) -> Result<Vec<ReservationView>> {
        let reservations = self
            .list_order_reservations(&order_id.to_string())
            .await?;
        Ok(reservations
            .into_iter()
            .map(|r| ReservationView {
                active: r.status == "active",
                id: r.id,
                item_id: r.inventory_item_id,
                quantity: r.quantity,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::models::{CreateOrderRequest, NewOrderItem, OrderSource};
    use crate::repository::InMemoryOrderRepository;
    use meridian_shared::events::InMemoryEventPublisher;

    fn coordinator_with(inventory: MockInventoryPort) -> OrderInventoryCoordinator {
        let orders = Arc::new(OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            InMemoryEventPublisher::new(),
        ));
        OrderInventoryCoordinator::new(orders, Arc::new(inventory))
    }

    fn one_item_request(product_id: Uuid) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: Uuid::new_v4(),
            items: vec![NewOrderItem {
                product_id,
                sku: "sku-1".to_string(),
                name: "Widget".to_string(),
                quantity: 2,
                price: dec!(10.00),
            }],
            shipping_address: None,
            billing_address: None,
            source: OrderSource::Online,
            location_id: None,
            staff_id: None,
            notes: None,
        }
    }

    // Interaction check: a failed pre-check must never reach reserve.
    #[tokio::test]
    async fn test_short_stock_precheck_never_reserves() {
        let product = Uuid::new_v4();
        let mut inventory = MockInventoryPort::new();
        inventory
            .expect_stock_for_product()
            .times(1)
            .returning(|product_id| {
                Ok(StockView {
                    item_id: "item-1".to_string(),
                    product_id,
                    available: 1,
                })
            });
        inventory.expect_reserve().times(0);

        let coordinator = coordinator_with(inventory);
        let result = coordinator
            .create_order_checked(one_item_request(product), None)
            .await;
        assert!(matches!(result, Err(Error::InsufficientStock(_))));
    }

    // Interaction check: settlement only touches the still-active holds.
    #[tokio::test]
    async fn test_cancel_settlement_releases_only_active_holds() {
        let order_id = Uuid::new_v4();
        let mut inventory = MockInventoryPort::new();
        inventory
            .expect_reservations_for_order()
            .times(1)
            .returning(|_| {
                Ok(vec![
                    ReservationView {
                        id: "res-active".to_string(),
                        item_id: "item-1".to_string(),
                        quantity: 2,
                        active: true,
                    },
                    ReservationView {
                        id: "res-released".to_string(),
                        item_id: "item-2".to_string(),
                        quantity: 1,
                        active: false,
                    },
                ])
            });
        inventory
            .expect_release()
            .times(1)
            .withf(|reservation_id, _reason| reservation_id == "res-active")
            .returning(|_, _| Ok(()));

        let coordinator = coordinator_with(inventory);
        coordinator.handle_cancelled(order_id).await.unwrap();
    }
}
