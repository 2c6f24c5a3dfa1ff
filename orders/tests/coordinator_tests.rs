// ============================================================================
// MERIDIAN - COORDINATOR TESTS
// ============================================================================
// Module: orders/tests/coordinator_tests.rs
// Description: Cross-service workflows against an in-memory inventory
//              port: checked creation, fulfilment with compensation,
//              settlement on delivered/cancelled
// ============================================================================

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use meridian_orders::coordinator::{InventoryPort, ReservationView, StockView};
use meridian_orders::models::{CreateOrderRequest, NewOrderItem, OrderSource, OrderStatus};
use meridian_orders::repository::InMemoryOrderRepository;
use meridian_orders::{OrderInventoryCoordinator, OrderService};
use meridian_shared::events::InMemoryEventPublisher;
use meridian_shared::{Error, Result};

/// In-memory inventory fake implementing the coordinator's port: a stock
/// table plus a reservation ledger with the real protocol's idempotency.
#[derive(Default)]
struct FakeInventory {
    stock: Mutex<HashMap<Uuid, (String, i32)>>,
    reservations: Mutex<Vec<FakeReservation>>,
}

#[derive(Clone)]
struct FakeReservation {
    id: String,
    item_id: String,
    order_id: Uuid,
    quantity: i32,
    status: &'static str,
}

impl FakeInventory {
    fn with_stock(stock: &[(Uuid, i32)]) -> Arc<Self> {
        let table = stock
            .iter()
            .map(|(product_id, available)| {
                (*product_id, (format!("item-{product_id}"), *available))
            })
            .collect();
        Arc::new(Self {
            stock: Mutex::new(table),
            reservations: Mutex::new(Vec::new()),
        })
    }

    fn reservations(&self) -> Vec<FakeReservation> {
        self.reservations.lock().unwrap().clone()
    }
}

#[async_trait]
impl InventoryPort for FakeInventory {
    async fn stock_for_product(&self, product_id: Uuid) -> Result<StockView> {
        let stock = self.stock.lock().unwrap();
        let (item_id, available) = stock
            .get(&product_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("inventory for product {product_id}")))?;
        Ok(StockView {
            item_id,
            product_id,
            available,
        })
    }

    async fn reserve(
        &self,
        item_id: &str,
        order_id: Uuid,
        quantity: i32,
        _ttl_seconds: i64,
    ) -> Result<ReservationView> {
        let mut stock = self.stock.lock().unwrap();
        let mut reservations = self.reservations.lock().unwrap();

        if let Some(existing) = reservations
            .iter()
            .find(|r| r.order_id == order_id && r.item_id == item_id && r.status == "active")
        {
            return Ok(ReservationView {
                id: existing.id.clone(),
                item_id: existing.item_id.clone(),
                quantity: existing.quantity,
                active: true,
            });
        }

        let entry = stock
            .values_mut()
            .find(|(id, _)| id == item_id)
            .ok_or_else(|| Error::NotFound(format!("item {item_id}")))?;
        if entry.1 < quantity {
            return Err(Error::InsufficientStock(format!(
                "item {item_id} has {} available",
                entry.1
            )));
        }
        entry.1 -= quantity;

        let reservation = FakeReservation {
            id: format!("res-{}", reservations.len() + 1),
            item_id: item_id.to_string(),
            order_id,
            quantity,
            status: "active",
        };
        reservations.push(reservation.clone());
        Ok(ReservationView {
            id: reservation.id,
            item_id: reservation.item_id,
            quantity,
            active: true,
        })
    }

    async fn release(&self, reservation_id: &str, _reason: &str) -> Result<()> {
        let mut stock = self.stock.lock().unwrap();
        let mut reservations = self.reservations.lock().unwrap();
        if let Some(reservation) = reservations
            .iter_mut()
            .find(|r| r.id == reservation_id && r.status == "active")
        {
            reservation.status = "released";
            if let Some(entry) = stock.values_mut().find(|(id, _)| *id == reservation.item_id) {
                entry.1 += reservation.quantity;
            }
        }
        Ok(())
    }

    async fn fulfil(&self, reservation_id: &str) -> Result<()> {
        let mut reservations = self.reservations.lock().unwrap();
        if let Some(reservation) = reservations
            .iter_mut()
            .find(|r| r.id == reservation_id && r.status == "active")
        {
            reservation.status = "fulfilled";
        }
        Ok(())
    }

    async fn reservations_for_order(&self, order_id: Uuid) -> Result<Vec<ReservationView>> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.order_id == order_id)
            .map(|r| ReservationView {
                id: r.id.clone(),
                item_id: r.item_id.clone(),
                quantity: r.quantity,
                active: r.status == "active",
            })
            .collect())
    }
}

struct Harness {
    coordinator: OrderInventoryCoordinator,
    orders: Arc<OrderService>,
    inventory: Arc<FakeInventory>,
}

fn harness(stock: &[(Uuid, i32)]) -> Harness {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let events = InMemoryEventPublisher::new();
    let orders = Arc::new(OrderService::new(repository, events));
    let inventory = FakeInventory::with_stock(stock);
    let coordinator = OrderInventoryCoordinator::new(
        Arc::clone(&orders),
        Arc::clone(&inventory) as Arc<dyn InventoryPort>,
    );
    Harness {
        coordinator,
        orders,
        inventory,
    }
}

fn request_for(products: &[(Uuid, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: Uuid::new_v4(),
        items: products
            .iter()
            .map(|(product_id, quantity)| NewOrderItem {
                product_id: *product_id,
                sku: format!("sku-{}", &product_id.to_string()[..8]),
                name: "Widget".to_string(),
                quantity: *quantity,
                price: dec!(10.00),
            })
            .collect(),
        shipping_address: None,
        billing_address: None,
        source: OrderSource::Online,
        location_id: None,
        staff_id: None,
        notes: None,
    }
}

// ============================================================================
// CHECKED CREATION
// ============================================================================

#[tokio::test]
async fn test_checked_create_lands_in_pending() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 10)]);

    let order = h
        .coordinator
        .create_order_checked(request_for(&[(product, 2)]), None)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.version, 2);
    // The pre-check holds nothing: stock is untouched until fulfilment.
    assert_eq!(
        h.inventory.stock_for_product(product).await.unwrap().available,
        10
    );
}

#[tokio::test]
async fn test_checked_create_rejects_insufficient_stock() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 1)]);

    let result = h
        .coordinator
        .create_order_checked(request_for(&[(product, 2)]), None)
        .await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));
}

#[tokio::test]
async fn test_checked_create_treats_missing_stock_as_insufficient() {
    let h = harness(&[]);
    let result = h
        .coordinator
        .create_order_checked(request_for(&[(Uuid::new_v4(), 1)]), None)
        .await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));
}

// ============================================================================
// FULFILMENT
// ============================================================================

async fn paid_order(h: &Harness, products: &[(Uuid, i32)]) -> Uuid {
    let order = h
        .coordinator
        .create_order_checked(request_for(products), None)
        .await
        .unwrap();
    h.orders
        .add_payment(order.id, "card", "tx", order.total_amount, None)
        .await
        .unwrap();
    order.id
}

#[tokio::test]
async fn test_fulfilment_reserves_and_ships() {
    let p1 = Uuid::new_v4();
    let p2 = Uuid::new_v4();
    let h = harness(&[(p1, 5), (p2, 5)]);
    let order_id = paid_order(&h, &[(p1, 2), (p2, 1)]).await;

    let order = h.coordinator.fulfil_order(order_id, None).await.unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);

    assert_eq!(h.inventory.stock_for_product(p1).await.unwrap().available, 3);
    assert_eq!(h.inventory.stock_for_product(p2).await.unwrap().available, 4);
    assert_eq!(h.inventory.reservations().len(), 2);
}

#[tokio::test]
async fn test_fulfilment_requires_paid_order() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 5)]);
    let order = h
        .coordinator
        .create_order_checked(request_for(&[(product, 1)]), None)
        .await
        .unwrap();

    let result = h.coordinator.fulfil_order(order.id, None).await;
    assert!(matches!(result, Err(Error::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_fulfilment_compensates_on_partial_failure() {
    let available = Uuid::new_v4();
    let scarce = Uuid::new_v4();
    // Enough for the pre-check but drained before fulfilment.
    let h = harness(&[(available, 5), (scarce, 3)]);
    let order_id = paid_order(&h, &[(available, 2), (scarce, 3)]).await;

    // Someone else takes the scarce units between payment and fulfilment.
    h.inventory
        .reserve(&format!("item-{scarce}"), Uuid::new_v4(), 3, 0)
        .await
        .unwrap();

    let result = h.coordinator.fulfil_order(order_id, None).await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));

    // The first item's hold was given back and the order cancelled.
    assert_eq!(
        h.inventory
            .stock_for_product(available)
            .await
            .unwrap()
            .available,
        5
    );
    let order = h.orders.get(order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_fulfilment_retry_does_not_double_reserve() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 5)]);
    let order_id = paid_order(&h, &[(product, 2)]).await;

    h.coordinator.fulfil_order(order_id, None).await.unwrap();
    // A retry of the workflow hits the idempotent reserve and then fails
    // on the shipped status, leaving the counters alone.
    let retry = h.coordinator.fulfil_order(order_id, None).await;
    assert!(matches!(retry, Err(Error::FailedPrecondition(_))));

    assert_eq!(
        h.inventory.stock_for_product(product).await.unwrap().available,
        3
    );
    assert_eq!(h.inventory.reservations().len(), 1);
}

// ============================================================================
// SETTLEMENT
// ============================================================================

#[tokio::test]
async fn test_delivery_fulfils_reservations() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 5)]);
    let order_id = paid_order(&h, &[(product, 2)]).await;
    h.coordinator.fulfil_order(order_id, None).await.unwrap();

    h.orders
        .update_status(order_id, OrderStatus::Delivered, None)
        .await
        .unwrap();
    h.coordinator.handle_delivered(order_id).await.unwrap();

    let reservations = h.inventory.reservations();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].status, "fulfilled");
}

#[tokio::test]
async fn test_cancellation_releases_reservations() {
    let product = Uuid::new_v4();
    let h = harness(&[(product, 5)]);
    let order_id = paid_order(&h, &[(product, 2)]).await;
    h.coordinator.fulfil_order(order_id, None).await.unwrap();

    // Cancellation settlement gives the held units back.
    h.coordinator.handle_cancelled(order_id).await.unwrap();

    assert_eq!(
        h.inventory.stock_for_product(product).await.unwrap().available,
        5
    );
    let reservations = h.inventory.reservations();
    assert_eq!(reservations[0].status, "released");

    // Settlement is idempotent: replaying the event changes nothing.
    h.coordinator.handle_cancelled(order_id).await.unwrap();
    assert_eq!(
        h.inventory.stock_for_product(product).await.unwrap().available,
        5
    );
}
