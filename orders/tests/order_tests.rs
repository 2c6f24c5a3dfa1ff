// ============================================================================
// MERIDIAN - ORDER ENGINE TESTS
// ============================================================================
// Module: orders/tests/order_tests.rs
// Description: Lifecycle scenarios over the in-memory repository: totals,
//              transitions, optimistic locking and event emission
// ============================================================================

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

use meridian_orders::models::{
    CreateOrderRequest, NewOrderItem, Order, OrderSource, OrderStatus,
};
use meridian_orders::repository::{InMemoryOrderRepository, OrderRepository};
use meridian_orders::OrderService;
use meridian_shared::events::{EventPublisher, EventType, InMemoryEventPublisher};
use meridian_shared::types::PageRequest;
use meridian_shared::Error;

struct Harness {
    service: OrderService,
    repository: Arc<InMemoryOrderRepository>,
    events: Arc<InMemoryEventPublisher>,
}

fn harness() -> Harness {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let events = InMemoryEventPublisher::new();
    let service = OrderService::new(
        Arc::clone(&repository) as Arc<dyn OrderRepository>,
        Arc::clone(&events) as Arc<dyn EventPublisher>,
    );
    Harness {
        service,
        repository,
        events,
    }
}

fn two_item_request(user_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id,
        items: vec![
            NewOrderItem {
                product_id: Uuid::new_v4(),
                sku: "sku1".to_string(),
                name: "First".to_string(),
                quantity: 2,
                price: dec!(10.00),
            },
            NewOrderItem {
                product_id: Uuid::new_v4(),
                sku: "sku2".to_string(),
                name: "Second".to_string(),
                quantity: 1,
                price: dec!(5.00),
            },
        ],
        shipping_address: None,
        billing_address: None,
        source: OrderSource::Online,
        location_id: None,
        staff_id: None,
        notes: None,
    }
}

async fn created_order(h: &Harness) -> Order {
    h.service
        .create_order(two_item_request(Uuid::new_v4()), None)
        .await
        .unwrap()
}

// ============================================================================
// CREATION
// ============================================================================

#[tokio::test]
async fn test_create_and_pay_order() {
    let h = harness();
    let user = Uuid::new_v4();
    let order = h
        .service
        .create_order(two_item_request(user), None)
        .await
        .unwrap();

    assert_eq!(order.total_amount, dec!(25.00));
    assert_eq!(order.items[0].subtotal, dec!(20.00));
    assert_eq!(order.items[1].subtotal, dec!(5.00));
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.version, 1);

    let paid = h
        .service
        .add_payment(order.id, "card", "tx1", dec!(25.00), None)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.version, 2);
    assert_eq!(paid.payment.as_ref().unwrap().transaction_id, "tx1");

    let events = h.events.events_of(EventType::OrderPaid).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].aggregate_id, order.id);
    assert_eq!(events[0].data["previous_status"], "created");
    assert_eq!(events[0].data["new_status"], "paid");
    assert_eq!(events[0].data["total_amount"], "25.00");

    let processed = h.events.events_of(EventType::PaymentProcessed).await;
    assert_eq!(processed.len(), 1);
}

#[tokio::test]
async fn test_total_is_sum_of_rounded_subtotals() {
    let h = harness();
    let request = CreateOrderRequest {
        user_id: Uuid::new_v4(),
        items: vec![
            NewOrderItem {
                product_id: Uuid::new_v4(),
                sku: "s1".to_string(),
                name: "a".to_string(),
                quantity: 3,
                price: dec!(3.333),
            },
            NewOrderItem {
                product_id: Uuid::new_v4(),
                sku: "s2".to_string(),
                name: "b".to_string(),
                quantity: 1,
                price: dec!(0.01),
            },
        ],
        shipping_address: None,
        billing_address: None,
        source: OrderSource::Api,
        location_id: None,
        staff_id: None,
        notes: None,
    };
    let order = h.service.create_order(request, None).await.unwrap();

    let expected: Decimal = order.items.iter().map(|i| i.subtotal).sum();
    assert_eq!(order.total_amount, expected);
    assert_eq!(order.total_amount, dec!(10.01));
}

#[tokio::test]
async fn test_creation_validation() {
    let h = harness();

    let mut empty = two_item_request(Uuid::new_v4());
    empty.items.clear();
    assert!(matches!(
        h.service.create_order(empty, None).await,
        Err(Error::InvalidArgument(_))
    ));

    let mut zero_qty = two_item_request(Uuid::new_v4());
    zero_qty.items[0].quantity = 0;
    assert!(matches!(
        h.service.create_order(zero_qty, None).await,
        Err(Error::InvalidArgument(_))
    ));

    let mut pos = two_item_request(Uuid::new_v4());
    pos.source = OrderSource::Pos;
    assert!(matches!(
        h.service.create_order(pos, None).await,
        Err(Error::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_pos_order_carries_location_and_staff() {
    let h = harness();
    let mut request = two_item_request(Uuid::new_v4());
    request.source = OrderSource::Pos;
    request.location_id = Some(Uuid::new_v4());
    request.staff_id = Some(Uuid::new_v4());

    let order = h.service.create_order(request, None).await.unwrap();
    assert!(order.location_id.is_some());
    assert!(order.staff_id.is_some());
}

// ============================================================================
// TRANSITIONS
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_to_delivered() {
    let h = harness();
    let order = created_order(&h).await;

    let order = h
        .service
        .update_status(order.id, OrderStatus::Pending, None)
        .await
        .unwrap();
    let order = h
        .service
        .add_payment(order.id, "card", "tx9", dec!(25.00), None)
        .await
        .unwrap();
    let order = h
        .service
        .add_tracking(order.id, "TRACK-1", None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
    assert_eq!(order.tracking_code.as_deref(), Some("TRACK-1"));

    let order = h
        .service
        .update_status(order.id, OrderStatus::Delivered, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.completed_at.is_some());
    assert_eq!(order.version, 5);

    assert_eq!(h.events.events_of(EventType::OrderShipped).await.len(), 1);
    assert_eq!(h.events.events_of(EventType::OrderDelivered).await.len(), 1);
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected() {
    let h = harness();
    let order = created_order(&h).await;

    // created cannot ship.
    assert!(matches!(
        h.service
            .update_status(order.id, OrderStatus::Shipped, None)
            .await,
        Err(Error::InvalidTransition { .. })
    ));

    // Terminal states never move again.
    h.service.cancel(order.id, "test", None).await.unwrap();
    assert!(matches!(
        h.service
            .update_status(order.id, OrderStatus::Pending, None)
            .await,
        Err(Error::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_failed_orders_can_retry_payment() {
    let h = harness();
    let order = created_order(&h).await;

    let order = h
        .service
        .update_status(order.id, OrderStatus::Failed, None)
        .await
        .unwrap();
    assert_eq!(h.events.events_of(EventType::OrderFailed).await.len(), 1);

    let order = h
        .service
        .update_status(order.id, OrderStatus::Pending, None)
        .await
        .unwrap();
    let order = h
        .service
        .add_payment(order.id, "card", "tx2", dec!(25.00), None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
}

#[tokio::test]
async fn test_version_cas_rejects_stale_writer() {
    let h = harness();
    let order = created_order(&h).await;

    // Two writers read the same version; only one conditional write lands.
    let snapshot = h.repository.get(order.id).await.unwrap().unwrap();

    let mut first = snapshot.clone();
    first.status = OrderStatus::Pending;
    let updated = h
        .repository
        .update_with_version(&first, snapshot.version)
        .await
        .unwrap();
    assert_eq!(updated.version, snapshot.version + 1);

    let mut second = snapshot.clone();
    second.status = OrderStatus::Paid;
    let stale = h
        .repository
        .update_with_version(&second, snapshot.version)
        .await;
    assert!(matches!(stale, Err(Error::OptimisticLockFailed(_))));

    // After a fresh read the second writer's transition revalidates.
    let fresh = h.repository.get(order.id).await.unwrap().unwrap();
    assert_eq!(fresh.status, OrderStatus::Pending);
    assert_eq!(fresh.version, 2);
}

#[tokio::test]
async fn test_transition_lands_after_concurrent_mutation() {
    let h = harness();
    let order = created_order(&h).await;

    // Another writer bumps the version first; the transition re-reads and
    // still lands on the fresh version.
    let mut tweak = h.repository.get(order.id).await.unwrap().unwrap();
    tweak.notes.push("priority".to_string());
    h.repository
        .update_with_version(&tweak, tweak.version)
        .await
        .unwrap();

    let order = h
        .service
        .update_status(order.id, OrderStatus::Pending, None)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.version, 3);
}

#[tokio::test]
async fn test_notes_bump_version() {
    let h = harness();
    let order = created_order(&h).await;

    let order = h
        .service
        .add_note(order.id, "leave at the door", None)
        .await
        .unwrap();
    assert_eq!(order.version, 2);
    assert_eq!(order.notes, vec!["leave at the door".to_string()]);
    assert_eq!(order.status, OrderStatus::Created);
}

#[tokio::test]
async fn test_cancel_emits_reasoned_event() {
    let h = harness();
    let order = created_order(&h).await;

    h.service
        .cancel(order.id, "customer changed mind", None)
        .await
        .unwrap();

    let events = h.events.events_of(EventType::OrderCancelled).await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].data["reason"], "customer changed mind");
}

// ============================================================================
// QUERIES
// ============================================================================

#[tokio::test]
async fn test_get_missing_order_is_not_found() {
    let h = harness();
    assert!(matches!(
        h.service.get(Uuid::new_v4()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_user_listing_and_status_counts() {
    let h = harness();
    let user = Uuid::new_v4();

    for _ in 0..3 {
        h.service
            .create_order(two_item_request(user), None)
            .await
            .unwrap();
    }
    let other = created_order(&h).await;
    h.service.cancel(other.id, "noise", None).await.unwrap();

    let (orders, total) = h
        .service
        .list_user_orders(user, &PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(orders.len(), 2);

    assert_eq!(
        h.service.count_by_status(OrderStatus::Created).await.unwrap(),
        3
    );
    assert_eq!(
        h.service
            .count_by_status(OrderStatus::Cancelled)
            .await
            .unwrap(),
        1
    );

    let (cancelled, _) = h
        .service
        .list_orders(Some(OrderStatus::Cancelled), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, other.id);
}
