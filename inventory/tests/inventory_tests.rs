// ============================================================================
// MERIDIAN - INVENTORY ENGINE TESTS
// ============================================================================
// Module: inventory/tests/inventory_tests.rs
// Description: Engine-level scenarios over the in-memory repositories:
//              stock invariants, the reservation protocol, availability,
//              nearby lookup, transfers and POS adjustments
// ============================================================================

use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use meridian_inventory::models::{
    AvailabilityQuery, CreateItemRequest, CreateLocationRequest, PosAdjustmentItem,
    PosTransactionType, ReservationStatus, StockStatus, TransferStatus,
};
use meridian_inventory::repository::{
    InMemoryInventoryRepository, InMemoryLocationRepository, InMemoryReservationRepository,
    InMemoryTransferRepository,
};
use meridian_inventory::InventoryService;
use meridian_shared::events::{EventType, InMemoryEventPublisher};
use meridian_shared::types::PageRequest;
use meridian_shared::Error;

struct Harness {
    service: InventoryService,
    events: Arc<InMemoryEventPublisher>,
}

fn harness() -> Harness {
    let items = Arc::new(InMemoryInventoryRepository::new());
    let reservations = Arc::new(InMemoryReservationRepository::new(&items));
    let transfers = Arc::new(InMemoryTransferRepository::new());
    let locations = Arc::new(InMemoryLocationRepository::new());
    let events = InMemoryEventPublisher::new();

    let service = InventoryService::new(
        items,
        reservations,
        transfers,
        locations,
        Arc::clone(&events) as Arc<dyn meridian_shared::events::EventPublisher>,
    );
    Harness { service, events }
}

fn item_request(product_id: Uuid, location_id: Uuid, quantity: i32) -> CreateItemRequest {
    CreateItemRequest {
        product_id,
        sku: format!("SKU-{}", &product_id.to_string()[..8]),
        location_id,
        quantity,
        reorder_threshold: 2,
        reorder_amount: 10,
    }
}

fn location_at(name: &str, lat: f64, lon: f64) -> CreateLocationRequest {
    CreateLocationRequest {
        name: name.to_string(),
        location_type: "store".to_string(),
        address: None,
        latitude: Some(lat),
        longitude: Some(lon),
    }
}

// ============================================================================
// ITEM OPERATIONS
// ============================================================================

#[tokio::test]
async fn test_create_item_rejects_duplicates() {
    let h = harness();
    let product = Uuid::new_v4();
    let location = Uuid::new_v4();

    h.service
        .create_item(item_request(product, location, 5))
        .await
        .unwrap();
    let duplicate = h.service.create_item(item_request(product, location, 3)).await;
    assert!(matches!(duplicate, Err(Error::AlreadyExists(_))));
}

#[tokio::test]
async fn test_create_item_rejects_negative_quantity() {
    let h = harness();
    let result = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), -1))
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_stock_add_remove_adjust() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 10))
        .await
        .unwrap();

    let item = h
        .service
        .add_stock(item.id, 5, "restock", None)
        .await
        .unwrap();
    assert_eq!(item.quantity, 15);

    let item = h
        .service
        .remove_stock(item.id, 3, "damage", None)
        .await
        .unwrap();
    assert_eq!(item.quantity, 12);

    let item = h.service.adjust(item.id, 7, "recount", None).await.unwrap();
    assert_eq!(item.quantity, 7);

    // The audit trail records every mutation.
    let movements = h
        .service
        .movements(item.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(movements.len(), 3);
}

#[tokio::test]
async fn test_remove_stock_never_cuts_into_reserved() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    h.service
        .reserve(item.id, Uuid::new_v4(), 3, None)
        .await
        .unwrap();

    // available is 2; removing 3 would dip into the reservation.
    let result = h.service.remove_stock(item.id, 3, "sale", None).await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));

    // Removing exactly the free units is fine.
    let item = h.service.remove_stock(item.id, 2, "sale", None).await.unwrap();
    assert_eq!(item.quantity, 3);
    assert_eq!(item.reserved, 3);
    assert_eq!(item.available(), 0);
}

#[tokio::test]
async fn test_remove_last_unit_with_nothing_reserved() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 4))
        .await
        .unwrap();

    let item = h.service.remove_stock(item.id, 4, "sale", None).await.unwrap();
    assert_eq!(item.quantity, 0);
}

#[tokio::test]
async fn test_adjust_cannot_drop_below_reserved() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 10))
        .await
        .unwrap();
    h.service
        .reserve(item.id, Uuid::new_v4(), 4, None)
        .await
        .unwrap();

    let result = h.service.adjust(item.id, 3, "recount", None).await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));

    let item = h.service.adjust(item.id, 4, "recount", None).await.unwrap();
    assert_eq!(item.quantity, 4);
    assert_eq!(item.reserved, 4);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let h = harness();
    let result = h.service.add_stock(Uuid::new_v4(), 1, "restock", None).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

// ============================================================================
// RESERVATION PROTOCOL
// ============================================================================

#[tokio::test]
async fn test_reserve_boundary_at_available() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    h.service
        .reserve(item.id, Uuid::new_v4(), 3, None)
        .await
        .unwrap();

    // available is 2: reserving exactly 2 succeeds, 3 fails.
    let order = Uuid::new_v4();
    h.service.reserve(item.id, order, 2, None).await.unwrap();
    let too_many = h.service.reserve(item.id, Uuid::new_v4(), 1, None).await;
    assert!(matches!(too_many, Err(Error::InsufficientStock(_))));
}

#[tokio::test]
async fn test_reserve_is_idempotent_per_order_item() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    let order = Uuid::new_v4();

    let first = h.service.reserve(item.id, order, 2, None).await.unwrap();
    let second = h.service.reserve(item.id, order, 2, None).await.unwrap();

    assert_eq!(first.id, second.id);
    let item = h.service.get_item(item.id).await.unwrap();
    assert_eq!(item.reserved, 2);
}

#[tokio::test]
async fn test_oversell_protection_under_concurrency() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    h.service
        .reserve(item.id, Uuid::new_v4(), 3, None)
        .await
        .unwrap();

    // available = 2. A wants 2, B wants 1: whichever lands first wins and
    // the other must fail; the counters never oversell.
    let (a, b) = tokio::join!(
        h.service.reserve(item.id, Uuid::new_v4(), 2, None),
        h.service.reserve(item.id, Uuid::new_v4(), 1, None),
    );
    assert!(a.is_ok() != b.is_ok(), "exactly one reservation must win");

    let item = h.service.get_item(item.id).await.unwrap();
    assert!(item.reserved <= item.quantity);
    assert_eq!(item.available(), item.quantity - item.reserved);
    let expected_reserved = if a.is_ok() { 5 } else { 4 };
    assert_eq!(item.reserved, expected_reserved);
}

#[tokio::test]
async fn test_release_returns_units_and_is_idempotent() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    let reservation = h
        .service
        .reserve(item.id, Uuid::new_v4(), 3, None)
        .await
        .unwrap();

    let released = h.service.release(reservation.id, "changed mind").await.unwrap();
    assert_eq!(released.status, ReservationStatus::Released);
    assert_eq!(h.service.get_item(item.id).await.unwrap().reserved, 0);

    // Second release leaves everything as-is.
    let again = h.service.release(reservation.id, "again").await.unwrap();
    assert_eq!(again.status, ReservationStatus::Released);
    let item = h.service.get_item(item.id).await.unwrap();
    assert_eq!(item.reserved, 0);
    assert_eq!(item.quantity, 5);
}

#[tokio::test]
async fn test_fulfil_converts_hold_into_deduction() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    let reservation = h
        .service
        .reserve(item.id, Uuid::new_v4(), 3, None)
        .await
        .unwrap();

    let fulfilled = h.service.fulfil(reservation.id).await.unwrap();
    assert_eq!(fulfilled.status, ReservationStatus::Fulfilled);

    let item = h.service.get_item(item.id).await.unwrap();
    assert_eq!(item.quantity, 2);
    assert_eq!(item.reserved, 0);

    // Repeat fulfilment does not deduct twice.
    h.service.fulfil(reservation.id).await.unwrap();
    let item = h.service.get_item(item.id).await.unwrap();
    assert_eq!(item.quantity, 2);
}

#[tokio::test]
async fn test_reservation_expiry_sweep() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    let reservation = h
        .service
        .reserve(item.id, Uuid::new_v4(), 3, Some(Duration::milliseconds(50)))
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    let swept = h.service.sweep_expired(100).await.unwrap();
    assert_eq!(swept, 1);

    let reservation = h
        .service
        .reservations_for_order(reservation.order_id)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(reservation.status, ReservationStatus::Expired);
    assert_eq!(h.service.get_item(item.id).await.unwrap().reserved, 0);

    // A second sweep finds nothing; releases stay idempotent.
    assert_eq!(h.service.sweep_expired(100).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reservation_events_are_emitted() {
    let h = harness();
    let item = h
        .service
        .create_item(item_request(Uuid::new_v4(), Uuid::new_v4(), 5))
        .await
        .unwrap();
    let reservation = h
        .service
        .reserve(item.id, Uuid::new_v4(), 2, None)
        .await
        .unwrap();
    h.service.release(reservation.id, "test").await.unwrap();

    let reserved = h.events.events_of(EventType::InventoryReserved).await;
    assert_eq!(reserved.len(), 1);
    assert_eq!(reserved[0].aggregate_id, item.id);

    let released = h.events.events_of(EventType::InventoryReleased).await;
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].data["reason"], "test");
}

// ============================================================================
// AVAILABILITY & NEARBY
// ============================================================================

#[tokio::test]
async fn test_check_availability_statuses() {
    let h = harness();
    let location = Uuid::new_v4();

    let healthy = Uuid::new_v4();
    h.service
        .create_item(item_request(healthy, location, 10))
        .await
        .unwrap();

    let low = Uuid::new_v4();
    let low_item = h
        .service
        .create_item(item_request(low, location, 1))
        .await
        .unwrap();
    assert!(low_item.available() < low_item.reorder_threshold);

    let empty = Uuid::new_v4();
    let empty_item = h
        .service
        .create_item(item_request(empty, location, 2))
        .await
        .unwrap();
    h.service
        .reserve(empty_item.id, Uuid::new_v4(), 2, None)
        .await
        .unwrap();

    let missing = Uuid::new_v4();

    let queries: Vec<AvailabilityQuery> = [healthy, low, empty, missing]
        .into_iter()
        .map(|product_id| AvailabilityQuery {
            product_id,
            quantity: 1,
        })
        .collect();
    let results = h.service.check_availability(location, &queries).await.unwrap();

    assert_eq!(results[0].status, StockStatus::InStock);
    assert!(results[0].in_stock);
    assert_eq!(results[1].status, StockStatus::LowStock);
    assert_eq!(results[2].status, StockStatus::OutOfStock);
    assert!(!results[2].in_stock);
    assert_eq!(results[3].status, StockStatus::NotFound);
    assert_eq!(results[3].available_quantity, 0);
}

#[tokio::test]
async fn test_check_availability_rejects_empty_list() {
    let h = harness();
    let result = h.service.check_availability(Uuid::new_v4(), &[]).await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[tokio::test]
async fn test_nearby_lookup_filters_by_radius() {
    let h = harness();
    let origin = h
        .service
        .create_location(location_at("origin", 0.0, 0.0))
        .await
        .unwrap();
    let near = h
        .service
        .create_location(location_at("near", 0.0, 1.0))
        .await
        .unwrap();
    let far = h
        .service
        .create_location(location_at("far", 0.0, 2.0))
        .await
        .unwrap();

    let product = Uuid::new_v4();
    h.service
        .create_item(item_request(product, near.id, 5))
        .await
        .unwrap();
    h.service
        .create_item(item_request(product, far.id, 5))
        .await
        .unwrap();

    let queries = vec![AvailabilityQuery {
        product_id: product,
        quantity: 1,
    }];
    let nearby = h
        .service
        .get_nearby_inventory(origin.id, &queries, 150.0, None)
        .await
        .unwrap();

    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].location.id, near.id);
    // One degree of longitude on the equator is ~111.19 km; allow 1%.
    assert!((nearby[0].distance_km - 111.19).abs() / 111.19 < 0.01);
    assert_eq!(nearby[0].availability[0].status, StockStatus::InStock);
}

#[tokio::test]
async fn test_nearby_lookup_edge_cases() {
    let h = harness();
    let origin = h
        .service
        .create_location(location_at("origin", 0.0, 0.0))
        .await
        .unwrap();

    let queries = vec![AvailabilityQuery {
        product_id: Uuid::new_v4(),
        quantity: 1,
    }];

    // Empty item list is a caller error.
    let empty = h
        .service
        .get_nearby_inventory(origin.id, &[], 100.0, None)
        .await;
    assert!(matches!(empty, Err(Error::InvalidArgument(_))));

    // Unknown origin fails not_found.
    let missing = h
        .service
        .get_nearby_inventory(Uuid::new_v4(), &queries, 100.0, None)
        .await;
    assert!(matches!(missing, Err(Error::NotFound(_))));

    // An origin without coordinates cannot anchor a lookup.
    let blind = h
        .service
        .create_location(CreateLocationRequest {
            name: "warehouse".to_string(),
            location_type: "warehouse".to_string(),
            address: None,
            latitude: None,
            longitude: None,
        })
        .await
        .unwrap();
    let result = h
        .service
        .get_nearby_inventory(blind.id, &queries, 100.0, None)
        .await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_nearby_lookup_truncates_and_sorts() {
    let h = harness();
    let origin = h
        .service
        .create_location(location_at("origin", 0.0, 0.0))
        .await
        .unwrap();
    for step in 1..=5 {
        h.service
            .create_location(location_at(&format!("l{step}"), 0.0, 0.1 * step as f64))
            .await
            .unwrap();
    }

    let queries = vec![AvailabilityQuery {
        product_id: Uuid::new_v4(),
        quantity: 1,
    }];
    let nearby = h
        .service
        .get_nearby_inventory(origin.id, &queries, 500.0, Some(3))
        .await
        .unwrap();

    assert_eq!(nearby.len(), 3);
    assert!(nearby.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

// ============================================================================
// TRANSFERS
// ============================================================================

#[tokio::test]
async fn test_transfer_completion_moves_stock() {
    let h = harness();
    let product = Uuid::new_v4();
    let source_location = Uuid::new_v4();
    let dest_location = Uuid::new_v4();
    let actor = Uuid::new_v4();

    let source = h
        .service
        .create_item(item_request(product, source_location, 10))
        .await
        .unwrap();

    let transfer = h
        .service
        .create_transfer(product, &source.sku, source_location, dest_location, 4, actor)
        .await
        .unwrap();
    assert_eq!(transfer.status, TransferStatus::Requested);

    let transfer = h.service.start_transfer(transfer.id, actor, None).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::InTransit);
    assert_eq!(transfer.approved_by, Some(actor));

    let transfer = h.service.complete_transfer(transfer.id, actor).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Completed);

    // Destination was created on demand; total stock is conserved.
    let source = h.service.get_item(source.id).await.unwrap();
    let dest = h
        .service
        .get_item_by_product(product, Some(dest_location))
        .await
        .unwrap();
    assert_eq!(source.quantity, 6);
    assert_eq!(dest.quantity, 4);
    assert_eq!(source.quantity + dest.quantity, 10);
}

#[tokio::test]
async fn test_transfer_cancelled_when_source_drained() {
    let h = harness();
    let product = Uuid::new_v4();
    let source_location = Uuid::new_v4();
    let actor = Uuid::new_v4();

    let source = h
        .service
        .create_item(item_request(product, source_location, 5))
        .await
        .unwrap();
    let transfer = h
        .service
        .create_transfer(product, &source.sku, source_location, Uuid::new_v4(), 4, actor)
        .await
        .unwrap();
    h.service.start_transfer(transfer.id, actor, None).await.unwrap();

    // Stock drains while the truck is on the road.
    h.service.remove_stock(source.id, 3, "sale", None).await.unwrap();

    let result = h.service.complete_transfer(transfer.id, actor).await;
    assert!(matches!(result, Err(Error::InsufficientStock(_))));
    let transfer = h.service.get_transfer(transfer.id).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Cancelled);
}

#[tokio::test]
async fn test_transfer_state_machine_is_enforced() {
    let h = harness();
    let product = Uuid::new_v4();
    let source_location = Uuid::new_v4();
    let actor = Uuid::new_v4();

    let source = h
        .service
        .create_item(item_request(product, source_location, 5))
        .await
        .unwrap();
    let transfer = h
        .service
        .create_transfer(product, &source.sku, source_location, Uuid::new_v4(), 2, actor)
        .await
        .unwrap();

    // requested cannot jump straight to completed.
    let result = h.service.complete_transfer(transfer.id, actor).await;
    assert!(matches!(result, Err(Error::InvalidTransition { .. })));

    // Terminal states are immutable.
    let transfer = h.service.cancel_transfer(transfer.id, actor).await.unwrap();
    assert_eq!(transfer.status, TransferStatus::Cancelled);
    let result = h.service.start_transfer(transfer.id, actor, None).await;
    assert!(matches!(result, Err(Error::InvalidTransition { .. })));

    // Source and destination must differ.
    let result = h
        .service
        .create_transfer(product, &source.sku, source_location, source_location, 1, actor)
        .await;
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

// ============================================================================
// POS ADJUSTMENTS
// ============================================================================

#[tokio::test]
async fn test_pos_sale_and_return() {
    let h = harness();
    let location = Uuid::new_v4();
    let staff = Uuid::new_v4();
    let product = Uuid::new_v4();
    let item = h
        .service
        .create_item(item_request(product, location, 10))
        .await
        .unwrap();

    let sale = h
        .service
        .pos_adjustment(
            location,
            PosTransactionType::Sale,
            staff,
            &[PosAdjustmentItem {
                product_id: product,
                quantity: 3,
                incoming: false,
            }],
        )
        .await
        .unwrap();
    assert!(sale.success);
    assert_eq!(h.service.get_item(item.id).await.unwrap().quantity, 7);

    let returned = h
        .service
        .pos_adjustment(
            location,
            PosTransactionType::Return,
            staff,
            &[PosAdjustmentItem {
                product_id: product,
                quantity: 1,
                incoming: false,
            }],
        )
        .await
        .unwrap();
    assert!(returned.success);
    assert_eq!(h.service.get_item(item.id).await.unwrap().quantity, 8);
}

#[tokio::test]
async fn test_pos_exchange_mixes_directions() {
    let h = harness();
    let location = Uuid::new_v4();
    let staff = Uuid::new_v4();
    let outgoing = Uuid::new_v4();
    let incoming = Uuid::new_v4();

    let out_item = h
        .service
        .create_item(item_request(outgoing, location, 5))
        .await
        .unwrap();
    let in_item = h
        .service
        .create_item(item_request(incoming, location, 5))
        .await
        .unwrap();

    let result = h
        .service
        .pos_adjustment(
            location,
            PosTransactionType::Exchange,
            staff,
            &[
                PosAdjustmentItem {
                    product_id: outgoing,
                    quantity: 1,
                    incoming: false,
                },
                PosAdjustmentItem {
                    product_id: incoming,
                    quantity: 1,
                    incoming: true,
                },
            ],
        )
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(h.service.get_item(out_item.id).await.unwrap().quantity, 4);
    assert_eq!(h.service.get_item(in_item.id).await.unwrap().quantity, 6);
}

#[tokio::test]
async fn test_pos_partial_failure_reports_per_item() {
    let h = harness();
    let location = Uuid::new_v4();
    let staff = Uuid::new_v4();
    let stocked = Uuid::new_v4();
    let missing = Uuid::new_v4();

    h.service
        .create_item(item_request(stocked, location, 10))
        .await
        .unwrap();

    let result = h
        .service
        .pos_adjustment(
            location,
            PosTransactionType::Sale,
            staff,
            &[
                PosAdjustmentItem {
                    product_id: stocked,
                    quantity: 2,
                    incoming: false,
                },
                PosAdjustmentItem {
                    product_id: missing,
                    quantity: 1,
                    incoming: false,
                },
            ],
        )
        .await
        .unwrap();

    // Items are independent: the stocked one went through, the overall
    // flag reflects the failure.
    assert!(!result.success);
    assert!(result.results[0].success);
    assert!(!result.results[1].success);
    assert!(result.results[1].error.is_some());

    let item = h
        .service
        .get_item_by_product(stocked, Some(location))
        .await
        .unwrap();
    assert_eq!(item.quantity, 8);
}

// ============================================================================
// LISTING & PAGINATION
// ============================================================================

#[tokio::test]
async fn test_pagination_normalization() {
    let h = harness();
    let location = Uuid::new_v4();
    for _ in 0..3 {
        h.service
            .create_item(item_request(Uuid::new_v4(), location, 1))
            .await
            .unwrap();
    }

    // page=0 normalizes to 1, page_size=0 to the default, oversized clamps.
    let (items, total) = h
        .service
        .list_items(Some(location), &PageRequest::new(0, 0))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 3);

    let page = PageRequest::new(1, 500);
    assert_eq!(page.page_size, 100);
}
