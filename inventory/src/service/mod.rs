// ============================================================================
// MERIDIAN - INVENTORY SERVICE
// ============================================================================
// Module: inventory/src/service/mod.rs
// Description: The inventory engine: stock operations, the reservation
//              protocol, availability and nearby lookups, transfers and
//              POS adjustments
// ============================================================================

pub mod geo;
pub mod sweeper;

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use meridian_shared::events::{DomainEvent, EventPublisher, EventType, INVENTORY_EVENTS};
use meridian_shared::types::PageRequest;
use meridian_shared::{Error, Result};

use crate::models::{
    AvailabilityQuery, CreateItemRequest, CreateLocationRequest, InventoryItem, ItemAvailability,
    NearbyInventory, PosAdjustmentItem, PosAdjustmentResult, PosItemOutcome, PosTransactionType,
    Reservation, ReservationStatus, StockMovement, StockStatus, StoreLocation, Transfer,
    TransferStatus, UpdateLocationRequest,
};
use crate::repository::{
    InventoryRepository, LocationRepository, ReservationRepository, TransferRepository,
};

/// Operators tune this per deployment; 24 h is the default hold.
pub const DEFAULT_RESERVATION_TTL_HOURS: i64 = 24;

/// Nearby lookups return at most this many locations unless asked for more.
pub const DEFAULT_MAX_NEARBY_LOCATIONS: usize = 10;

pub struct InventoryService {
    items: Arc<dyn InventoryRepository>,
    reservations: Arc<dyn ReservationRepository>,
    transfers: Arc<dyn TransferRepository>,
    locations: Arc<dyn LocationRepository>,
    events: Arc<dyn EventPublisher>,
    default_ttl: Duration,
}

impl InventoryService {
    pub fn new(
        items: Arc<dyn InventoryRepository>,
        reservations: Arc<dyn ReservationRepository>,
        transfers: Arc<dyn TransferRepository>,
        locations: Arc<dyn LocationRepository>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            items,
            reservations,
            transfers,
            locations,
            events,
            default_ttl: Duration::hours(DEFAULT_RESERVATION_TTL_HOURS),
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.events.publish(INVENTORY_EVENTS, &event).await {
            warn!(
                event_type = %event.event_type,
                aggregate_id = %event.aggregate_id,
                "failed to publish inventory event: {e}"
            );
        }
    }

    // ========================================================================
    // ITEM OPERATIONS
    // ========================================================================

    pub async fn create_item(&self, request: CreateItemRequest) -> Result<InventoryItem> {
        request
            .validate()
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            product_id: request.product_id,
            sku: request.sku,
            location_id: request.location_id,
            quantity: request.quantity,
            reserved: 0,
            reorder_threshold: request.reorder_threshold,
            reorder_amount: request.reorder_amount,
            deleted_at: None,
            created_at: now,
            last_updated: now,
        };
        self.items.create(&item).await
    }

    pub async fn get_item(&self, id: Uuid) -> Result<InventoryItem> {
        self.items
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("inventory item {id}")))
    }

    pub async fn get_item_by_product(
        &self,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        self.items
            .get_by_product(product_id, location_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("inventory for product {product_id}")))
    }

    pub async fn list_items(
        &self,
        location_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)> {
        self.items.list(location_id, page).await
    }

    pub async fn add_stock(
        &self,
        item_id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        self.items.add_stock(item_id, delta, reason, actor_id).await
    }

    pub async fn remove_stock(
        &self,
        item_id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        self.items
            .remove_stock(item_id, delta, reason, actor_id)
            .await
    }

    pub async fn adjust(
        &self,
        item_id: Uuid,
        new_quantity: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        self.items
            .adjust(item_id, new_quantity, reason, actor_id)
            .await
    }

    pub async fn movements(&self, item_id: Uuid, page: &PageRequest) -> Result<Vec<StockMovement>> {
        self.items.movements(item_id, page).await
    }

    // ========================================================================
    // RESERVATION PROTOCOL
    // ========================================================================

    /// Place a soft hold for an order. Idempotent on (order, item).
    pub async fn reserve(
        &self,
        item_id: Uuid,
        order_id: Uuid,
        quantity: i32,
        ttl: Option<Duration>,
    ) -> Result<Reservation> {
        let expires_at = Utc::now() + ttl.unwrap_or(self.default_ttl);
        let reservation = self
            .reservations
            .reserve(item_id, order_id, quantity, expires_at)
            .await?;

        let event = DomainEvent::builder(EventType::InventoryReserved, item_id)
            .data(serde_json::json!({
                "reservation_id": reservation.id,
                "order_id": order_id,
                "quantity": reservation.quantity,
                "expires_at": reservation.expires_at,
            }))?
            .build();
        self.publish(event).await;

        Ok(reservation)
    }

    /// Release an active hold; terminal reservations are left untouched.
    pub async fn release(&self, reservation_id: Uuid, reason: &str) -> Result<Reservation> {
        self.terminate_with_event(reservation_id, ReservationStatus::Released, reason)
            .await
    }

    /// Convert an active hold into a permanent deduction. Repeat calls are
    /// no-ops.
    pub async fn fulfil(&self, reservation_id: Uuid) -> Result<Reservation> {
        self.reservations
            .terminate(reservation_id, ReservationStatus::Fulfilled)
            .await
    }

    /// Expire an overdue hold. Only the sweeper calls this; expiry is never
    /// surfaced to callers as an error.
    pub async fn expire(&self, reservation_id: Uuid) -> Result<Reservation> {
        self.terminate_with_event(reservation_id, ReservationStatus::Expired, "expired")
            .await
    }

    async fn terminate_with_event(
        &self,
        reservation_id: Uuid,
        terminal: ReservationStatus,
        reason: &str,
    ) -> Result<Reservation> {
        let reservation = self.reservations.terminate(reservation_id, terminal).await?;

        if reservation.status == terminal {
            let event =
                DomainEvent::builder(EventType::InventoryReleased, reservation.inventory_item_id)
                    .data(serde_json::json!({
                        "reservation_id": reservation.id,
                        "order_id": reservation.order_id,
                        "quantity": reservation.quantity,
                        "reason": reason,
                    }))?
                    .build();
            self.publish(event).await;
        }

        Ok(reservation)
    }

    pub async fn reservations_for_order(&self, order_id: Uuid) -> Result<Vec<Reservation>> {
        self.reservations.list_for_order(order_id).await
    }

    /// One sweep pass: release up to `batch` expired holds. Returns how many
    /// were expired; each release is idempotent, so concurrent replicas are
    /// safe.
    pub async fn sweep_expired(&self, batch: i64) -> Result<usize> {
        let expired = self.reservations.find_expired(Utc::now(), batch).await?;
        let mut swept = 0;
        for reservation in expired {
            match self.expire(reservation.id).await {
                Ok(_) => swept += 1,
                Err(e) => warn!(
                    reservation_id = %reservation.id,
                    "failed to expire reservation: {e}"
                ),
            }
        }
        Ok(swept)
    }

    // ========================================================================
    // AVAILABILITY
    // ========================================================================

    pub async fn check_availability(
        &self,
        location_id: Uuid,
        queries: &[AvailabilityQuery],
    ) -> Result<Vec<ItemAvailability>> {
        if queries.is_empty() {
            return Err(Error::InvalidArgument(
                "availability check requires at least one item".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let item = self
                .items
                .get_by_product(query.product_id, Some(location_id))
                .await?;

            let result = match item {
                None => ItemAvailability {
                    product_id: query.product_id,
                    in_stock: false,
                    available_quantity: 0,
                    status: StockStatus::NotFound,
                },
                Some(item) => {
                    let available = item.available();
                    let status = if available <= 0 {
                        StockStatus::OutOfStock
                    } else if available < item.reorder_threshold {
                        StockStatus::LowStock
                    } else {
                        StockStatus::InStock
                    };
                    ItemAvailability {
                        product_id: query.product_id,
                        in_stock: available >= query.quantity.max(1),
                        available_quantity: available,
                        status,
                    }
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    /// Availability at active locations within `radius_km` of the origin,
    /// nearest first. Deterministic for identical inputs: ties break on
    /// location id.
    pub async fn get_nearby_inventory(
        &self,
        origin_location_id: Uuid,
        queries: &[AvailabilityQuery],
        radius_km: f64,
        max_locations: Option<usize>,
    ) -> Result<Vec<NearbyInventory>> {
        if queries.is_empty() {
            return Err(Error::InvalidArgument(
                "nearby lookup requires at least one item".to_string(),
            ));
        }
        if radius_km <= 0.0 {
            return Err(Error::InvalidArgument(
                "radius must be positive".to_string(),
            ));
        }

        let origin = self
            .locations
            .get(origin_location_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("location {origin_location_id}")))?;
        let (Some(origin_lat), Some(origin_lon)) = (origin.latitude, origin.longitude) else {
            return Err(Error::NotFound(format!(
                "location {origin_location_id} has no coordinates"
            )));
        };

        let mut candidates: Vec<(f64, StoreLocation)> = Vec::new();
        for location in self.locations.list_active_geocoded().await? {
            if location.id == origin_location_id {
                continue;
            }
            let (Some(lat), Some(lon)) = (location.latitude, location.longitude) else {
                continue;
            };
            let distance = geo::haversine_km(origin_lat, origin_lon, lat, lon);
            if distance <= radius_km {
                candidates.push((distance, location));
            }
        }

        candidates.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        candidates.truncate(max_locations.unwrap_or(DEFAULT_MAX_NEARBY_LOCATIONS));

        let mut nearby = Vec::with_capacity(candidates.len());
        for (distance_km, location) in candidates {
            let availability = self.check_availability(location.id, queries).await?;
            nearby.push(NearbyInventory {
                location,
                distance_km,
                availability,
            });
        }
        Ok(nearby)
    }

    // ========================================================================
    // TRANSFERS
    // ========================================================================

    pub async fn create_transfer(
        &self,
        product_id: Uuid,
        sku: &str,
        source_location_id: Uuid,
        dest_location_id: Uuid,
        quantity: i32,
        requested_by: Uuid,
    ) -> Result<Transfer> {
        if source_location_id == dest_location_id {
            return Err(Error::InvalidArgument(
                "source and destination must differ".to_string(),
            ));
        }
        if quantity <= 0 {
            return Err(Error::InvalidArgument(
                "transfer quantity must be positive".to_string(),
            ));
        }

        // The transfer references live stock at the source from day one;
        // availability is re-validated again at completion time.
        self.items
            .get_by_product(product_id, Some(source_location_id))
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "inventory for product {product_id} at location {source_location_id}"
                ))
            })?;

        let now = Utc::now();
        let transfer = Transfer {
            id: Uuid::new_v4(),
            product_id,
            sku: sku.to_string(),
            source_location_id,
            dest_location_id,
            quantity,
            status: TransferStatus::Requested,
            requested_by,
            approved_by: None,
            estimated_arrival: None,
            requested_at: now,
            updated_at: now,
        };
        self.transfers.create(&transfer).await
    }

    pub async fn get_transfer(&self, id: Uuid) -> Result<Transfer> {
        self.transfers
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("transfer {id}")))
    }

    pub async fn list_transfers(
        &self,
        status: Option<TransferStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Transfer>, i64)> {
        self.transfers.list(status, page).await
    }

    pub async fn start_transfer(
        &self,
        id: Uuid,
        actor_id: Uuid,
        estimated_arrival: Option<chrono::DateTime<Utc>>,
    ) -> Result<Transfer> {
        let moved = self
            .transfers
            .transition(
                id,
                TransferStatus::Requested,
                TransferStatus::InTransit,
                Some(actor_id),
                estimated_arrival,
            )
            .await?;

        match moved {
            Some(transfer) => Ok(transfer),
            None => Err(self.transition_failure(id, TransferStatus::InTransit).await?),
        }
    }

    pub async fn cancel_transfer(&self, id: Uuid, actor_id: Uuid) -> Result<Transfer> {
        for from in [TransferStatus::Requested, TransferStatus::InTransit] {
            if let Some(transfer) = self
                .transfers
                .transition(id, from, TransferStatus::Cancelled, Some(actor_id), None)
                .await?
            {
                return Ok(transfer);
            }
        }
        Err(self.transition_failure(id, TransferStatus::Cancelled).await?)
    }

    /// Completion moves the stock: debit the source, credit the destination
    /// (creating it empty if absent), then mark the transfer done. A failed
    /// destination credit is compensated by re-adding to the source.
    pub async fn complete_transfer(&self, id: Uuid, actor_id: Uuid) -> Result<Transfer> {
        let transfer = self.get_transfer(id).await?;
        if transfer.status != TransferStatus::InTransit {
            return Err(Error::InvalidTransition {
                from: transfer.status.as_str().to_string(),
                to: TransferStatus::Completed.as_str().to_string(),
            });
        }

        // Re-read the source; stock may have drained while in transit.
        let source = self
            .items
            .get_by_product(transfer.product_id, Some(transfer.source_location_id))
            .await?;
        let source = match source {
            Some(item) if item.available() >= transfer.quantity => item,
            _ => {
                self.transfers
                    .transition(
                        id,
                        TransferStatus::InTransit,
                        TransferStatus::Cancelled,
                        Some(actor_id),
                        None,
                    )
                    .await?;
                return Err(Error::InsufficientStock(format!(
                    "source location {} no longer holds {} units",
                    transfer.source_location_id, transfer.quantity
                )));
            }
        };

        let dest = match self
            .items
            .get_by_product(transfer.product_id, Some(transfer.dest_location_id))
            .await?
        {
            Some(item) => item,
            None => {
                let created = self
                    .items
                    .create(&InventoryItem {
                        id: Uuid::new_v4(),
                        product_id: transfer.product_id,
                        sku: transfer.sku.clone(),
                        location_id: transfer.dest_location_id,
                        quantity: 0,
                        reserved: 0,
                        reorder_threshold: 0,
                        reorder_amount: 0,
                        deleted_at: None,
                        created_at: Utc::now(),
                        last_updated: Utc::now(),
                    })
                    .await;
                match created {
                    Ok(item) => item,
                    // A racing transfer created it first; use theirs.
                    Err(Error::AlreadyExists(_)) => {
                        self.get_item_by_product(
                            transfer.product_id,
                            Some(transfer.dest_location_id),
                        )
                        .await?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.items
            .remove_stock(source.id, transfer.quantity, "transfer_out", Some(actor_id))
            .await?;

        if let Err(credit_err) = self
            .items
            .add_stock(dest.id, transfer.quantity, "transfer_in", Some(actor_id))
            .await
        {
            // Best-effort compensation: put the units back on the source.
            if let Err(refund_err) = self
                .items
                .add_stock(source.id, transfer.quantity, "transfer_refund", Some(actor_id))
                .await
            {
                tracing::error!(
                    transfer_id = %id,
                    "transfer compensation failed, stock lost from source {}: {refund_err}",
                    source.id
                );
            }
            return Err(Error::Unavailable(format!(
                "destination credit failed: {credit_err}"
            )));
        }

        let completed = self
            .transfers
            .transition(
                id,
                TransferStatus::InTransit,
                TransferStatus::Completed,
                Some(actor_id),
                None,
            )
            .await?;
        completed.ok_or_else(|| {
            Error::Internal(format!("transfer {id} changed state during completion"))
        })
    }

    async fn transition_failure(&self, id: Uuid, to: TransferStatus) -> Result<Error> {
        let current = self.get_transfer(id).await?;
        Ok(Error::InvalidTransition {
            from: current.status.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }

    // ========================================================================
    // POS ADJUSTMENTS
    // ========================================================================

    /// Apply a point-of-sale transaction. Items are processed independently
    /// and each reports its own outcome; the bundle is not atomic.
    pub async fn pos_adjustment(
        &self,
        location_id: Uuid,
        transaction_type: PosTransactionType,
        staff_id: Uuid,
        items: &[PosAdjustmentItem],
    ) -> Result<PosAdjustmentResult> {
        if items.is_empty() {
            return Err(Error::InvalidArgument(
                "pos adjustment requires at least one item".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let incoming = match transaction_type {
                PosTransactionType::Sale => false,
                PosTransactionType::Return => true,
                PosTransactionType::Exchange => item.incoming,
            };
            let outcome = self
                .apply_pos_item(location_id, transaction_type, staff_id, item, incoming)
                .await;
            results.push(match outcome {
                Ok(()) => PosItemOutcome {
                    product_id: item.product_id,
                    success: true,
                    error: None,
                },
                Err(e) => PosItemOutcome {
                    product_id: item.product_id,
                    success: false,
                    error: Some(e.to_string()),
                },
            });
        }

        let success = results.iter().all(|r| r.success);
        Ok(PosAdjustmentResult { success, results })
    }

    async fn apply_pos_item(
        &self,
        location_id: Uuid,
        transaction_type: PosTransactionType,
        staff_id: Uuid,
        item: &PosAdjustmentItem,
        incoming: bool,
    ) -> Result<()> {
        if item.quantity <= 0 {
            return Err(Error::InvalidArgument(
                "pos quantity must be positive".to_string(),
            ));
        }

        let stock = self
            .items
            .get_by_product(item.product_id, Some(location_id))
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "inventory for product {} at location {location_id}",
                    item.product_id
                ))
            })?;

        let reason = match (transaction_type, incoming) {
            (PosTransactionType::Sale, _) => "pos_sale",
            (PosTransactionType::Return, _) => "pos_return",
            (PosTransactionType::Exchange, true) => "pos_exchange_in",
            (PosTransactionType::Exchange, false) => "pos_exchange_out",
        };

        if incoming {
            self.items
                .add_stock(stock.id, item.quantity, reason, Some(staff_id))
                .await?;
        } else {
            self.items
                .remove_stock(stock.id, item.quantity, reason, Some(staff_id))
                .await?;
        }
        Ok(())
    }

    // ========================================================================
    // STORE LOCATIONS
    // ========================================================================

    pub async fn create_location(&self, request: CreateLocationRequest) -> Result<StoreLocation> {
        request
            .validate()
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        let now = Utc::now();
        let location = StoreLocation {
            id: Uuid::new_v4(),
            name: request.name,
            location_type: request.location_type,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.locations.create(&location).await
    }

    pub async fn get_location(&self, id: Uuid) -> Result<StoreLocation> {
        self.locations
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("location {id}")))
    }

    pub async fn update_location(
        &self,
        id: Uuid,
        update: UpdateLocationRequest,
    ) -> Result<StoreLocation> {
        self.locations
            .update(id, &update)
            .await?
            .ok_or_else(|| Error::NotFound(format!("location {id}")))
    }

    pub async fn deactivate_location(&self, id: Uuid) -> Result<()> {
        if self.locations.deactivate(id).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("location {id}")))
        }
    }

    pub async fn list_locations(
        &self,
        include_inactive: bool,
        page: &PageRequest,
    ) -> Result<(Vec<StoreLocation>, i64)> {
        self.locations.list(include_inactive, page).await
    }
}
