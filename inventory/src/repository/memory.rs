//! In-memory repository implementations.
//!
//! These honor the same contracts as the Postgres ones (conditional
//! updates, idempotent reservation protocol, error classification) with a
//! mutex standing in for storage-level atomicity. The test suites run the
//! whole engine against them; nothing here talks to the network.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use meridian_shared::types::PageRequest;
use meridian_shared::{Error, Result};

use super::{InventoryRepository, LocationRepository, ReservationRepository, TransferRepository};
use crate::models::{
    InventoryItem, Reservation, ReservationStatus, StockMovement, StoreLocation, Transfer,
    TransferStatus, UpdateLocationRequest,
};

#[derive(Default)]
struct ItemsInner {
    items: HashMap<Uuid, InventoryItem>,
    movements: Vec<StockMovement>,
}

impl ItemsInner {
    fn record_movement(&mut self, item_id: Uuid, delta: i32, reason: &str, actor_id: Option<Uuid>) {
        self.movements.push(StockMovement {
            id: Uuid::new_v4(),
            inventory_item_id: item_id,
            delta,
            reason: reason.to_string(),
            actor_id,
            reference_id: None,
            created_at: Utc::now(),
        });
    }

    fn live_mut(&mut self, id: Uuid) -> Option<&mut InventoryItem> {
        self.items
            .get_mut(&id)
            .filter(|item| item.deleted_at.is_none())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryInventoryRepository {
    inner: Arc<Mutex<ItemsInner>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ItemsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn create(&self, item: &InventoryItem) -> Result<InventoryItem> {
        let mut inner = self.lock();
        let duplicate = inner.items.values().any(|existing| {
            existing.deleted_at.is_none()
                && existing.location_id == item.location_id
                && (existing.product_id == item.product_id
                    || (!item.sku.is_empty() && existing.sku == item.sku))
        });
        if duplicate {
            return Err(Error::AlreadyExists(format!(
                "inventory item for product {} at location {}",
                item.product_id, item.location_id
            )));
        }
        inner.items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<InventoryItem>> {
        let inner = self.lock();
        Ok(inner
            .items
            .get(&id)
            .filter(|item| item.deleted_at.is_none())
            .cloned())
    }

    async fn get_by_product(
        &self,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<InventoryItem>> {
        let inner = self.lock();
        let mut candidates: Vec<&InventoryItem> = inner
            .items
            .values()
            .filter(|item| item.deleted_at.is_none() && item.product_id == product_id)
            .filter(|item| location_id.map_or(true, |l| item.location_id == l))
            .collect();
        candidates.sort_by_key(|item| item.created_at);
        Ok(candidates.first().map(|item| (*item).clone()))
    }

    async fn list(
        &self,
        location_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)> {
        let inner = self.lock();
        let mut items: Vec<InventoryItem> = inner
            .items
            .values()
            .filter(|item| page.include_deleted || item.deleted_at.is_none())
            .filter(|item| location_id.map_or(true, |l| item.location_id == l))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as i64;
        let paged = items
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((paged, total))
    }

    async fn add_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if delta <= 0 {
            return Err(Error::InvalidArgument("delta must be positive".to_string()));
        }
        let mut inner = self.lock();
        let Some(item) = inner.live_mut(id) else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };
        item.quantity += delta;
        item.last_updated = Utc::now();
        let item = item.clone();
        inner.record_movement(id, delta, reason, actor_id);
        Ok(item)
    }

    async fn remove_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if delta <= 0 {
            return Err(Error::InvalidArgument("delta must be positive".to_string()));
        }
        let mut inner = self.lock();
        let Some(item) = inner.live_mut(id) else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };
        if item.quantity - item.reserved < delta {
            return Err(Error::InsufficientStock(format!(
                "cannot remove {delta} units from item {id}"
            )));
        }
        item.quantity -= delta;
        item.last_updated = Utc::now();
        let item = item.clone();
        inner.record_movement(id, -delta, reason, actor_id);
        Ok(item)
    }

    async fn adjust(
        &self,
        id: Uuid,
        new_quantity: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem> {
        if new_quantity < 0 {
            return Err(Error::InvalidArgument(
                "quantity must not be negative".to_string(),
            ));
        }
        let mut inner = self.lock();
        let Some(item) = inner.live_mut(id) else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };
        if new_quantity < item.reserved {
            return Err(Error::InsufficientStock(format!(
                "cannot adjust item {id} below its reserved count"
            )));
        }
        let delta = new_quantity - item.quantity;
        item.quantity = new_quantity;
        item.last_updated = Utc::now();
        let item = item.clone();
        inner.record_movement(id, delta, reason, actor_id);
        Ok(item)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        let Some(item) = inner.live_mut(id) else {
            return Err(Error::NotFound(format!("inventory item {id}")));
        };
        item.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn movements(&self, item_id: Uuid, page: &PageRequest) -> Result<Vec<StockMovement>> {
        let inner = self.lock();
        let mut movements: Vec<StockMovement> = inner
            .movements
            .iter()
            .filter(|m| m.inventory_item_id == item_id)
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(movements
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }
}

pub struct InMemoryReservationRepository {
    items: Arc<Mutex<ItemsInner>>,
    reservations: Mutex<HashMap<Uuid, Reservation>>,
}

impl InMemoryReservationRepository {
    /// Shares the item store with the inventory repository so counter
    /// updates stay coupled, as they are in storage.
    pub fn new(items: &InMemoryInventoryRepository) -> Self {
        Self {
            items: Arc::clone(&items.inner),
            reservations: Mutex::new(HashMap::new()),
        }
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, ItemsInner> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_reservations(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Reservation>> {
        self.reservations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn reserve(
        &self,
        item_id: Uuid,
        order_id: Uuid,
        quantity: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Reservation> {
        if quantity <= 0 {
            return Err(Error::InvalidArgument(
                "reservation quantity must be positive".to_string(),
            ));
        }

        let mut items = self.lock_items();
        let mut reservations = self.lock_reservations();

        if let Some(existing) = reservations.values().find(|r| {
            r.order_id == order_id
                && r.inventory_item_id == item_id
                && r.status == ReservationStatus::Active
        }) {
            return Ok(existing.clone());
        }

        let Some(item) = items.live_mut(item_id) else {
            return Err(Error::NotFound(format!("inventory item {item_id}")));
        };
        if item.quantity - item.reserved < quantity {
            return Err(Error::InsufficientStock(format!(
                "cannot reserve {quantity} units of item {item_id}"
            )));
        }
        item.reserved += quantity;
        item.last_updated = Utc::now();

        let reservation = Reservation {
            id: Uuid::new_v4(),
            inventory_item_id: item_id,
            order_id,
            quantity,
            status: ReservationStatus::Active,
            reserved_at: Utc::now(),
            expires_at,
        };
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>> {
        Ok(self.lock_reservations().get(&id).cloned())
    }

    async fn terminate(&self, id: Uuid, terminal: ReservationStatus) -> Result<Reservation> {
        if !terminal.is_terminal() {
            return Err(Error::InvalidArgument(
                "terminate requires a terminal status".to_string(),
            ));
        }

        let mut items = self.lock_items();
        let mut reservations = self.lock_reservations();

        let Some(reservation) = reservations.get_mut(&id) else {
            return Err(Error::NotFound(format!("reservation {id}")));
        };
        if reservation.status.is_terminal() {
            return Ok(reservation.clone());
        }

        reservation.status = terminal;
        let snapshot = reservation.clone();

        let Some(item) = items.live_mut(snapshot.inventory_item_id) else {
            return Err(Error::Internal(format!(
                "reservation {id} references missing item"
            )));
        };
        item.reserved -= snapshot.quantity;
        if terminal == ReservationStatus::Fulfilled {
            item.quantity -= snapshot.quantity;
        }
        item.last_updated = Utc::now();

        Ok(snapshot)
    }

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Reservation>> {
        let reservations = self.lock_reservations();
        let mut matching: Vec<Reservation> = reservations
            .values()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.reserved_at);
        Ok(matching)
    }

    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Reservation>> {
        let reservations = self.lock_reservations();
        let mut expired: Vec<Reservation> = reservations
            .values()
            .filter(|r| r.status == ReservationStatus::Active && r.expires_at < now)
            .cloned()
            .collect();
        expired.sort_by_key(|r| r.expires_at);
        expired.truncate(limit as usize);
        Ok(expired)
    }
}

#[derive(Default)]
pub struct InMemoryTransferRepository {
    transfers: Mutex<HashMap<Uuid, Transfer>>,
}

impl InMemoryTransferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Transfer>> {
        self.transfers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TransferRepository for InMemoryTransferRepository {
    async fn create(&self, transfer: &Transfer) -> Result<Transfer> {
        self.lock().insert(transfer.id, transfer.clone());
        Ok(transfer.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transfer>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: TransferStatus,
        to: TransferStatus,
        approved_by: Option<Uuid>,
        estimated_arrival: Option<DateTime<Utc>>,
    ) -> Result<Option<Transfer>> {
        let mut transfers = self.lock();
        let Some(transfer) = transfers.get_mut(&id) else {
            return Ok(None);
        };
        if transfer.status != from {
            return Ok(None);
        }
        transfer.status = to;
        if approved_by.is_some() {
            transfer.approved_by = approved_by;
        }
        if estimated_arrival.is_some() {
            transfer.estimated_arrival = estimated_arrival;
        }
        transfer.updated_at = Utc::now();
        Ok(Some(transfer.clone()))
    }

    async fn list(
        &self,
        status: Option<TransferStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Transfer>, i64)> {
        let transfers = self.lock();
        let mut matching: Vec<Transfer> = transfers
            .values()
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        let total = matching.len() as i64;
        let paged = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((paged, total))
    }
}

#[derive(Default)]
pub struct InMemoryLocationRepository {
    locations: Mutex<HashMap<Uuid, StoreLocation>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, StoreLocation>> {
        self.locations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn create(&self, location: &StoreLocation) -> Result<StoreLocation> {
        self.lock().insert(location.id, location.clone());
        Ok(location.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoreLocation>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateLocationRequest,
    ) -> Result<Option<StoreLocation>> {
        let mut locations = self.lock();
        let Some(location) = locations.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            location.name = name.clone();
        }
        if let Some(location_type) = &update.location_type {
            location.location_type = location_type.clone();
        }
        if let Some(address) = &update.address {
            location.address = Some(address.clone());
        }
        if let Some(latitude) = update.latitude {
            location.latitude = Some(latitude);
        }
        if let Some(longitude) = update.longitude {
            location.longitude = Some(longitude);
        }
        if let Some(is_active) = update.is_active {
            location.is_active = is_active;
        }
        location.updated_at = Utc::now();
        Ok(Some(location.clone()))
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let mut locations = self.lock();
        match locations.get_mut(&id) {
            Some(location) => {
                location.is_active = false;
                location.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(
        &self,
        include_inactive: bool,
        page: &PageRequest,
    ) -> Result<(Vec<StoreLocation>, i64)> {
        let locations = self.lock();
        let mut matching: Vec<StoreLocation> = locations
            .values()
            .filter(|l| include_inactive || l.is_active)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let paged = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((paged, total))
    }

    async fn list_active_geocoded(&self) -> Result<Vec<StoreLocation>> {
        let locations = self.lock();
        let mut matching: Vec<StoreLocation> = locations
            .values()
            .filter(|l| l.is_active && l.latitude.is_some() && l.longitude.is_some())
            .cloned()
            .collect();
        matching.sort_by_key(|l| l.created_at);
        Ok(matching)
    }
}
