// ============================================================================
// MERIDIAN - INVENTORY PERSISTENCE PORTS
// ============================================================================
// Module: inventory/src/repository/mod.rs
// Description: Repository traits for the inventory aggregates. Postgres
//              implementations live alongside; the in-memory ones back the
//              hermetic test suites.
// ============================================================================

pub mod items;
pub mod locations;
pub mod memory;
pub mod reservations;
pub mod transfers;

pub use items::PgInventoryRepository;
pub use locations::PgLocationRepository;
pub use memory::{
    InMemoryInventoryRepository, InMemoryLocationRepository, InMemoryReservationRepository,
    InMemoryTransferRepository,
};
pub use reservations::PgReservationRepository;
pub use transfers::PgTransferRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use meridian_shared::types::PageRequest;
use meridian_shared::Result;

use crate::models::{
    InventoryItem, Reservation, ReservationStatus, StockMovement, StoreLocation, Transfer,
    TransferStatus, UpdateLocationRequest,
};

/// Stock record repository. All mutating operations are single conditional
/// updates at the storage layer: the invariant sits in the predicate, so
/// they stay safe under concurrent callers.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn create(&self, item: &InventoryItem) -> Result<InventoryItem>;

    async fn get(&self, id: Uuid) -> Result<Option<InventoryItem>>;

    /// Lookup by product, optionally pinned to a location. Without a
    /// location the earliest-created live record wins.
    async fn get_by_product(
        &self,
        product_id: Uuid,
        location_id: Option<Uuid>,
    ) -> Result<Option<InventoryItem>>;

    async fn list(
        &self,
        location_id: Option<Uuid>,
        page: &PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)>;

    /// Atomically increment quantity by `delta > 0`.
    async fn add_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem>;

    /// Atomically decrement quantity by `delta > 0` iff
    /// `quantity - reserved >= delta`; fails `insufficient_stock` otherwise.
    /// Quantity never drops below `reserved`.
    async fn remove_stock(
        &self,
        id: Uuid,
        delta: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem>;

    /// Set quantity absolutely, subject to `new_quantity >= reserved`.
    async fn adjust(
        &self,
        id: Uuid,
        new_quantity: i32,
        reason: &str,
        actor_id: Option<Uuid>,
    ) -> Result<InventoryItem>;

    async fn soft_delete(&self, id: Uuid) -> Result<()>;

    async fn movements(&self, item_id: Uuid, page: &PageRequest) -> Result<Vec<StockMovement>>;
}

/// Reservation repository. Creation and termination update the owning
/// item's `reserved` counter in the same transaction, keeping the
/// sum-of-active-reservations invariant.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Create an active reservation iff `quantity <= available`. Idempotent
    /// on (order_id, item_id): a repeat call returns the existing
    /// reservation unchanged.
    async fn reserve(
        &self,
        item_id: Uuid,
        order_id: Uuid,
        quantity: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Reservation>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>>;

    /// Move an active reservation to a terminal state and apply the
    /// counter effects: released/expired give units back to availability,
    /// fulfilled turns the hold into a permanent deduction. Calling this on
    /// an already-terminal reservation returns it unchanged.
    async fn terminate(&self, id: Uuid, terminal: ReservationStatus) -> Result<Reservation>;

    async fn list_for_order(&self, order_id: Uuid) -> Result<Vec<Reservation>>;

    /// Active reservations whose `expires_at` has passed, oldest first.
    async fn find_expired(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Reservation>>;
}

#[async_trait]
pub trait TransferRepository: Send + Sync {
    async fn create(&self, transfer: &Transfer) -> Result<Transfer>;

    async fn get(&self, id: Uuid) -> Result<Option<Transfer>>;

    /// Status CAS: the update only applies while the row is still in
    /// `from`. `Ok(None)` means the predicate did not match.
    async fn transition(
        &self,
        id: Uuid,
        from: TransferStatus,
        to: TransferStatus,
        approved_by: Option<Uuid>,
        estimated_arrival: Option<DateTime<Utc>>,
    ) -> Result<Option<Transfer>>;

    async fn list(
        &self,
        status: Option<TransferStatus>,
        page: &PageRequest,
    ) -> Result<(Vec<Transfer>, i64)>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &StoreLocation) -> Result<StoreLocation>;

    async fn get(&self, id: Uuid) -> Result<Option<StoreLocation>>;

    async fn update(
        &self,
        id: Uuid,
        update: &UpdateLocationRequest,
    ) -> Result<Option<StoreLocation>>;

    /// Soft delete: the location stays addressable but drops out of
    /// listings and nearby lookups.
    async fn deactivate(&self, id: Uuid) -> Result<bool>;

    async fn list(
        &self,
        include_inactive: bool,
        page: &PageRequest,
    ) -> Result<(Vec<StoreLocation>, i64)>;

    /// Active locations that carry coordinates, for the nearby lookup.
    async fn list_active_geocoded(&self) -> Result<Vec<StoreLocation>>;
}
