// ============================================================================
// MERIDIAN - INVENTORY MODELS
// ============================================================================
// Module: inventory/src/models.rs
// Description: Stock records, reservations, transfers, store locations and
//              the POS adjustment types
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use meridian_shared::types::Address;

/// The stock record at one location for one product.
///
/// Invariants: `0 <= reserved <= quantity`; (product_id, location_id) and
/// (sku, location_id) are unique among live rows. Rows are soft-deleted,
/// never dropped.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub location_id: Uuid,
    pub quantity: i32,
    pub reserved: i32,
    pub reorder_threshold: i32,
    pub reorder_amount: i32,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// Units free to be newly reserved.
    pub fn available(&self) -> i32 {
        self.quantity - self.reserved
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Active,
    Fulfilled,
    Released,
    Expired,
}

impl ReservationStatus {
    /// Terminal states are immutable.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Fulfilled => "fulfilled",
            ReservationStatus::Released => "released",
            ReservationStatus::Expired => "expired",
        }
    }
}

/// Soft hold on `quantity` units of an inventory item for an order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub order_id: Uuid,
    pub quantity: i32,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "transfer_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Requested,
    InTransit,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Completed | TransferStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: TransferStatus) -> bool {
        use TransferStatus::*;
        match (self, next) {
            (Requested, InTransit) => true,
            (Requested, Cancelled) | (InTransit, Cancelled) => true,
            (InTransit, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Requested => "requested",
            TransferStatus::InTransit => "in_transit",
            TransferStatus::Completed => "completed",
            TransferStatus::Cancelled => "cancelled",
        }
    }
}

/// A staged movement of stock between two locations.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: Uuid,
    pub product_id: Uuid,
    pub sku: String,
    pub source_location_id: Uuid,
    pub dest_location_id: Uuid,
    pub quantity: i32,
    pub status: TransferStatus,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A physical or logical site holding stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLocation {
    pub id: Uuid,
    pub name: String,
    pub location_type: String,
    pub address: Option<Address>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Audit record for every stock mutation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub delta: i32,
    pub reason: String,
    pub actor_id: Option<Uuid>,
    pub reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// AVAILABILITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
    NotFound,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in_stock",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::NotFound => "not_found",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemAvailability {
    pub product_id: Uuid,
    pub in_stock: bool,
    pub available_quantity: i32,
    pub status: StockStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyInventory {
    pub location: StoreLocation,
    pub distance_km: f64,
    pub availability: Vec<ItemAvailability>,
}

// ============================================================================
// POS ADJUSTMENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosTransactionType {
    Sale,
    Return,
    Exchange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosAdjustmentItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// For exchanges: true when the item comes back into stock.
    pub incoming: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosItemOutcome {
    pub product_id: Uuid,
    pub success: bool,
    pub error: Option<String>,
}

/// Per-item outcomes of one POS transaction. Items are processed
/// independently; `success` is true iff every item succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosAdjustmentResult {
    pub success: bool,
    pub results: Vec<PosItemOutcome>,
}

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemRequest {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    pub location_id: Uuid,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0))]
    pub reorder_threshold: i32,
    #[validate(range(min = 0))]
    pub reorder_amount: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub location_type: String,
    pub address: Option<Address>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocationRequest {
    pub name: Option<String>,
    pub location_type: Option<String>,
    pub address: Option<Address>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_is_quantity_minus_reserved() {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sku: "SKU-1".to_string(),
            location_id: Uuid::new_v4(),
            quantity: 5,
            reserved: 3,
            reorder_threshold: 2,
            reorder_amount: 10,
            deleted_at: None,
            created_at: Utc::now(),
            last_updated: Utc::now(),
        };
        assert_eq!(item.available(), 2);
    }

    #[rstest::rstest]
    #[case(TransferStatus::Requested, TransferStatus::InTransit, true)]
    #[case(TransferStatus::Requested, TransferStatus::Cancelled, true)]
    #[case(TransferStatus::Requested, TransferStatus::Completed, false)]
    #[case(TransferStatus::InTransit, TransferStatus::Completed, true)]
    #[case(TransferStatus::InTransit, TransferStatus::Cancelled, true)]
    #[case(TransferStatus::Completed, TransferStatus::Cancelled, false)]
    #[case(TransferStatus::Cancelled, TransferStatus::InTransit, false)]
    fn test_transfer_transitions(
        #[case] from: TransferStatus,
        #[case] to: TransferStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_reservation_terminal_states() {
        assert!(!ReservationStatus::Active.is_terminal());
        assert!(ReservationStatus::Fulfilled.is_terminal());
        assert!(ReservationStatus::Released.is_terminal());
        assert!(ReservationStatus::Expired.is_terminal());
    }
}
