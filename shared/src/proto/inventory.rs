//! Inventory service contract: stock records, reservations, transfers,
//! availability lookups, store locations and POS adjustments.

use super::common::{Address, Page};

pub const SERVICE: &str = "meridian.inventory.v1";

pub mod methods {
    pub const CREATE_ITEM: &str = "meridian.inventory.v1/CreateItem";
    pub const GET_ITEM: &str = "meridian.inventory.v1/GetItem";
    pub const GET_ITEM_BY_PRODUCT: &str = "meridian.inventory.v1/GetItemByProduct";
    pub const LIST_ITEMS: &str = "meridian.inventory.v1/ListItems";
    pub const ADD_STOCK: &str = "meridian.inventory.v1/AddStock";
    pub const REMOVE_STOCK: &str = "meridian.inventory.v1/RemoveStock";
    pub const ADJUST_STOCK: &str = "meridian.inventory.v1/AdjustStock";
    pub const RESERVE: &str = "meridian.inventory.v1/Reserve";
    pub const RELEASE: &str = "meridian.inventory.v1/Release";
    pub const FULFIL: &str = "meridian.inventory.v1/Fulfil";
    pub const LIST_ORDER_RESERVATIONS: &str = "meridian.inventory.v1/ListOrderReservations";
    pub const CHECK_AVAILABILITY: &str = "meridian.inventory.v1/CheckAvailability";
    pub const GET_NEARBY_INVENTORY: &str = "meridian.inventory.v1/GetNearbyInventory";
    pub const CREATE_TRANSFER: &str = "meridian.inventory.v1/CreateTransfer";
    pub const START_TRANSFER: &str = "meridian.inventory.v1/StartTransfer";
    pub const COMPLETE_TRANSFER: &str = "meridian.inventory.v1/CompleteTransfer";
    pub const CANCEL_TRANSFER: &str = "meridian.inventory.v1/CancelTransfer";
    pub const GET_TRANSFER: &str = "meridian.inventory.v1/GetTransfer";
    pub const LIST_TRANSFERS: &str = "meridian.inventory.v1/ListTransfers";
    pub const POS_ADJUSTMENT: &str = "meridian.inventory.v1/PosAdjustment";
    pub const CREATE_LOCATION: &str = "meridian.inventory.v1/CreateLocation";
    pub const GET_LOCATION: &str = "meridian.inventory.v1/GetLocation";
    pub const UPDATE_LOCATION: &str = "meridian.inventory.v1/UpdateLocation";
    pub const DELETE_LOCATION: &str = "meridian.inventory.v1/DeleteLocation";
    pub const LIST_LOCATIONS: &str = "meridian.inventory.v1/ListLocations";
}

// ============================================================================
// ITEMS
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InventoryItem {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub location_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "5")]
    pub quantity: i32,
    #[prost(int32, tag = "6")]
    pub reserved: i32,
    #[prost(int32, tag = "7")]
    pub available: i32,
    #[prost(int32, tag = "8")]
    pub reorder_threshold: i32,
    #[prost(int32, tag = "9")]
    pub reorder_amount: i32,
    #[prost(string, tag = "10")]
    pub created_at: ::prost::alloc::string::String,
    #[prost(string, tag = "11")]
    pub last_updated: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateItemRequest {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub location_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub quantity: i32,
    #[prost(int32, tag = "5")]
    pub reorder_threshold: i32,
    #[prost(int32, tag = "6")]
    pub reorder_amount: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetItemByProductRequest {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    /// Optional: restrict the lookup to one location.
    #[prost(string, optional, tag = "2")]
    pub location_id: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsRequest {
    #[prost(string, optional, tag = "1")]
    pub location_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListItemsResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: ::prost::alloc::vec::Vec<InventoryItem>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StockChangeRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
    #[prost(string, tag = "3")]
    pub reason: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AdjustStockRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub new_quantity: i32,
    #[prost(string, tag = "3")]
    pub reason: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub actor_id: ::prost::alloc::string::String,
}

// ============================================================================
// RESERVATIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ReservationStatus {
    Unspecified = 0,
    Active = 1,
    Fulfilled = 2,
    Released = 3,
    Expired = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Reservation {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub inventory_item_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub quantity: i32,
    #[prost(enumeration = "ReservationStatus", tag = "5")]
    pub status: i32,
    #[prost(string, tag = "6")]
    pub reserved_at: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub expires_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReserveRequest {
    #[prost(string, tag = "1")]
    pub item_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "3")]
    pub quantity: i32,
    /// Time-to-live in seconds; 0 uses the engine default.
    #[prost(int64, tag = "4")]
    pub ttl_seconds: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReleaseRequest {
    #[prost(string, tag = "1")]
    pub reservation_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub reason: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FulfilRequest {
    #[prost(string, tag = "1")]
    pub reservation_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListOrderReservationsRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListOrderReservationsResponse {
    #[prost(message, repeated, tag = "1")]
    pub reservations: ::prost::alloc::vec::Vec<Reservation>,
}

// ============================================================================
// AVAILABILITY & NEARBY LOOKUP
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StockStatus {
    Unspecified = 0,
    InStock = 1,
    LowStock = 2,
    OutOfStock = 3,
    NotFound = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AvailabilityQuery {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AvailabilityResult {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub in_stock: bool,
    #[prost(int32, tag = "3")]
    pub available_quantity: i32,
    #[prost(enumeration = "StockStatus", tag = "4")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckAvailabilityRequest {
    #[prost(string, tag = "1")]
    pub location_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub items: ::prost::alloc::vec::Vec<AvailabilityQuery>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CheckAvailabilityResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: ::prost::alloc::vec::Vec<AvailabilityResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetNearbyInventoryRequest {
    #[prost(string, tag = "1")]
    pub origin_location_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub items: ::prost::alloc::vec::Vec<AvailabilityQuery>,
    #[prost(double, tag = "3")]
    pub radius_km: f64,
    /// 0 uses the default of 10.
    #[prost(int32, tag = "4")]
    pub max_locations: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NearbyLocation {
    #[prost(message, optional, tag = "1")]
    pub location: ::core::option::Option<StoreLocation>,
    #[prost(double, tag = "2")]
    pub distance_km: f64,
    #[prost(message, repeated, tag = "3")]
    pub availability: ::prost::alloc::vec::Vec<AvailabilityResult>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetNearbyInventoryResponse {
    #[prost(message, repeated, tag = "1")]
    pub locations: ::prost::alloc::vec::Vec<NearbyLocation>,
}

// ============================================================================
// TRANSFERS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TransferStatus {
    Unspecified = 0,
    Requested = 1,
    InTransit = 2,
    Completed = 3,
    Cancelled = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transfer {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub source_location_id: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub dest_location_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "6")]
    pub quantity: i32,
    #[prost(enumeration = "TransferStatus", tag = "7")]
    pub status: i32,
    #[prost(string, tag = "8")]
    pub requested_by: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "9")]
    pub approved_by: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "10")]
    pub estimated_arrival: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, tag = "11")]
    pub requested_at: ::prost::alloc::string::String,
    #[prost(string, tag = "12")]
    pub updated_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTransferRequest {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub source_location_id: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub dest_location_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "5")]
    pub quantity: i32,
    #[prost(string, tag = "6")]
    pub requested_by: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferActionRequest {
    #[prost(string, tag = "1")]
    pub transfer_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub actor_id: ::prost::alloc::string::String,
    /// Only meaningful for StartTransfer.
    #[prost(string, optional, tag = "3")]
    pub estimated_arrival: ::core::option::Option<::prost::alloc::string::String>,
    /// Only meaningful for CancelTransfer.
    #[prost(string, optional, tag = "4")]
    pub reason: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTransferRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTransfersRequest {
    #[prost(enumeration = "TransferStatus", optional, tag = "1")]
    pub status: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTransfersResponse {
    #[prost(message, repeated, tag = "1")]
    pub transfers: ::prost::alloc::vec::Vec<Transfer>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}

// ============================================================================
// POS ADJUSTMENTS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PosTransactionType {
    Unspecified = 0,
    Sale = 1,
    Return = 2,
    Exchange = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PosAdjustmentItem {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
    /// For exchanges: true when the item comes back into stock. Ignored for
    /// sales (always outgoing) and returns (always incoming).
    #[prost(bool, tag = "3")]
    pub incoming: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PosAdjustmentRequest {
    #[prost(string, tag = "1")]
    pub location_id: ::prost::alloc::string::String,
    #[prost(enumeration = "PosTransactionType", tag = "2")]
    pub transaction_type: i32,
    #[prost(string, tag = "3")]
    pub staff_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub items: ::prost::alloc::vec::Vec<PosAdjustmentItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PosItemResult {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, optional, tag = "3")]
    pub error: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PosAdjustmentResponse {
    /// True iff every item succeeded. The transaction is not atomic across
    /// items; callers needing all-or-nothing build sagas on top.
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(message, repeated, tag = "2")]
    pub results: ::prost::alloc::vec::Vec<PosItemResult>,
}

// ============================================================================
// STORE LOCATIONS
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StoreLocation {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub location_type: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "4")]
    pub address: ::core::option::Option<Address>,
    #[prost(double, optional, tag = "5")]
    pub latitude: ::core::option::Option<f64>,
    #[prost(double, optional, tag = "6")]
    pub longitude: ::core::option::Option<f64>,
    #[prost(bool, tag = "7")]
    pub is_active: bool,
    #[prost(string, tag = "8")]
    pub created_at: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub updated_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateLocationRequest {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub location_type: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub address: ::core::option::Option<Address>,
    #[prost(double, optional, tag = "4")]
    pub latitude: ::core::option::Option<f64>,
    #[prost(double, optional, tag = "5")]
    pub longitude: ::core::option::Option<f64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetLocationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateLocationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "2")]
    pub name: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "3")]
    pub location_type: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(message, optional, tag = "4")]
    pub address: ::core::option::Option<Address>,
    #[prost(double, optional, tag = "5")]
    pub latitude: ::core::option::Option<f64>,
    #[prost(double, optional, tag = "6")]
    pub longitude: ::core::option::Option<f64>,
    #[prost(bool, optional, tag = "7")]
    pub is_active: ::core::option::Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteLocationRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListLocationsRequest {
    #[prost(bool, tag = "1")]
    pub include_inactive: bool,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListLocationsResponse {
    #[prost(message, repeated, tag = "1")]
    pub locations: ::prost::alloc::vec::Vec<StoreLocation>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}
