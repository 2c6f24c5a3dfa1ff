//! Inventory service client

use serde::{Deserialize, Serialize};

use super::ClientConfig;
use crate::error::Result;
use crate::proto::common::Page;
use crate::proto::inventory as pb;
use crate::rpc::RpcClient;
use crate::types::{Address, PageRequest, SortOrder};

// ============================================================================
// DTOs: identifiers and timestamps are opaque strings on this boundary
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub product_id: String,
    pub sku: String,
    pub location_id: String,
    pub quantity: i32,
    pub reserved: i32,
    pub available: i32,
    pub reorder_threshold: i32,
    pub reorder_amount: i32,
    pub created_at: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub inventory_item_id: String,
    pub order_id: String,
    pub quantity: i32,
    pub status: String,
    pub reserved_at: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub product_id: String,
    pub in_stock: bool,
    pub available_quantity: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLocation {
    pub id: String,
    pub name: String,
    pub location_type: String,
    pub address: Option<Address>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyLocation {
    pub location: StoreLocation,
    pub distance_km: f64,
    pub availability: Vec<AvailabilityResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub product_id: String,
    pub sku: String,
    pub source_location_id: String,
    pub dest_location_id: String,
    pub quantity: i32,
    pub status: String,
    pub requested_by: String,
    pub approved_by: Option<String>,
    pub estimated_arrival: Option<String>,
    pub requested_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosItemResult {
    pub product_id: String,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosAdjustmentOutcome {
    pub success: bool,
    pub results: Vec<PosItemResult>,
}

// ============================================================================
// CLIENT
// ============================================================================

pub struct InventoryClient {
    rpc: RpcClient,
}

impl InventoryClient {
    pub fn new(config: ClientConfig) -> Self {
        let rpc = RpcClient::new(config.address, config.connect_timeout)
            .with_call_timeout(config.call_timeout);
        Self { rpc }
    }

    pub async fn close(&self) {
        self.rpc.close().await;
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.rpc.health_check().await?)
    }

    // ------------------------------------------------------------------ items

    pub async fn create_item(
        &self,
        product_id: &str,
        sku: &str,
        location_id: &str,
        quantity: i32,
        reorder_threshold: i32,
        reorder_amount: i32,
    ) -> Result<InventoryItem> {
        let request = pb::CreateItemRequest {
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            location_id: location_id.to_string(),
            quantity,
            reorder_threshold,
            reorder_amount,
        };
        let item: pb::InventoryItem = self.rpc.call(pb::methods::CREATE_ITEM, &request).await?;
        Ok(item_from_proto(item))
    }

    pub async fn get_item(&self, id: &str) -> Result<InventoryItem> {
        let request = pb::GetItemRequest { id: id.to_string() };
        let item: pb::InventoryItem = self.rpc.call(pb::methods::GET_ITEM, &request).await?;
        Ok(item_from_proto(item))
    }

    pub async fn get_item_by_product(
        &self,
        product_id: &str,
        location_id: Option<&str>,
    ) -> Result<InventoryItem> {
        let request = pb::GetItemByProductRequest {
            product_id: product_id.to_string(),
            location_id: location_id.map(str::to_string),
        };
        let item: pb::InventoryItem = self
            .rpc
            .call(pb::methods::GET_ITEM_BY_PRODUCT, &request)
            .await?;
        Ok(item_from_proto(item))
    }

    pub async fn list_items(
        &self,
        location_id: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<InventoryItem>, i64)> {
        let request = pb::ListItemsRequest {
            location_id: location_id.map(str::to_string),
            page: Some(page_to_proto(page)),
        };
        let response: pb::ListItemsResponse =
            self.rpc.call(pb::methods::LIST_ITEMS, &request).await?;
        Ok((
            response.items.into_iter().map(item_from_proto).collect(),
            response.total,
        ))
    }

    pub async fn add_stock(
        &self,
        item_id: &str,
        quantity: i32,
        reason: &str,
        actor_id: &str,
    ) -> Result<InventoryItem> {
        let request = stock_change(item_id, quantity, reason, actor_id);
        let item: pb::InventoryItem = self.rpc.call(pb::methods::ADD_STOCK, &request).await?;
        Ok(item_from_proto(item))
    }

    pub async fn remove_stock(
        &self,
        item_id: &str,
        quantity: i32,
        reason: &str,
        actor_id: &str,
    ) -> Result<InventoryItem> {
        let request = stock_change(item_id, quantity, reason, actor_id);
        let item: pb::InventoryItem = self.rpc.call(pb::methods::REMOVE_STOCK, &request).await?;
        Ok(item_from_proto(item))
    }

    pub async fn adjust_stock(
        &self,
        item_id: &str,
        new_quantity: i32,
        reason: &str,
        actor_id: &str,
    ) -> Result<InventoryItem> {
        let request = pb::AdjustStockRequest {
            item_id: item_id.to_string(),
            new_quantity,
            reason: reason.to_string(),
            actor_id: actor_id.to_string(),
        };
        let item: pb::InventoryItem = self.rpc.call(pb::methods::ADJUST_STOCK, &request).await?;
        Ok(item_from_proto(item))
    }

    // ----------------------------------------------------------- reservations

    pub async fn reserve(
        &self,
        item_id: &str,
        order_id: &str,
        quantity: i32,
        ttl_seconds: i64,
    ) -> Result<Reservation> {
        let request = pb::ReserveRequest {
            item_id: item_id.to_string(),
            order_id: order_id.to_string(),
            quantity,
            ttl_seconds,
        };
        let reservation: pb::Reservation = self.rpc.call(pb::methods::RESERVE, &request).await?;
        Ok(reservation_from_proto(reservation))
    }

    pub async fn release(&self, reservation_id: &str, reason: &str) -> Result<Reservation> {
        let request = pb::ReleaseRequest {
            reservation_id: reservation_id.to_string(),
            reason: reason.to_string(),
        };
        let reservation: pb::Reservation = self.rpc.call(pb::methods::RELEASE, &request).await?;
        Ok(reservation_from_proto(reservation))
    }

    pub async fn fulfil(&self, reservation_id: &str) -> Result<Reservation> {
        let request = pb::FulfilRequest {
            reservation_id: reservation_id.to_string(),
        };
        let reservation: pb::Reservation = self.rpc.call(pb::methods::FULFIL, &request).await?;
        Ok(reservation_from_proto(reservation))
    }

    pub async fn list_order_reservations(&self, order_id: &str) -> Result<Vec<Reservation>> {
        let request = pb::ListOrderReservationsRequest {
            order_id: order_id.to_string(),
        };
        let response: pb::ListOrderReservationsResponse = self
            .rpc
            .call(pb::methods::LIST_ORDER_RESERVATIONS, &request)
            .await?;
        Ok(response
            .reservations
            .into_iter()
            .map(reservation_from_proto)
            .collect())
    }

    // ------------------------------------------------------------ availability

    pub async fn check_availability(
        &self,
        location_id: &str,
        items: &[AvailabilityQuery],
    ) -> Result<Vec<AvailabilityResult>> {
        let request = pb::CheckAvailabilityRequest {
            location_id: location_id.to_string(),
            items: items.iter().map(query_to_proto).collect(),
        };
        let response: pb::CheckAvailabilityResponse = self
            .rpc
            .call(pb::methods::CHECK_AVAILABILITY, &request)
            .await?;
        Ok(response
            .results
            .into_iter()
            .map(availability_from_proto)
            .collect())
    }

    pub async fn get_nearby_inventory(
        &self,
        origin_location_id: &str,
        items: &[AvailabilityQuery],
        radius_km: f64,
        max_locations: i32,
    ) -> Result<Vec<NearbyLocation>> {
        let request = pb::GetNearbyInventoryRequest {
            origin_location_id: origin_location_id.to_string(),
            items: items.iter().map(query_to_proto).collect(),
            radius_km,
            max_locations,
        };
        let response: pb::GetNearbyInventoryResponse = self
            .rpc
            .call(pb::methods::GET_NEARBY_INVENTORY, &request)
            .await?;
        Ok(response
            .locations
            .into_iter()
            .filter_map(|nearby| {
                let location = nearby.location?;
                Some(NearbyLocation {
                    location: location_from_proto(location),
                    distance_km: nearby.distance_km,
                    availability: nearby
                        .availability
                        .into_iter()
                        .map(availability_from_proto)
                        .collect(),
                })
            })
            .collect())
    }

    // ---------------------------------------------------------------- transfers

    pub async fn create_transfer(
        &self,
        product_id: &str,
        sku: &str,
        source_location_id: &str,
        dest_location_id: &str,
        quantity: i32,
        requested_by: &str,
    ) -> Result<Transfer> {
        let request = pb::CreateTransferRequest {
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            source_location_id: source_location_id.to_string(),
            dest_location_id: dest_location_id.to_string(),
            quantity,
            requested_by: requested_by.to_string(),
        };
        let transfer: pb::Transfer = self.rpc.call(pb::methods::CREATE_TRANSFER, &request).await?;
        Ok(transfer_from_proto(transfer))
    }

    pub async fn start_transfer(
        &self,
        transfer_id: &str,
        actor_id: &str,
        estimated_arrival: Option<&str>,
    ) -> Result<Transfer> {
        let request = pb::TransferActionRequest {
            transfer_id: transfer_id.to_string(),
            actor_id: actor_id.to_string(),
            estimated_arrival: estimated_arrival.map(str::to_string),
            reason: None,
        };
        let transfer: pb::Transfer = self.rpc.call(pb::methods::START_TRANSFER, &request).await?;
        Ok(transfer_from_proto(transfer))
    }

    pub async fn complete_transfer(&self, transfer_id: &str, actor_id: &str) -> Result<Transfer> {
        let request = pb::TransferActionRequest {
            transfer_id: transfer_id.to_string(),
            actor_id: actor_id.to_string(),
            estimated_arrival: None,
            reason: None,
        };
        let transfer: pb::Transfer = self
            .rpc
            .call(pb::methods::COMPLETE_TRANSFER, &request)
            .await?;
        Ok(transfer_from_proto(transfer))
    }

    pub async fn cancel_transfer(
        &self,
        transfer_id: &str,
        actor_id: &str,
        reason: &str,
    ) -> Result<Transfer> {
        let request = pb::TransferActionRequest {
            transfer_id: transfer_id.to_string(),
            actor_id: actor_id.to_string(),
            estimated_arrival: None,
            reason: Some(reason.to_string()),
        };
        let transfer: pb::Transfer = self.rpc.call(pb::methods::CANCEL_TRANSFER, &request).await?;
        Ok(transfer_from_proto(transfer))
    }

    pub async fn get_transfer(&self, id: &str) -> Result<Transfer> {
        let request = pb::GetTransferRequest { id: id.to_string() };
        let transfer: pb::Transfer = self.rpc.call(pb::methods::GET_TRANSFER, &request).await?;
        Ok(transfer_from_proto(transfer))
    }

    pub async fn list_transfers(
        &self,
        status: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<Transfer>, i64)> {
        let request = pb::ListTransfersRequest {
            status: status.map(transfer_status_to_proto),
            page: Some(page_to_proto(page)),
        };
        let response: pb::ListTransfersResponse =
            self.rpc.call(pb::methods::LIST_TRANSFERS, &request).await?;
        Ok((
            response
                .transfers
                .into_iter()
                .map(transfer_from_proto)
                .collect(),
            response.total,
        ))
    }

    // -------------------------------------------------------------------- pos

    pub async fn pos_adjustment(
        &self,
        location_id: &str,
        transaction_type: &str,
        staff_id: &str,
        items: Vec<(String, i32, bool)>,
    ) -> Result<PosAdjustmentOutcome> {
        let request = pb::PosAdjustmentRequest {
            location_id: location_id.to_string(),
            transaction_type: match transaction_type {
                "sale" => pb::PosTransactionType::Sale as i32,
                "return" => pb::PosTransactionType::Return as i32,
                "exchange" => pb::PosTransactionType::Exchange as i32,
                _ => pb::PosTransactionType::Unspecified as i32,
            },
            staff_id: staff_id.to_string(),
            items: items
                .into_iter()
                .map(|(product_id, quantity, incoming)| pb::PosAdjustmentItem {
                    product_id,
                    quantity,
                    incoming,
                })
                .collect(),
        };
        let response: pb::PosAdjustmentResponse =
            self.rpc.call(pb::methods::POS_ADJUSTMENT, &request).await?;
        Ok(PosAdjustmentOutcome {
            success: response.success,
            results: response
                .results
                .into_iter()
                .map(|r| PosItemResult {
                    product_id: r.product_id,
                    success: r.success,
                    error: r.error,
                })
                .collect(),
        })
    }

    // -------------------------------------------------------------- locations

    pub async fn create_location(
        &self,
        name: &str,
        location_type: &str,
        address: Option<&Address>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<StoreLocation> {
        let request = pb::CreateLocationRequest {
            name: name.to_string(),
            location_type: location_type.to_string(),
            address: address.map(address_to_proto),
            latitude,
            longitude,
        };
        let location: pb::StoreLocation =
            self.rpc.call(pb::methods::CREATE_LOCATION, &request).await?;
        Ok(location_from_proto(location))
    }

    pub async fn get_location(&self, id: &str) -> Result<StoreLocation> {
        let request = pb::GetLocationRequest { id: id.to_string() };
        let location: pb::StoreLocation =
            self.rpc.call(pb::methods::GET_LOCATION, &request).await?;
        Ok(location_from_proto(location))
    }

    pub async fn update_location(&self, update: pb::UpdateLocationRequest) -> Result<StoreLocation> {
        let location: pb::StoreLocation =
            self.rpc.call(pb::methods::UPDATE_LOCATION, &update).await?;
        Ok(location_from_proto(location))
    }

    pub async fn delete_location(&self, id: &str) -> Result<()> {
        let request = pb::DeleteLocationRequest { id: id.to_string() };
        let _: crate::proto::common::Empty =
            self.rpc.call(pb::methods::DELETE_LOCATION, &request).await?;
        Ok(())
    }

    pub async fn list_locations(
        &self,
        include_inactive: bool,
        page: &PageRequest,
    ) -> Result<(Vec<StoreLocation>, i64)> {
        let request = pb::ListLocationsRequest {
            include_inactive,
            page: Some(page_to_proto(page)),
        };
        let response: pb::ListLocationsResponse =
            self.rpc.call(pb::methods::LIST_LOCATIONS, &request).await?;
        Ok((
            response
                .locations
                .into_iter()
                .map(location_from_proto)
                .collect(),
            response.total,
        ))
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

fn page_to_proto(page: &PageRequest) -> Page {
    Page {
        page: page.page,
        page_size: page.page_size,
        sort_by: page.sort_by.clone(),
        sort_asc: matches!(page.sort_order, Some(SortOrder::Asc)),
    }
}

fn query_to_proto(query: &AvailabilityQuery) -> pb::AvailabilityQuery {
    pb::AvailabilityQuery {
        product_id: query.product_id.clone(),
        quantity: query.quantity,
    }
}

fn stock_change(item_id: &str, quantity: i32, reason: &str, actor_id: &str) -> pb::StockChangeRequest {
    pb::StockChangeRequest {
        item_id: item_id.to_string(),
        quantity,
        reason: reason.to_string(),
        actor_id: actor_id.to_string(),
    }
}

fn address_to_proto(address: &Address) -> crate::proto::common::Address {
    crate::proto::common::Address {
        street: address.street.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone(),
    }
}

fn address_from_proto(address: crate::proto::common::Address) -> Address {
    Address {
        street: address.street,
        city: address.city,
        state: address.state,
        postal_code: address.postal_code,
        country: address.country,
    }
}

fn item_from_proto(item: pb::InventoryItem) -> InventoryItem {
    InventoryItem {
        id: item.id,
        product_id: item.product_id,
        sku: item.sku,
        location_id: item.location_id,
        quantity: item.quantity,
        reserved: item.reserved,
        available: item.available,
        reorder_threshold: item.reorder_threshold,
        reorder_amount: item.reorder_amount,
        created_at: item.created_at,
        last_updated: item.last_updated,
    }
}

fn reservation_from_proto(reservation: pb::Reservation) -> Reservation {
    let status = match pb::ReservationStatus::try_from(reservation.status) {
        Ok(pb::ReservationStatus::Active) => "active",
        Ok(pb::ReservationStatus::Fulfilled) => "fulfilled",
        Ok(pb::ReservationStatus::Released) => "released",
        Ok(pb::ReservationStatus::Expired) => "expired",
        _ => "unspecified",
    };
    Reservation {
        id: reservation.id,
        inventory_item_id: reservation.inventory_item_id,
        order_id: reservation.order_id,
        quantity: reservation.quantity,
        status: status.to_string(),
        reserved_at: reservation.reserved_at,
        expires_at: reservation.expires_at,
    }
}

fn availability_from_proto(result: pb::AvailabilityResult) -> AvailabilityResult {
    let status = match pb::StockStatus::try_from(result.status) {
        Ok(pb::StockStatus::InStock) => "in_stock",
        Ok(pb::StockStatus::LowStock) => "low_stock",
        Ok(pb::StockStatus::OutOfStock) => "out_of_stock",
        Ok(pb::StockStatus::NotFound) => "not_found",
        _ => "unspecified",
    };
    AvailabilityResult {
        product_id: result.product_id,
        in_stock: result.in_stock,
        available_quantity: result.available_quantity,
        status: status.to_string(),
    }
}

fn location_from_proto(location: pb::StoreLocation) -> StoreLocation {
    StoreLocation {
        id: location.id,
        name: location.name,
        location_type: location.location_type,
        address: location.address.map(address_from_proto),
        latitude: location.latitude,
        longitude: location.longitude,
        is_active: location.is_active,
        created_at: location.created_at,
        updated_at: location.updated_at,
    }
}

fn transfer_status_to_proto(status: &str) -> i32 {
    match status {
        "requested" => pb::TransferStatus::Requested as i32,
        "in_transit" => pb::TransferStatus::InTransit as i32,
        "completed" => pb::TransferStatus::Completed as i32,
        "cancelled" => pb::TransferStatus::Cancelled as i32,
        _ => pb::TransferStatus::Unspecified as i32,
    }
}

fn transfer_from_proto(transfer: pb::Transfer) -> Transfer {
    let status = match pb::TransferStatus::try_from(transfer.status) {
        Ok(pb::TransferStatus::Requested) => "requested",
        Ok(pb::TransferStatus::InTransit) => "in_transit",
        Ok(pb::TransferStatus::Completed) => "completed",
        Ok(pb::TransferStatus::Cancelled) => "cancelled",
        _ => "unspecified",
    };
    Transfer {
        id: transfer.id,
        product_id: transfer.product_id,
        sku: transfer.sku,
        source_location_id: transfer.source_location_id,
        dest_location_id: transfer.dest_location_id,
        quantity: transfer.quantity,
        status: status.to_string(),
        requested_by: transfer.requested_by,
        approved_by: transfer.approved_by,
        estimated_arrival: transfer.estimated_arrival,
        requested_at: transfer.requested_at,
        updated_at: transfer.updated_at,
    }
}
