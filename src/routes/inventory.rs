//! Inventory routes: stock records, reservations, availability, transfers
//! and POS adjustments, proxied to the inventory service.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use meridian_shared::clients::inventory::{
    AvailabilityQuery, InventoryItem, NearbyLocation, PosAdjustmentOutcome, Reservation, Transfer,
};

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/inventory", get(list_items).post(create_item))
        .route("/inventory/reserve", post(reserve))
        .route("/inventory/release", post(release))
        .route("/inventory/nearby", post(nearby))
        .route("/inventory/availability", post(check_availability))
        .route("/inventory/pos", post(pos_adjustment))
        .route(
            "/inventory/transfers",
            get(list_transfers).post(create_transfer),
        )
        .route("/inventory/transfers/:id", get(get_transfer))
        .route("/inventory/transfers/:id/start", post(start_transfer))
        .route("/inventory/transfers/:id/complete", post(complete_transfer))
        .route("/inventory/transfers/:id/cancel", post(cancel_transfer))
        .route("/inventory/:id", get(get_item).put(adjust_stock))
        .route("/inventory/:id/stock/add", post(add_stock))
        .route("/inventory/:id/stock/remove", post(remove_stock))
}

// ============================================================================
// ITEMS
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateItemBody {
    product_id: String,
    sku: String,
    location_id: String,
    quantity: i32,
    #[serde(default)]
    reorder_threshold: i32,
    #[serde(default)]
    reorder_amount: i32,
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<InventoryItem>> {
    claims.require(Role::Staff)?;
    let page = query.page_request();
    let (items, total) = state
        .inventory
        .list_items(query.location_id.as_deref(), &page)
        .await?;
    ok_with_total(items, total)
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateItemBody>,
) -> GatewayResult<InventoryItem> {
    claims.require(Role::Staff)?;
    let item = state
        .inventory
        .create_item(
            &body.product_id,
            &body.sku,
            &body.location_id,
            body.quantity,
            body.reorder_threshold,
            body.reorder_amount,
        )
        .await?;
    ok(item)
}

async fn get_item(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<InventoryItem> {
    claims.require(Role::Staff)?;
    ok(state.inventory.get_item(&id).await?)
}

#[derive(Debug, Deserialize)]
struct StockChangeBody {
    quantity: i32,
    reason: String,
}

async fn add_stock(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<StockChangeBody>,
) -> GatewayResult<InventoryItem> {
    claims.require(Role::Staff)?;
    let item = state
        .inventory
        .add_stock(&id, body.quantity, &body.reason, &claims.sub)
        .await?;
    ok(item)
}

async fn remove_stock(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<StockChangeBody>,
) -> GatewayResult<InventoryItem> {
    claims.require(Role::Staff)?;
    let item = state
        .inventory
        .remove_stock(&id, body.quantity, &body.reason, &claims.sub)
        .await?;
    ok(item)
}

#[derive(Debug, Deserialize)]
struct AdjustBody {
    new_quantity: i32,
    reason: String,
}

async fn adjust_stock(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<AdjustBody>,
) -> GatewayResult<InventoryItem> {
    claims.require(Role::Staff)?;
    let item = state
        .inventory
        .adjust_stock(&id, body.new_quantity, &body.reason, &claims.sub)
        .await?;
    ok(item)
}

// ============================================================================
// RESERVATIONS
// ============================================================================

#[derive(Debug, Deserialize)]
struct ReserveBody {
    item_id: String,
    order_id: String,
    quantity: i32,
    #[serde(default)]
    ttl_seconds: i64,
}

async fn reserve(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<ReserveBody>,
) -> GatewayResult<Reservation> {
    claims.require(Role::Staff)?;
    let reservation = state
        .inventory
        .reserve(&body.item_id, &body.order_id, body.quantity, body.ttl_seconds)
        .await?;
    ok(reservation)
}

#[derive(Debug, Deserialize)]
struct ReleaseBody {
    reservation_id: String,
    #[serde(default)]
    reason: String,
}

async fn release(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<ReleaseBody>,
) -> GatewayResult<Reservation> {
    claims.require(Role::Staff)?;
    let reservation = state
        .inventory
        .release(&body.reservation_id, &body.reason)
        .await?;
    ok(reservation)
}

// ============================================================================
// AVAILABILITY & NEARBY
// ============================================================================

#[derive(Debug, Deserialize)]
struct AvailabilityBody {
    location_id: String,
    items: Vec<AvailabilityQuery>,
}

async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AvailabilityBody>,
) -> GatewayResult<Vec<meridian_shared::clients::inventory::AvailabilityResult>> {
    let results = state
        .inventory
        .check_availability(&body.location_id, &body.items)
        .await?;
    ok(results)
}

#[derive(Debug, Deserialize)]
struct NearbyBody {
    origin_location_id: String,
    items: Vec<AvailabilityQuery>,
    radius_km: f64,
    #[serde(default)]
    max_locations: i32,
}

async fn nearby(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NearbyBody>,
) -> GatewayResult<Vec<NearbyLocation>> {
    let locations = state
        .inventory
        .get_nearby_inventory(
            &body.origin_location_id,
            &body.items,
            body.radius_km,
            body.max_locations,
        )
        .await?;
    ok(locations)
}

// ============================================================================
// TRANSFERS
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateTransferBody {
    product_id: String,
    sku: String,
    source_location_id: String,
    dest_location_id: String,
    quantity: i32,
}

async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateTransferBody>,
) -> GatewayResult<Transfer> {
    claims.require(Role::Staff)?;
    let transfer = state
        .inventory
        .create_transfer(
            &body.product_id,
            &body.sku,
            &body.source_location_id,
            &body.dest_location_id,
            body.quantity,
            &claims.sub,
        )
        .await?;
    ok(transfer)
}

async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<Transfer> {
    claims.require(Role::Staff)?;
    ok(state.inventory.get_transfer(&id).await?)
}

async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<Transfer>> {
    claims.require(Role::Staff)?;
    let page = query.page_request();
    let (transfers, total) = state
        .inventory
        .list_transfers(query.status.as_deref(), &page)
        .await?;
    ok_with_total(transfers, total)
}

#[derive(Debug, Deserialize, Default)]
struct StartTransferBody {
    estimated_arrival: Option<String>,
}

async fn start_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Option<Json<StartTransferBody>>,
) -> GatewayResult<Transfer> {
    claims.require(Role::Staff)?;
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let transfer = state
        .inventory
        .start_transfer(&id, &claims.sub, body.estimated_arrival.as_deref())
        .await?;
    ok(transfer)
}

async fn complete_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<Transfer> {
    claims.require(Role::Staff)?;
    ok(state.inventory.complete_transfer(&id, &claims.sub).await?)
}

#[derive(Debug, Deserialize, Default)]
struct CancelTransferBody {
    #[serde(default)]
    reason: String,
}

async fn cancel_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Option<Json<CancelTransferBody>>,
) -> GatewayResult<Transfer> {
    claims.require(Role::Staff)?;
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let transfer = state
        .inventory
        .cancel_transfer(&id, &claims.sub, &body.reason)
        .await?;
    ok(transfer)
}

// ============================================================================
// POS ADJUSTMENTS
// ============================================================================

#[derive(Debug, Deserialize)]
struct PosItemBody {
    product_id: String,
    quantity: i32,
    #[serde(default)]
    incoming: bool,
}

#[derive(Debug, Deserialize)]
struct PosBody {
    location_id: String,
    transaction_type: String,
    items: Vec<PosItemBody>,
}

async fn pos_adjustment(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<PosBody>,
) -> GatewayResult<PosAdjustmentOutcome> {
    claims.require(Role::Staff)?;
    let items = body
        .items
        .into_iter()
        .map(|item| (item.product_id, item.quantity, item.incoming))
        .collect();
    let outcome = state
        .inventory
        .pos_adjustment(&body.location_id, &body.transaction_type, &claims.sub, items)
        .await?;
    ok(outcome)
}
