//! Store location routes, proxied to the inventory service (which owns the
//! location data for nearby lookups).

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use meridian_shared::clients::inventory::StoreLocation;
use meridian_shared::proto::inventory::UpdateLocationRequest;
use meridian_shared::types::Address;

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stores", get(list_stores).post(create_store))
        .route(
            "/stores/:id",
            get(get_store).put(update_store).delete(delete_store),
        )
}

async fn list_stores(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<StoreLocation>> {
    let page = query.page_request();
    let (stores, total) = state
        .inventory
        .list_locations(query.include_inactive.unwrap_or(false), &page)
        .await?;
    ok_with_total(stores, total)
}

async fn get_store(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> GatewayResult<StoreLocation> {
    ok(state.inventory.get_location(&id).await?)
}

#[derive(Debug, Deserialize)]
struct StoreBody {
    name: String,
    #[serde(default = "default_store_type")]
    location_type: String,
    address: Option<Address>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

fn default_store_type() -> String {
    "store".to_string()
}

async fn create_store(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<StoreBody>,
) -> GatewayResult<StoreLocation> {
    claims.require(Role::Admin)?;
    let store = state
        .inventory
        .create_location(
            &body.name,
            &body.location_type,
            body.address.as_ref(),
            body.latitude,
            body.longitude,
        )
        .await?;
    ok(store)
}

#[derive(Debug, Deserialize)]
struct UpdateStoreBody {
    name: Option<String>,
    location_type: Option<String>,
    address: Option<Address>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    is_active: Option<bool>,
}

async fn update_store(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStoreBody>,
) -> GatewayResult<StoreLocation> {
    claims.require(Role::Admin)?;
    let update = UpdateLocationRequest {
        id,
        name: body.name,
        location_type: body.location_type,
        address: body.address.map(|address| {
            meridian_shared::proto::common::Address {
                street: address.street,
                city: address.city,
                state: address.state,
                postal_code: address.postal_code,
                country: address.country,
            }
        }),
        latitude: body.latitude,
        longitude: body.longitude,
        is_active: body.is_active,
    };
    ok(state.inventory.update_location(update).await?)
}

async fn delete_store(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<()> {
    claims.require(Role::Admin)?;
    state.inventory.delete_location(&id).await?;
    ok(())
}
