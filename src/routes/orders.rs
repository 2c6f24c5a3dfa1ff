//! Order routes, proxied to the order service. Customers act on their own
//! orders; staff and admin act on anyone's.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use meridian_shared::clients::orders::{NewOrder, NewOrderItem, Order};
use meridian_shared::types::Address;
use meridian_shared::{Error, Result};

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/me", get(my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", put(update_status))
        .route("/orders/:id/payment", post(add_payment))
        .route("/orders/:id/tracking", post(add_tracking))
        .route("/orders/:id/notes", post(add_note))
        .route("/orders/:id/cancel", post(cancel_order))
        .route("/orders/:id/fulfil", post(fulfil_order))
}

#[derive(Debug, Deserialize)]
struct CreateOrderBody {
    /// Staff may order on behalf of another user; customers always order
    /// for themselves.
    user_id: Option<String>,
    items: Vec<NewOrderItem>,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
    source: Option<String>,
    location_id: Option<String>,
    staff_id: Option<String>,
    notes: Option<String>,
}

fn effective_user(claims: &Claims, requested: Option<String>) -> Result<String> {
    match requested {
        Some(user_id) if user_id != claims.sub => {
            claims.require(Role::Staff).map_err(|_| Error::Forbidden)?;
            Ok(user_id)
        }
        Some(user_id) => Ok(user_id),
        None => Ok(claims.sub.clone()),
    }
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateOrderBody>,
) -> GatewayResult<Order> {
    let user_id = effective_user(&claims, body.user_id)?;
    let new_order = NewOrder {
        user_id,
        items: body.items,
        shipping_address: body.shipping_address,
        billing_address: body.billing_address,
        source: body.source.unwrap_or_else(|| "online".to_string()),
        location_id: body.location_id,
        staff_id: body.staff_id,
        notes: body.notes,
    };
    ok(state.orders.create_order(new_order).await?)
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<Order>> {
    let page = query.page_request();
    let (orders, total) = state.orders.list_user_orders(&claims.sub, &page).await?;
    ok_with_total(orders, total)
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<Order>> {
    claims.require(Role::Admin)?;
    let page = query.page_request();
    let (orders, total) = state
        .orders
        .list_orders(query.status.as_deref(), &page)
        .await?;
    ok_with_total(orders, total)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<Order> {
    let order = state.orders.get_order(&id).await?;
    claims.require_self_or_staff(&order.user_id)?;
    ok(order)
}

#[derive(Debug, Deserialize)]
struct UpdateStatusBody {
    status: String,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusBody>,
) -> GatewayResult<Order> {
    claims.require(Role::Staff)?;
    ok(state
        .orders
        .update_status(&id, &body.status, &claims.sub)
        .await?)
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    method: String,
    transaction_id: String,
    amount: String,
}

async fn add_payment(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<PaymentBody>,
) -> GatewayResult<Order> {
    let order = state.orders.get_order(&id).await?;
    claims.require_self_or_staff(&order.user_id)?;
    ok(state
        .orders
        .add_payment(&id, &body.method, &body.transaction_id, &body.amount, &claims.sub)
        .await?)
}

#[derive(Debug, Deserialize)]
struct TrackingBody {
    tracking_code: String,
}

async fn add_tracking(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<TrackingBody>,
) -> GatewayResult<Order> {
    claims.require(Role::Staff)?;
    ok(state
        .orders
        .add_tracking(&id, &body.tracking_code, &claims.sub)
        .await?)
}

#[derive(Debug, Deserialize)]
struct NoteBody {
    note: String,
}

async fn add_note(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<NoteBody>,
) -> GatewayResult<Order> {
    claims.require(Role::Staff)?;
    ok(state.orders.add_note(&id, &body.note, &claims.sub).await?)
}

#[derive(Debug, Deserialize, Default)]
struct CancelBody {
    #[serde(default)]
    reason: String,
}

async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    body: Option<Json<CancelBody>>,
) -> GatewayResult<Order> {
    let order = state.orders.get_order(&id).await?;
    claims.require_self_or_staff(&order.user_id)?;
    let body = body.map(|Json(body)| body).unwrap_or_default();
    ok(state
        .orders
        .cancel_order(&id, &body.reason, &claims.sub)
        .await?)
}

async fn fulfil_order(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<Order> {
    claims.require(Role::Staff)?;
    ok(state.orders.fulfil_order(&id, &claims.sub).await?)
}
