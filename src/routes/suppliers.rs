//! Supplier management routes, proxied to the supplier service.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

use meridian_shared::clients::suppliers::{Supplier, SupplierDraft};

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
}

async fn list_suppliers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<Supplier>> {
    claims.require(Role::Admin)?;
    let page = query.page_request();
    let (suppliers, total) = state.suppliers.list_suppliers(&page).await?;
    ok_with_total(suppliers, total)
}

async fn get_supplier(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<Supplier> {
    claims.require(Role::Admin)?;
    ok(state.suppliers.get_supplier(&id).await?)
}

async fn create_supplier(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<SupplierDraft>,
) -> GatewayResult<Supplier> {
    claims.require(Role::Admin)?;
    ok(state.suppliers.create_supplier(draft).await?)
}

async fn update_supplier(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(draft): Json<SupplierDraft>,
) -> GatewayResult<Supplier> {
    claims.require(Role::Admin)?;
    ok(state.suppliers.update_supplier(&id, draft).await?)
}

async fn delete_supplier(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<()> {
    claims.require(Role::Admin)?;
    state.suppliers.delete_supplier(&id).await?;
    ok(())
}
