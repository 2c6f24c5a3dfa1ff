//! Product catalog routes, proxied to the product service.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use std::sync::Arc;

use meridian_shared::clients::products::{Category, Product, ProductDraft};

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/categories", get(list_categories))
        .route("/products/categories/hierarchy", get(category_hierarchy))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<Product>> {
    let page = query.page_request();
    let (products, total) = state
        .products
        .list_products(query.query.as_deref().unwrap_or(""), &page)
        .await?;
    ok_with_total(products, total)
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> GatewayResult<Product> {
    ok(state.products.get_product(&id).await?)
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<ProductDraft>,
) -> GatewayResult<Product> {
    claims.require(Role::Admin)?;
    ok(state.products.create_product(draft).await?)
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> GatewayResult<Product> {
    claims.require(Role::Admin)?;
    ok(state.products.update_product(&id, draft).await?)
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<()> {
    claims.require(Role::Admin)?;
    state.products.delete_product(&id).await?;
    ok(())
}

async fn list_categories(State(state): State<Arc<AppState>>) -> GatewayResult<Vec<Category>> {
    ok(state.products.list_categories(false).await?)
}

async fn category_hierarchy(State(state): State<Arc<AppState>>) -> GatewayResult<Vec<Category>> {
    ok(state.products.list_categories(true).await?)
}
