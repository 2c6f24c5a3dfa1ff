//! Anonymous health probe. Reports the gateway itself plus a best-effort
//! view of each downstream service's fabric health method.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use meridian_shared::types::ApiResponse;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub services: ServiceHealth,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub inventory: bool,
    pub orders: bool,
    pub products: bool,
    pub suppliers: bool,
    pub users: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthReport>> {
    let (inventory, orders, products, suppliers, users) = tokio::join!(
        state.inventory.health_check(),
        state.orders.health_check(),
        state.products.health_check(),
        state.suppliers.health_check(),
        state.users.health_check(),
    );

    let report = HealthReport {
        status: "ok",
        services: ServiceHealth {
            inventory: inventory.unwrap_or(false),
            orders: orders.unwrap_or(false),
            products: products.unwrap_or(false),
            suppliers: suppliers.unwrap_or(false),
            users: users.unwrap_or(false),
        },
    };
    Json(ApiResponse::success(report))
}
