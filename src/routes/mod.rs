// ============================================================================
// MERIDIAN - GATEWAY ROUTES
// ============================================================================
// Module: src/routes/mod.rs
// Description: Route table assembly and the REST error envelope
// ============================================================================

pub mod auth;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod stores;
pub mod suppliers;
pub mod users;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use std::sync::Arc;

use meridian_shared::types::ApiResponse;
use meridian_shared::Error;

use crate::state::AppState;

/// REST-facing error wrapper. Maps the domain taxonomy onto HTTP statuses
/// and the `{success:false, error}` envelope; internal detail never leaves
/// the process.
#[derive(Debug)]
pub struct GatewayError(pub Error);

pub type GatewayResult<T> = std::result::Result<Json<ApiResponse<T>>, GatewayError>;

impl From<Error> for GatewayError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {}", self.0);
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

pub fn ok<T: serde::Serialize>(data: T) -> GatewayResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub fn ok_with_total<T: serde::Serialize>(data: T, total: i64) -> GatewayResult<T> {
    Ok(Json(ApiResponse::success_with_total(data, total)))
}

/// The full `/api/v1` surface. Login, register and the health probe are the
/// only anonymous routes; everything else sits behind the bearer-token
/// middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/auth/login", axum::routing::post(auth::login))
        .route("/auth/register", axum::routing::post(auth::register));

    let protected = Router::new()
        .merge(products::router())
        .merge(inventory::router())
        .merge(orders::router())
        .merge(stores::router())
        .merge(suppliers::router())
        .merge(users::router())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            crate::auth::auth_middleware,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .with_state(state)
}

/// Common list-endpoint query parameters.
#[derive(Debug, serde::Deserialize)]
pub struct ListQuery {
    pub page: Option<i32>,
    pub page_size: Option<i32>,
    pub status: Option<String>,
    pub query: Option<String>,
    pub location_id: Option<String>,
    pub include_inactive: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> meridian_shared::types::PageRequest {
        use meridian_shared::types::{PageRequest, SortOrder, DEFAULT_PAGE_SIZE};

        let mut page = PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        page.sort_by = self.sort_by.clone();
        page.sort_order = self.sort_order.as_deref().map(|order| {
            if order.eq_ignore_ascii_case("asc") {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            }
        });
        page
    }
}
