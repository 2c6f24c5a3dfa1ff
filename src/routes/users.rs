//! Administrative user management routes, proxied to the user service.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use meridian_shared::clients::users::User;

use super::{ok, ok_with_total, GatewayResult, ListQuery};
use crate::auth::{Claims, Role};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route(
            "/admin/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    email: String,
    password: String,
    name: String,
    #[serde(default = "default_role")]
    role: String,
}

fn default_role() -> String {
    "user".to_string()
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateUserBody>,
) -> GatewayResult<User> {
    claims.require(Role::Admin)?;
    let user = state
        .users
        .create_user(&body.email, &body.password, &body.name, &body.role)
        .await?;
    ok(user)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> GatewayResult<Vec<User>> {
    claims.require(Role::Admin)?;
    let page = query.page_request();
    let (users, total) = state.users.list_users(&page).await?;
    ok_with_total(users, total)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<User> {
    claims.require(Role::Admin)?;
    ok(state.users.get_user(&id).await?)
}

#[derive(Debug, Deserialize)]
struct UpdateUserBody {
    name: Option<String>,
    role: Option<String>,
    is_active: Option<bool>,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> GatewayResult<User> {
    claims.require(Role::Admin)?;
    let user = state
        .users
        .update_user(&id, body.name.as_deref(), body.role.as_deref(), body.is_active)
        .await?;
    ok(user)
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> GatewayResult<()> {
    claims.require(Role::Admin)?;
    state.users.delete_user(&id).await?;
    ok(())
}
