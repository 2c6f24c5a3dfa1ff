//! Anonymous authentication routes, proxied to the user service.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use meridian_shared::clients::users::{LoginOutcome, User};

use super::{ok, GatewayResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> GatewayResult<LoginOutcome> {
    let outcome = state.users.login(&body.email, &body.password).await?;
    ok(outcome)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> GatewayResult<User> {
    let user = state
        .users
        .register(&body.email, &body.password, &body.name)
        .await?;
    ok(user)
}
