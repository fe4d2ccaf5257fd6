// SPDX-License-Identifier: MIT

//! User account routes (thin). Credential handling lives in the external
//! auth layer; these routes only manage the stored profile document.

use crate::error::Result;
use crate::models::{User, UserProfile};
use crate::routes::validate_payload;
use crate::services::refs;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/{id}", get(get_user))
}

#[derive(Debug, Deserialize, Validate)]
struct UserCreate {
    #[validate(email)]
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    profile: Option<UserProfile>,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<User>)> {
    validate_payload(&payload)?;
    let user = User {
        id: state.store.allocate_id(),
        email: payload.email,
        hashed_password: None,
        first_name: payload.first_name,
        last_name: payload.last_name,
        profile: payload.profile,
        is_active: true,
        created_at: chrono::Utc::now(),
        updated_at: None,
    };
    state.store.put(&user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    Ok(Json(refs::require_target::<User>(&state.store, &id).await?))
}
