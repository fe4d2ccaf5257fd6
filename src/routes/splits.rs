// SPDX-License-Identifier: MIT

//! Training split routes.

use crate::error::Result;
use crate::routes::{validate_payload, OwnerId};
use crate::services::refs;
use crate::services::split::{SplitCreate, SplitPatch, SplitResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/splits", get(list_splits).post(create_split))
        .route(
            "/api/v1/splits/{id}",
            get(get_split).put(update_split).delete(delete_split),
        )
        .route("/api/v1/splits/{id}/activate", post(activate_split))
}

async fn create_split(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
    Json(payload): Json<SplitCreate>,
) -> Result<(StatusCode, Json<SplitResponse>)> {
    validate_payload(&payload)?;
    refs::validate_children(&payload.days)?;
    let split = state.splits.create(&user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(split)))
}

async fn list_splits(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
) -> Result<Json<Vec<SplitResponse>>> {
    Ok(Json(state.splits.list(&user_id).await?))
}

async fn get_split(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SplitResponse>> {
    Ok(Json(state.splits.get(&id).await?))
}

async fn update_split(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<SplitPatch>,
) -> Result<Json<SplitResponse>> {
    validate_payload(&payload)?;
    Ok(Json(state.splits.update(&id, payload).await?))
}

async fn activate_split(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SplitResponse>> {
    Ok(Json(state.splits.activate(&id).await?))
}

async fn delete_split(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.splits.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
