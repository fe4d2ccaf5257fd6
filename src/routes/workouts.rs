// SPDX-License-Identifier: MIT

//! Workout template routes.

use crate::error::Result;
use crate::routes::{validate_payload, OwnerId};
use crate::services::refs;
use crate::services::workout::{WorkoutCreate, WorkoutPatch, WorkoutResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/workouts", get(list_workouts).post(create_workout))
        .route(
            "/api/v1/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
    Json(payload): Json<WorkoutCreate>,
) -> Result<(StatusCode, Json<WorkoutResponse>)> {
    validate_payload(&payload)?;
    refs::validate_children(&payload.exercises)?;
    let workout = state.workouts.create(&user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
) -> Result<Json<Vec<WorkoutResponse>>> {
    Ok(Json(state.workouts.list(&user_id).await?))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutResponse>> {
    Ok(Json(state.workouts.get(&id).await?))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<WorkoutPatch>,
) -> Result<Json<WorkoutResponse>> {
    validate_payload(&payload)?;
    if let Some(exercises) = &payload.exercises {
        refs::validate_children(exercises)?;
    }
    Ok(Json(state.workouts.update(&id, payload).await?))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.workouts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
