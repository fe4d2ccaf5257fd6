// SPDX-License-Identifier: MIT

//! Exercise catalog routes.

use crate::error::Result;
use crate::models::Exercise;
use crate::routes::validate_payload;
use crate::services::exercise::{ExerciseCreate, ExercisePatch, ExerciseQuery};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/exercises",
            get(list_exercises).post(create_exercise),
        )
        .route(
            "/api/v1/exercises/{id}",
            get(get_exercise)
                .put(update_exercise)
                .delete(delete_exercise),
        )
}

async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExerciseCreate>,
) -> Result<(StatusCode, Json<Exercise>)> {
    validate_payload(&payload)?;
    let exercise = state.exercises.create(payload).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExerciseQuery>,
) -> Result<Json<Vec<Exercise>>> {
    Ok(Json(state.exercises.list(query).await?))
}

async fn get_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Exercise>> {
    Ok(Json(state.exercises.get(&id).await?))
}

async fn update_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ExercisePatch>,
) -> Result<Json<Exercise>> {
    validate_payload(&payload)?;
    Ok(Json(state.exercises.update(&id, payload).await?))
}

#[derive(Deserialize)]
struct DeleteQuery {
    /// Force delete even when the exercise is still referenced.
    #[serde(default)]
    force: bool,
}

async fn delete_exercise(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode> {
    state.exercises.delete(&id, query.force).await?;
    Ok(StatusCode::NO_CONTENT)
}
