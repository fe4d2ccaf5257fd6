// SPDX-License-Identifier: MIT

//! Workout session routes.

use crate::error::Result;
use crate::models::SessionExercise;
use crate::routes::{validate_payload, OwnerId};
use crate::services::refs;
use crate::services::session::{
    SessionCreate, SessionExercisePatch, SessionPatch, SessionResponse,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/sessions", get(list_sessions).post(start_session))
        .route(
            "/api/v1/sessions/{id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route(
            "/api/v1/sessions/{id}/exercises/{exercise_id}",
            put(record_exercise),
        )
        .route("/api/v1/sessions/{id}/complete", post(complete_session))
        .route("/api/v1/sessions/{id}/abandon", post(abandon_session))
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
    Json(payload): Json<SessionCreate>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    validate_payload(&payload)?;
    refs::validate_children(&payload.exercises)?;
    let session = state.sessions.start(&user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn list_sessions(
    State(state): State<Arc<AppState>>,
    OwnerId(user_id): OwnerId,
) -> Result<Json<Vec<SessionResponse>>> {
    Ok(Json(state.sessions.list(&user_id).await?))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.sessions.get(&id).await?))
}

async fn update_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<SessionPatch>,
) -> Result<Json<SessionResponse>> {
    validate_payload(&payload)?;
    Ok(Json(state.sessions.update(&id, payload).await?))
}

async fn record_exercise(
    State(state): State<Arc<AppState>>,
    Path((id, exercise_id)): Path<(String, String)>,
    Json(payload): Json<SessionExercisePatch>,
) -> Result<Json<SessionExercise>> {
    validate_payload(&payload)?;
    Ok(Json(
        state
            .sessions
            .record_exercise(&id, &exercise_id, payload)
            .await?,
    ))
}

async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.sessions.complete(&id).await?))
}

async fn abandon_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>> {
    Ok(Json(state.sessions.abandon(&id).await?))
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.sessions.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
