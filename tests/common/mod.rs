// SPDX-License-Identifier: MIT

//! Shared helpers for integration tests: a memory-backed application
//! state and seed data builders.

use liftlog::config::Config;
use liftlog::db::DocumentStore;
use liftlog::services::exercise::ExerciseCreate;
use liftlog::services::refs::ChildRef;
use liftlog::services::workout::{WorkoutCreate, WorkoutExerciseCreate, WorkoutResponse};
use liftlog::AppState;
use std::sync::Arc;

#[allow(dead_code)]
pub const USER: &str = "user-1";

/// Create application state backed by the in-memory store.
pub fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(Config::default(), DocumentStore::memory()))
}

/// Full router over a memory-backed state, for request-level tests.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state();
    (liftlog::routes::create_router(state.clone()), state)
}

/// Seed one catalog exercise and return its id.
#[allow(dead_code)]
pub async fn seed_exercise(state: &AppState, name: &str) -> String {
    state
        .exercises
        .create(ExerciseCreate {
            name: name.to_string(),
            description: None,
            muscle_groups: vec!["chest".to_string()],
            equipment: Some("barbell".to_string()),
            instructions: vec![],
            difficulty: Default::default(),
        })
        .await
        .expect("seed exercise")
        .id
}

/// Inline child payload for a workout create/update.
#[allow(dead_code)]
pub fn planned(exercise_id: &str, order: u32) -> ChildRef<WorkoutExerciseCreate> {
    ChildRef::New(WorkoutExerciseCreate {
        exercise_id: exercise_id.to_string(),
        sets: 3,
        reps: 10,
        weight: Some(50.0),
        rest_time: Some(90),
        notes: None,
        order,
    })
}

/// Seed a workout with inline children for the given exercise ids.
#[allow(dead_code)]
pub async fn seed_workout(
    state: &AppState,
    user_id: &str,
    name: &str,
    exercise_ids: &[&str],
) -> WorkoutResponse {
    let exercises = exercise_ids
        .iter()
        .enumerate()
        .map(|(i, eid)| planned(eid, (i + 1) as u32))
        .collect();

    state
        .workouts
        .create(
            user_id,
            WorkoutCreate {
                name: name.to_string(),
                description: None,
                exercises,
                estimated_duration: Some(45),
                difficulty: Default::default(),
                tags: vec!["strength".to_string()],
            },
        )
        .await
        .expect("seed workout")
}
