// SPDX-License-Identifier: MIT

//! liftlog: fitness training backend.
//!
//! Tracks an exercise catalog, workout templates, multi-day training
//! splits, and completed workout sessions with recorded performance,
//! stored as referenced documents in a document store.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::DocumentStore;
use services::{ExerciseService, SessionService, SplitService, WorkoutService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    pub exercises: ExerciseService,
    pub workouts: WorkoutService,
    pub splits: SplitService,
    pub sessions: SessionService,
}

impl AppState {
    pub fn new(config: Config, store: DocumentStore) -> Self {
        Self {
            config,
            exercises: ExerciseService::new(store.clone()),
            workouts: WorkoutService::new(store.clone()),
            splits: SplitService::new(store.clone()),
            sessions: SessionService::new(store.clone()),
            store,
        }
    }
}
