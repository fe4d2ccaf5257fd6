// SPDX-License-Identifier: MIT

//! Workout template and its planned exercises.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, Document};
use crate::models::Difficulty;

/// Planned exercise within a workout (sets/reps configuration).
///
/// Owned exclusively by one Workout; `workout_id` is the owner
/// back-reference, set when the parent adopts the child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: String,
    pub exercise_id: String,
    /// Owning workout (None only for a child not yet adopted).
    pub workout_id: Option<String>,
    pub sets: u32,
    pub reps: u32,
    /// in kg
    pub weight: Option<f64>,
    /// in seconds
    pub rest_time: Option<u32>,
    pub notes: Option<String>,
    /// Position in the workout, contiguous 1..n within the owner.
    pub order: u32,
    /// Set when a force-deleted exercise left this reference dangling.
    #[serde(default)]
    pub needs_repair: bool,
}

impl Document for WorkoutExercise {
    const COLLECTION: &'static str = collections::WORKOUT_EXERCISES;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A workout template containing multiple exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    /// References to WorkoutExercise documents, in exercise order.
    #[serde(default)]
    pub exercises: Vec<String>,
    /// in minutes
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// e.g. ["push", "upper_body", "strength"]
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document for Workout {
    const COLLECTION: &'static str = collections::WORKOUTS;

    fn id(&self) -> &str {
        &self.id
    }
}
