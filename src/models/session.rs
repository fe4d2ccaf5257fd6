// SPDX-License-Identifier: MIT

//! Workout sessions and recorded performance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, Document};
use crate::error::{AppError, Result};

/// One performed set: raw performance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPerformance {
    pub reps: u32,
    /// in kg; None for bodyweight work
    pub weight: Option<f64>,
    /// Perceived effort (RPE), 1-10
    pub rpe: Option<u8>,
}

/// Actual performance of an exercise during a workout session.
///
/// Owned exclusively by one WorkoutSession.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExercise {
    pub id: String,
    pub exercise_id: String,
    /// Reference to the planned WorkoutExercise.
    pub workout_exercise_id: String,
    /// Owning session (None only for a child not yet adopted).
    pub session_id: Option<String>,
    pub sets_completed: u32,
    #[serde(default)]
    pub actual_sets: Vec<SetPerformance>,
    pub notes: Option<String>,
    #[serde(default)]
    pub skipped: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set when a force-deleted exercise left this reference dangling.
    #[serde(default)]
    pub needs_repair: bool,
}

impl Document for SessionExercise {
    const COLLECTION: &'static str = collections::SESSION_EXERCISES;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Session lifecycle state.
///
/// `in_progress` is the only state that permits mutation; both other
/// states are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Abandoned)
    }

    /// Validate a state-machine edge. The only legal transitions are
    /// `in_progress -> completed` and `in_progress -> abandoned`.
    pub fn check_transition(self, to: SessionStatus) -> Result<()> {
        match (self, to) {
            (SessionStatus::InProgress, SessionStatus::Completed)
            | (SessionStatus::InProgress, SessionStatus::Abandoned) => Ok(()),
            (from, to) => Err(AppError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// A workout session with derived metrics.
///
/// The derived fields (`duration`, `total_*`, `completion_percentage`) are
/// computed once at the transition into `completed` and stored, so
/// historical sessions stay stable even if the formula changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub workout_id: String,
    pub user_id: String,
    /// If part of a split
    pub split_id: Option<String>,
    pub session_name: Option<String>,
    /// References to SessionExercise documents, in workout order.
    #[serde(default)]
    pub exercises: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// in whole minutes, floored
    pub duration: Option<i64>,
    /// Total weight lifted (kg)
    pub total_volume: Option<f64>,
    pub total_reps: Option<u32>,
    pub total_sets: Option<u32>,
    #[serde(default)]
    pub status: SessionStatus,
    pub completion_percentage: Option<f64>,
    pub notes: Option<String>,
    /// 1-10
    pub difficulty_rating: Option<u8>,
    /// 1-10
    pub energy_level: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl Document for WorkoutSession {
    const COLLECTION: &'static str = collections::SESSIONS;

    fn id(&self) -> &str {
        &self.id
    }
}
