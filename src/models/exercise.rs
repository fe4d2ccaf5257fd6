// SPDX-License-Identifier: MIT

//! Exercise catalog entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, Document};

/// Difficulty rating shared by exercises and workouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// Immutable catalog entry. Referenced, never embedded, by workout and
/// session exercises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// e.g. ["chest", "shoulders", "triceps"]
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    /// e.g. "barbell", "dumbbell", "bodyweight"
    pub equipment: Option<String>,
    /// Step by step instructions
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

impl Document for Exercise {
    const COLLECTION: &'static str = collections::EXERCISES;

    fn id(&self) -> &str {
        &self.id
    }
}
