// SPDX-License-Identifier: MIT

//! Multi-day training splits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{collections, Document};

/// A day within a workout split.
///
/// `workout_id` is the workout performed that day; `split_id` is the owner
/// back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitDay {
    pub id: String,
    /// e.g. "Push Day", "Pull Day", "Legs"
    pub day_name: String,
    pub workout_id: String,
    /// Owning split (None only for a child not yet adopted).
    pub split_id: Option<String>,
    /// 1-7 for weekly splits, unique within the owner.
    pub day_number: u8,
    #[serde(default)]
    pub rest_day: bool,
}

impl Document for SplitDay {
    const COLLECTION: &'static str = collections::SPLIT_DAYS;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A workout split containing multiple days.
///
/// At most one split is active per user; the service layer enforces this,
/// not the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSplit {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    /// References to SplitDay documents.
    #[serde(default)]
    pub days: Vec<String>,
    /// e.g. "push_pull_legs", "upper_lower", "full_body"
    pub split_type: String,
    /// How many weeks this split runs
    pub weeks_duration: Option<u32>,
    /// Whether this is the user's current split
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document for WorkoutSplit {
    const COLLECTION: &'static str = collections::SPLITS;

    fn id(&self) -> &str {
        &self.id
    }
}
