// SPDX-License-Identifier: MIT

//! Session metric aggregation.
//!
//! Pure functions over a session's recorded performance at the moment of
//! completion. Results are persisted on the session document and never
//! recomputed lazily, so historical sessions stay stable even if these
//! formulas change.

use chrono::{DateTime, Utc};

use crate::models::SessionExercise;

/// Aggregates derived from a session's SessionExercise list.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetrics {
    /// Sum of `sets_completed` across non-skipped entries.
    pub total_sets: u32,
    /// Sum of reps across all recorded sets in non-skipped entries.
    pub total_reps: u32,
    /// Sum of reps * weight (kg) across recorded sets; 0 when weight absent.
    pub total_volume: f64,
    /// Share of entries actually worked (non-skipped, at least one set),
    /// in percent, rounded to one decimal. 0.0 for an empty session.
    pub completion_percentage: f64,
}

/// Compute session aggregates from raw per-set performance records.
pub fn compute(entries: &[SessionExercise]) -> SessionMetrics {
    let mut total_sets = 0u32;
    let mut total_reps = 0u32;
    let mut total_volume = 0f64;

    for entry in entries.iter().filter(|e| !e.skipped) {
        total_sets += entry.sets_completed;
        for set in &entry.actual_sets {
            total_reps += set.reps;
            total_volume += f64::from(set.reps) * set.weight.unwrap_or(0.0);
        }
    }

    let completion_percentage = if entries.is_empty() {
        0.0
    } else {
        let worked = entries
            .iter()
            .filter(|e| !e.skipped && e.sets_completed > 0)
            .count();
        round_one_decimal(worked as f64 / entries.len() as f64 * 100.0)
    };

    SessionMetrics {
        total_sets,
        total_reps,
        total_volume,
        completion_percentage,
    }
}

/// Session duration in whole minutes, floored.
pub fn duration_minutes(started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> i64 {
    (completed_at - started_at).num_minutes()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
