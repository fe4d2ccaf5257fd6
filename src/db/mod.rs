// SPDX-License-Identifier: MIT

//! Database layer (document store).

pub mod store;

pub use store::{Document, DocumentStore, Filter, MemoryFaults};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EXERCISES: &str = "exercises";
    pub const WORKOUTS: &str = "workouts";
    pub const WORKOUT_EXERCISES: &str = "workout_exercises";
    pub const SPLITS: &str = "splits";
    pub const SPLIT_DAYS: &str = "split_days";
    pub const SESSIONS: &str = "sessions";
    pub const SESSION_EXERCISES: &str = "session_exercises";
}
