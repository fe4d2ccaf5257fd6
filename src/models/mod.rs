// SPDX-License-Identifier: MIT

//! Data models for the application.
//!
//! Every cross-collection reference is an explicit typed identifier; there
//! are no embedded child documents. Children owned by exactly one parent
//! (WorkoutExercise, SplitDay, SessionExercise) carry an owner
//! back-reference set when they are adopted.

pub mod exercise;
pub mod session;
pub mod split;
pub mod user;
pub mod workout;

pub use exercise::{Difficulty, Exercise};
pub use session::{SessionExercise, SessionStatus, SetPerformance, WorkoutSession};
pub use split::{SplitDay, WorkoutSplit};
pub use user::{User, UserProfile};
pub use workout::{Workout, WorkoutExercise};
