// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod exercise;
pub mod metrics;
pub mod refs;
pub mod session;
pub mod split;
pub mod workout;

pub use exercise::ExerciseService;
pub use session::SessionService;
pub use split::SplitService;
pub use workout::WorkoutService;
