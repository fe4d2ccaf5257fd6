// SPDX-License-Identifier: MIT

//! Workout session lifecycle.
//!
//! Sessions start `in_progress`, collect per-exercise performance while
//! open, and end in exactly one of two terminal states. Completing a
//! session runs the metrics engine once and persists the aggregates;
//! abandoning stamps the end time but leaves metrics null. Terminal
//! sessions, children included, are read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{
    Exercise, SessionExercise, SessionStatus, SetPerformance, Workout, WorkoutExercise,
    WorkoutSession, WorkoutSplit,
};
use crate::services::metrics;
use crate::services::refs::{self, ChildRef};

#[derive(Clone)]
pub struct SessionService {
    store: DocumentStore,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionExerciseCreate {
    pub exercise_id: String,
    pub workout_exercise_id: String,
    #[serde(default)]
    pub sets_completed: u32,
    #[serde(default)]
    pub actual_sets: Vec<SetPerformance>,
    pub notes: Option<String>,
    #[serde(default)]
    pub skipped: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SessionCreate {
    pub workout_id: String,
    pub split_id: Option<String>,
    pub session_name: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ChildRef<SessionExerciseCreate>>,
}

/// Partial update of session notes and ratings. Legal only while the
/// session is in progress.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SessionPatch {
    pub session_name: Option<String>,
    pub notes: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub difficulty_rating: Option<u8>,
    #[validate(range(min = 1, max = 10))]
    pub energy_level: Option<u8>,
}

/// Partial update of one recorded exercise. Legal only while the owning
/// session is in progress.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SessionExercisePatch {
    pub sets_completed: Option<u32>,
    pub actual_sets: Option<Vec<SetPerformance>>,
    pub notes: Option<String>,
    pub skipped: Option<bool>,
}

/// Session with its children populated, in workout order.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub workout_id: String,
    pub user_id: String,
    pub split_id: Option<String>,
    pub session_name: Option<String>,
    pub exercises: Vec<SessionExercise>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
    pub total_volume: Option<f64>,
    pub total_reps: Option<u32>,
    pub total_sets: Option<u32>,
    pub status: SessionStatus,
    pub completion_percentage: Option<f64>,
    pub notes: Option<String>,
    pub difficulty_rating: Option<u8>,
    pub energy_level: Option<u8>,
    pub created_at: DateTime<Utc>,
}

impl SessionResponse {
    fn assemble(session: WorkoutSession, exercises: Vec<SessionExercise>) -> Self {
        Self {
            id: session.id,
            workout_id: session.workout_id,
            user_id: session.user_id,
            split_id: session.split_id,
            session_name: session.session_name,
            exercises,
            started_at: session.started_at,
            completed_at: session.completed_at,
            duration: session.duration,
            total_volume: session.total_volume,
            total_reps: session.total_reps,
            total_sets: session.total_sets,
            status: session.status,
            completion_percentage: session.completion_percentage,
            notes: session.notes,
            difficulty_rating: session.difficulty_rating,
            energy_level: session.energy_level,
            created_at: session.created_at,
        }
    }
}

impl SessionService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Start a session against a workout template.
    pub async fn start(&self, user_id: &str, payload: SessionCreate) -> Result<SessionResponse> {
        refs::require::<Workout>(&self.store, &payload.workout_id).await?;
        if let Some(split_id) = &payload.split_id {
            refs::require::<WorkoutSplit>(&self.store, split_id).await?;
        }

        let session_id = self.store.allocate_id();
        let children = self
            .resolve_children(&session_id, &payload.workout_id, payload.exercises)
            .await?;

        let mut created: Vec<String> = Vec::new();
        for child in &children {
            if let Err(e) = self.store.put(child).await {
                return Err(
                    refs::rollback_children::<SessionExercise>(&self.store, &created, e).await,
                );
            }
            created.push(child.id.clone());
        }

        let now = Utc::now();
        let session = WorkoutSession {
            id: session_id,
            workout_id: payload.workout_id,
            user_id: user_id.to_string(),
            split_id: payload.split_id,
            session_name: payload.session_name,
            exercises: children.iter().map(|c| c.id.clone()).collect(),
            started_at: now,
            completed_at: None,
            duration: None,
            total_volume: None,
            total_reps: None,
            total_sets: None,
            status: SessionStatus::InProgress,
            completion_percentage: None,
            notes: None,
            difficulty_rating: None,
            energy_level: None,
            created_at: now,
        };
        if let Err(e) = self.store.put(&session).await {
            return Err(refs::rollback_children::<SessionExercise>(&self.store, &created, e).await);
        }

        tracing::info!(
            session_id = %session.id,
            workout_id = %session.workout_id,
            user_id = %session.user_id,
            "Session started"
        );
        Ok(SessionResponse::assemble(session, children))
    }

    pub async fn get(&self, id: &str) -> Result<SessionResponse> {
        let session = refs::require_target::<WorkoutSession>(&self.store, id).await?;
        let children = refs::resolve_ordered(&self.store, &session.exercises).await?;
        Ok(SessionResponse::assemble(session, children))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<SessionResponse>> {
        let sessions: Vec<WorkoutSession> = self
            .store
            .list(&Filter::new().field_eq("user_id", user_id))
            .await?;

        let mut responses = Vec::with_capacity(sessions.len());
        for session in sessions {
            let children = refs::resolve_ordered(&self.store, &session.exercises).await?;
            responses.push(SessionResponse::assemble(session, children));
        }
        Ok(responses)
    }

    /// Update notes and ratings on an open session.
    pub async fn update(&self, id: &str, patch: SessionPatch) -> Result<SessionResponse> {
        let mut session = refs::require_target::<WorkoutSession>(&self.store, id).await?;
        Self::ensure_open(&session)?;

        if let Some(session_name) = patch.session_name {
            session.session_name = Some(session_name);
        }
        if let Some(notes) = patch.notes {
            session.notes = Some(notes);
        }
        if let Some(rating) = patch.difficulty_rating {
            session.difficulty_rating = Some(rating);
        }
        if let Some(energy) = patch.energy_level {
            session.energy_level = Some(energy);
        }
        self.store.put(&session).await?;

        let children = refs::resolve_ordered(&self.store, &session.exercises).await?;
        Ok(SessionResponse::assemble(session, children))
    }

    /// Record performance on one exercise of an open session.
    pub async fn record_exercise(
        &self,
        session_id: &str,
        session_exercise_id: &str,
        patch: SessionExercisePatch,
    ) -> Result<SessionExercise> {
        let session = refs::require_target::<WorkoutSession>(&self.store, session_id).await?;
        Self::ensure_open(&session)?;

        let mut child =
            refs::require_target::<SessionExercise>(&self.store, session_exercise_id).await?;
        if child.session_id.as_deref() != Some(session_id) {
            return Err(AppError::OwnershipConflict(format!(
                "session exercise {} does not belong to session {}",
                session_exercise_id, session_id
            )));
        }

        if let Some(sets_completed) = patch.sets_completed {
            child.sets_completed = sets_completed;
        }
        if let Some(actual_sets) = patch.actual_sets {
            child.actual_sets = actual_sets;
        }
        if let Some(notes) = patch.notes {
            child.notes = Some(notes);
        }
        if let Some(skipped) = patch.skipped {
            child.skipped = skipped;
        }
        if child.sets_completed > 0 && !child.skipped && child.completed_at.is_none() {
            child.completed_at = Some(Utc::now());
        }

        self.store.put(&child).await?;
        Ok(child)
    }

    /// Transition `in_progress -> completed`: run the metrics engine once
    /// and persist the aggregates with the terminal state.
    pub async fn complete(&self, id: &str) -> Result<SessionResponse> {
        let mut session = refs::require_target::<WorkoutSession>(&self.store, id).await?;
        session.status.check_transition(SessionStatus::Completed)?;

        let children = refs::resolve_ordered(&self.store, &session.exercises).await?;
        let computed = metrics::compute(&children);
        let now = Utc::now();

        session.completed_at = Some(now);
        session.duration = Some(metrics::duration_minutes(session.started_at, now));
        session.total_sets = Some(computed.total_sets);
        session.total_reps = Some(computed.total_reps);
        session.total_volume = Some(computed.total_volume);
        session.completion_percentage = Some(computed.completion_percentage);
        session.status = SessionStatus::Completed;
        self.store.put(&session).await?;

        tracing::info!(
            session_id = %id,
            total_volume = computed.total_volume,
            completion = computed.completion_percentage,
            "Session completed"
        );
        Ok(SessionResponse::assemble(session, children))
    }

    /// Transition `in_progress -> abandoned`: stamp the end time, leave
    /// derived metrics null.
    pub async fn abandon(&self, id: &str) -> Result<SessionResponse> {
        let mut session = refs::require_target::<WorkoutSession>(&self.store, id).await?;
        session.status.check_transition(SessionStatus::Abandoned)?;

        session.completed_at = Some(Utc::now());
        session.status = SessionStatus::Abandoned;
        self.store.put(&session).await?;

        tracing::info!(session_id = %id, "Session abandoned");
        let children = refs::resolve_ordered(&self.store, &session.exercises).await?;
        Ok(SessionResponse::assemble(session, children))
    }

    /// Delete a session and cascade to its recorded exercises.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let session = refs::require_target::<WorkoutSession>(&self.store, id).await?;
        for cid in &session.exercises {
            self.store.delete::<SessionExercise>(cid).await?;
        }
        self.store.delete::<WorkoutSession>(id).await?;
        tracing::info!(
            session_id = %id,
            children = session.exercises.len(),
            "Session deleted with children"
        );
        Ok(())
    }

    fn ensure_open(session: &WorkoutSession) -> Result<()> {
        if session.status.is_terminal() {
            return Err(AppError::SessionImmutable(format!(
                "session {} is {}",
                session.id, session.status
            )));
        }
        Ok(())
    }

    /// Resolve submitted children: each one must reference a catalog
    /// exercise and a planned exercise belonging to the session's workout.
    async fn resolve_children(
        &self,
        session_id: &str,
        workout_id: &str,
        specs: Vec<ChildRef<SessionExerciseCreate>>,
    ) -> Result<Vec<SessionExercise>> {
        let mut children = Vec::with_capacity(specs.len());
        for spec in specs {
            match spec {
                ChildRef::New(p) => {
                    refs::require::<Exercise>(&self.store, &p.exercise_id).await?;
                    let planned =
                        refs::require::<WorkoutExercise>(&self.store, &p.workout_exercise_id)
                            .await?;
                    if planned.workout_id.as_deref() != Some(workout_id) {
                        return Err(AppError::OwnershipConflict(format!(
                            "planned exercise {} belongs to a different workout",
                            p.workout_exercise_id
                        )));
                    }
                    children.push(SessionExercise {
                        id: self.store.allocate_id(),
                        exercise_id: p.exercise_id,
                        workout_exercise_id: p.workout_exercise_id,
                        session_id: Some(session_id.to_string()),
                        sets_completed: p.sets_completed,
                        actual_sets: p.actual_sets,
                        notes: p.notes,
                        skipped: p.skipped,
                        completed_at: None,
                        needs_repair: false,
                    });
                }
                ChildRef::Existing(r) => {
                    let mut child =
                        refs::require::<SessionExercise>(&self.store, &r.id).await?;
                    if let Some(owner) = &child.session_id {
                        if owner != session_id {
                            return Err(AppError::OwnershipConflict(format!(
                                "session exercise {} already belongs to session {}",
                                r.id, owner
                            )));
                        }
                    }
                    child.session_id = Some(session_id.to_string());
                    children.push(child);
                }
            }
        }
        Ok(children)
    }
}
