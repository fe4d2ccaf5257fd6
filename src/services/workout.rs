// SPDX-License-Identifier: MIT

//! Workout template composition.
//!
//! A workout and its planned exercises live in separate collections; this
//! service makes their creation and updates atomic from the caller's
//! perspective. Children are persisted before the parent, and a failed
//! write compensates by deleting the children it created (the store has no
//! multi-document transactions).
//!
//! Known weak-consistency window: concurrent updates to the same workout's
//! exercise list race last-write-wins at the parent document, and a racing
//! delete can orphan children. Orphans are skipped and logged on read.
//! Children dropped from the list are deleted after the parent write; a
//! failed cleanup delete leaks the unreferenced document (logged).

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::{DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{Difficulty, Exercise, Workout, WorkoutExercise};
use crate::services::refs::{self, ChildRef};

#[derive(Clone)]
pub struct WorkoutService {
    store: DocumentStore,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WorkoutExerciseCreate {
    pub exercise_id: String,
    #[validate(range(min = 1))]
    pub sets: u32,
    #[validate(range(min = 1))]
    pub reps: u32,
    pub weight: Option<f64>,
    pub rest_time: Option<u32>,
    pub notes: Option<String>,
    #[validate(range(min = 1))]
    pub order: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WorkoutCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<ChildRef<WorkoutExerciseCreate>>,
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update: only fields present in the payload are changed. When
/// `exercises` is present the new list is diffed against the current child
/// id set (removed ids deleted, new entries created, retained kept).
#[derive(Debug, Default, Deserialize, Validate)]
pub struct WorkoutPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub exercises: Option<Vec<ChildRef<WorkoutExerciseCreate>>>,
    pub estimated_duration: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub tags: Option<Vec<String>>,
}

/// Workout with its children populated, in exercise order.
#[derive(Debug, Serialize)]
pub struct WorkoutResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub exercises: Vec<WorkoutExercise>,
    pub estimated_duration: Option<u32>,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkoutResponse {
    fn assemble(workout: Workout, exercises: Vec<WorkoutExercise>) -> Self {
        Self {
            id: workout.id,
            name: workout.name,
            description: workout.description,
            user_id: workout.user_id,
            exercises,
            estimated_duration: workout.estimated_duration,
            difficulty: workout.difficulty,
            tags: workout.tags,
            created_at: workout.created_at,
            updated_at: workout.updated_at,
        }
    }
}

/// A child resolved against the store but not yet persisted.
struct ResolvedChild {
    child: WorkoutExercise,
    newly_created: bool,
}

/// Rewrite submitted `order` values into the contiguous ranking `1..n`,
/// ties broken by insertion order.
fn normalize_order(children: &mut [ResolvedChild]) {
    children.sort_by_key(|rc| rc.child.order);
    for (index, rc) in children.iter_mut().enumerate() {
        rc.child.order = (index + 1) as u32;
    }
}

impl WorkoutService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, user_id: &str, payload: WorkoutCreate) -> Result<WorkoutResponse> {
        let workout_id = self.store.allocate_id();
        let mut resolved = self.resolve_children(&workout_id, payload.exercises).await?;
        normalize_order(&mut resolved);

        let mut created: Vec<String> = Vec::new();
        for rc in &resolved {
            if let Err(e) = self.store.put(&rc.child).await {
                return Err(
                    refs::rollback_children::<WorkoutExercise>(&self.store, &created, e).await,
                );
            }
            if rc.newly_created {
                created.push(rc.child.id.clone());
            }
        }

        let workout = Workout {
            id: workout_id,
            name: payload.name,
            description: payload.description,
            user_id: user_id.to_string(),
            exercises: resolved.iter().map(|rc| rc.child.id.clone()).collect(),
            estimated_duration: payload.estimated_duration,
            difficulty: payload.difficulty,
            tags: payload.tags,
            created_at: Utc::now(),
            updated_at: None,
        };
        if let Err(e) = self.store.put(&workout).await {
            return Err(refs::rollback_children::<WorkoutExercise>(&self.store, &created, e).await);
        }

        tracing::info!(
            workout_id = %workout.id,
            user_id = %workout.user_id,
            exercises = resolved.len(),
            "Workout created"
        );
        Ok(WorkoutResponse::assemble(
            workout,
            resolved.into_iter().map(|rc| rc.child).collect(),
        ))
    }

    pub async fn get(&self, id: &str) -> Result<WorkoutResponse> {
        let workout = refs::require_target::<Workout>(&self.store, id).await?;
        let children = refs::resolve_ordered(&self.store, &workout.exercises).await?;
        Ok(WorkoutResponse::assemble(workout, children))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<WorkoutResponse>> {
        let workouts: Vec<Workout> = self
            .store
            .list(&Filter::new().field_eq("user_id", user_id))
            .await?;

        let mut responses = Vec::with_capacity(workouts.len());
        for workout in workouts {
            let children = refs::resolve_ordered(&self.store, &workout.exercises).await?;
            responses.push(WorkoutResponse::assemble(workout, children));
        }
        Ok(responses)
    }

    pub async fn update(&self, id: &str, patch: WorkoutPatch) -> Result<WorkoutResponse> {
        let mut workout = refs::require_target::<Workout>(&self.store, id).await?;

        if let Some(name) = patch.name {
            workout.name = name;
        }
        if let Some(description) = patch.description {
            workout.description = Some(description);
        }
        if let Some(duration) = patch.estimated_duration {
            workout.estimated_duration = Some(duration);
        }
        if let Some(difficulty) = patch.difficulty {
            workout.difficulty = difficulty;
        }
        if let Some(tags) = patch.tags {
            workout.tags = tags;
        }

        let mut created: Vec<String> = Vec::new();
        let mut removed: Vec<String> = Vec::new();
        let mut new_children: Option<Vec<WorkoutExercise>> = None;

        if let Some(specs) = patch.exercises {
            let mut resolved = self.resolve_children(id, specs).await?;
            normalize_order(&mut resolved);

            let kept: HashSet<&str> = resolved.iter().map(|rc| rc.child.id.as_str()).collect();
            removed = workout
                .exercises
                .iter()
                .filter(|cid| !kept.contains(cid.as_str()))
                .cloned()
                .collect();

            for rc in &resolved {
                if let Err(e) = self.store.put(&rc.child).await {
                    return Err(refs::rollback_children::<WorkoutExercise>(
                        &self.store,
                        &created,
                        e,
                    )
                    .await);
                }
                if rc.newly_created {
                    created.push(rc.child.id.clone());
                }
            }

            workout.exercises = resolved.iter().map(|rc| rc.child.id.clone()).collect();
            new_children = Some(resolved.into_iter().map(|rc| rc.child).collect());
        }

        workout.updated_at = Some(Utc::now());
        if let Err(e) = self.store.put(&workout).await {
            return Err(refs::rollback_children::<WorkoutExercise>(&self.store, &created, e).await);
        }

        // Removed children are deleted only after the parent write lands;
        // a failed cleanup leaks an unreferenced document, never a parent
        // pointing at deleted ids.
        for cid in &removed {
            if let Err(e) = self.store.delete::<WorkoutExercise>(cid).await {
                tracing::warn!(
                    workout_id = %id,
                    child_id = %cid,
                    error = %e,
                    "Removed child cleanup failed, document leaked"
                );
            }
        }

        let children = match new_children {
            Some(children) => children,
            None => refs::resolve_ordered(&self.store, &workout.exercises).await?,
        };
        Ok(WorkoutResponse::assemble(workout, children))
    }

    /// Delete a workout and cascade to its owned exercises.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let workout = refs::require_target::<Workout>(&self.store, id).await?;
        for cid in &workout.exercises {
            self.store.delete::<WorkoutExercise>(cid).await?;
        }
        self.store.delete::<Workout>(id).await?;
        tracing::info!(
            workout_id = %id,
            children = workout.exercises.len(),
            "Workout deleted with children"
        );
        Ok(())
    }

    /// Resolve a submitted child list: verify exercise references for
    /// inline payloads, verify existence and ownership for existing ids.
    async fn resolve_children(
        &self,
        workout_id: &str,
        specs: Vec<ChildRef<WorkoutExerciseCreate>>,
    ) -> Result<Vec<ResolvedChild>> {
        let mut resolved = Vec::with_capacity(specs.len());
        for spec in specs {
            match spec {
                ChildRef::New(p) => {
                    refs::require::<Exercise>(&self.store, &p.exercise_id).await?;
                    resolved.push(ResolvedChild {
                        child: WorkoutExercise {
                            id: self.store.allocate_id(),
                            exercise_id: p.exercise_id,
                            workout_id: Some(workout_id.to_string()),
                            sets: p.sets,
                            reps: p.reps,
                            weight: p.weight,
                            rest_time: p.rest_time,
                            notes: p.notes,
                            order: p.order,
                            needs_repair: false,
                        },
                        newly_created: true,
                    });
                }
                ChildRef::Existing(r) => {
                    let mut child =
                        refs::require::<WorkoutExercise>(&self.store, &r.id).await?;
                    if let Some(owner) = &child.workout_id {
                        if owner != workout_id {
                            return Err(AppError::OwnershipConflict(format!(
                                "workout exercise {} already belongs to workout {}",
                                r.id, owner
                            )));
                        }
                    }
                    child.workout_id = Some(workout_id.to_string());
                    resolved.push(ResolvedChild {
                        child,
                        newly_created: false,
                    });
                }
            }
        }
        Ok(resolved)
    }
}
