// SPDX-License-Identifier: MIT

//! Exercise catalog service.
//!
//! Single-entity CRUD, except for delete: an exercise referenced by any
//! planned or recorded exercise cannot be removed without `force`, and a
//! forced removal flags the referencing children for lazy repair.

use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::db::{DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{Difficulty, Exercise, SessionExercise, WorkoutExercise};
use crate::services::refs;

#[derive(Clone)]
pub struct ExerciseService {
    store: DocumentStore,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExerciseCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    pub equipment: Option<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// Partial update: only fields present in the payload are changed.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ExercisePatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub muscle_groups: Option<Vec<String>>,
    pub equipment: Option<String>,
    pub instructions: Option<Vec<String>>,
    pub difficulty: Option<Difficulty>,
}

impl ExercisePatch {
    fn apply(self, exercise: &mut Exercise) {
        if let Some(name) = self.name {
            exercise.name = name;
        }
        if let Some(description) = self.description {
            exercise.description = Some(description);
        }
        if let Some(muscle_groups) = self.muscle_groups {
            exercise.muscle_groups = muscle_groups;
        }
        if let Some(equipment) = self.equipment {
            exercise.equipment = Some(equipment);
        }
        if let Some(instructions) = self.instructions {
            exercise.instructions = instructions;
        }
        if let Some(difficulty) = self.difficulty {
            exercise.difficulty = difficulty;
        }
    }
}

/// Catalog listing filters (conjunctive).
#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    pub muscle_group: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub equipment: Option<String>,
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

impl ExerciseService {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: ExerciseCreate) -> Result<Exercise> {
        let exercise = Exercise {
            id: self.store.allocate_id(),
            name: payload.name,
            description: payload.description,
            muscle_groups: payload.muscle_groups,
            equipment: payload.equipment,
            instructions: payload.instructions,
            difficulty: payload.difficulty,
            created_at: Utc::now(),
        };
        self.store.put(&exercise).await?;
        tracing::info!(exercise_id = %exercise.id, name = %exercise.name, "Exercise created");
        Ok(exercise)
    }

    pub async fn get(&self, id: &str) -> Result<Exercise> {
        refs::require_target::<Exercise>(&self.store, id).await
    }

    pub async fn list(&self, query: ExerciseQuery) -> Result<Vec<Exercise>> {
        let mut filter = Filter::new().offset(query.skip).limit(query.limit);
        if let Some(muscle_group) = &query.muscle_group {
            filter = filter.field_contains("muscle_groups", muscle_group);
        }
        if let Some(difficulty) = query.difficulty {
            filter = filter.field_eq("difficulty", difficulty);
        }
        if let Some(equipment) = &query.equipment {
            filter = filter.field_eq("equipment", equipment);
        }
        self.store.list(&filter).await
    }

    pub async fn update(&self, id: &str, patch: ExercisePatch) -> Result<Exercise> {
        let mut exercise = refs::require_target::<Exercise>(&self.store, id).await?;
        patch.apply(&mut exercise);
        self.store.put(&exercise).await?;
        Ok(exercise)
    }

    /// Delete a catalog entry.
    ///
    /// Rejected with `ReferencedEntityInUse` while any WorkoutExercise or
    /// SessionExercise references it, unless `force` is set; a forced
    /// delete marks the referencing children `needs_repair` and leaves
    /// their dangling references for lazy repair.
    pub async fn delete(&self, id: &str, force: bool) -> Result<()> {
        refs::require_target::<Exercise>(&self.store, id).await?;

        let planned: Vec<WorkoutExercise> = self
            .store
            .list(&Filter::new().field_eq("exercise_id", id))
            .await?;
        let recorded: Vec<SessionExercise> = self
            .store
            .list(&Filter::new().field_eq("exercise_id", id))
            .await?;

        if !planned.is_empty() || !recorded.is_empty() {
            if !force {
                return Err(AppError::ReferencedEntityInUse(format!(
                    "exercise {} is referenced by {} planned and {} recorded exercises",
                    id,
                    planned.len(),
                    recorded.len()
                )));
            }

            for mut child in planned {
                child.needs_repair = true;
                self.store.put(&child).await?;
            }
            for mut child in recorded {
                child.needs_repair = true;
                self.store.put(&child).await?;
            }
            tracing::warn!(
                exercise_id = %id,
                "Forced exercise delete, referencing children flagged for repair"
            );
        }

        self.store.delete::<Exercise>(id).await?;
        Ok(())
    }
}
