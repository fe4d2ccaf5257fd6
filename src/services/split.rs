// SPDX-License-Identifier: MIT

//! Training split composition and the single-active-split invariant.
//!
//! Activation is a deactivate-then-activate two-step over separate
//! documents, serialized per user with an advisory lock. The invariant is
//! best-effort across process boundaries; within one process the lock
//! closes the race between concurrent activations for the same user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use validator::Validate;

use crate::db::{DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{SplitDay, Workout, WorkoutSplit};
use crate::services::refs::{self, ChildRef};

type UserLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

#[derive(Clone)]
pub struct SplitService {
    store: DocumentStore,
    /// Per-user advisory locks scoped to the activate operation.
    activation_locks: UserLocks,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SplitDayCreate {
    #[validate(length(min = 1, max = 50))]
    pub day_name: String,
    pub workout_id: String,
    #[validate(range(min = 1, max = 7))]
    pub day_number: u8,
    #[serde(default)]
    pub rest_day: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SplitCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub days: Vec<ChildRef<SplitDayCreate>>,
    /// e.g. "push_pull_legs", "upper_lower", "full_body"
    #[validate(length(min = 1))]
    pub split_type: String,
    pub weeks_duration: Option<u32>,
}

/// Partial update: only fields present in the payload are changed.
/// `is_active: true` routes through the activate flow.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SplitPatch {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub split_type: Option<String>,
    pub weeks_duration: Option<u32>,
    pub is_active: Option<bool>,
}

/// Split with its days populated, ordered by day number.
#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
    pub days: Vec<SplitDay>,
    pub split_type: String,
    pub weeks_duration: Option<u32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SplitResponse {
    fn assemble(split: WorkoutSplit, mut days: Vec<SplitDay>) -> Self {
        days.sort_by_key(|d| d.day_number);
        Self {
            id: split.id,
            name: split.name,
            description: split.description,
            user_id: split.user_id,
            days,
            split_type: split.split_type,
            weeks_duration: split.weeks_duration,
            is_active: split.is_active,
            created_at: split.created_at,
            updated_at: split.updated_at,
        }
    }
}

impl SplitService {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            activation_locks: Arc::new(DashMap::new()),
        }
    }

    pub async fn create(&self, user_id: &str, payload: SplitCreate) -> Result<SplitResponse> {
        let split_id = self.store.allocate_id();
        let days = self.resolve_days(&split_id, payload.days).await?;

        let mut created: Vec<String> = Vec::new();
        for day in &days {
            if let Err(e) = self.store.put(day).await {
                return Err(refs::rollback_children::<SplitDay>(&self.store, &created, e).await);
            }
            created.push(day.id.clone());
        }

        let split = WorkoutSplit {
            id: split_id,
            name: payload.name,
            description: payload.description,
            user_id: user_id.to_string(),
            days: days.iter().map(|d| d.id.clone()).collect(),
            split_type: payload.split_type,
            weeks_duration: payload.weeks_duration,
            is_active: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        if let Err(e) = self.store.put(&split).await {
            return Err(refs::rollback_children::<SplitDay>(&self.store, &created, e).await);
        }

        tracing::info!(
            split_id = %split.id,
            user_id = %split.user_id,
            days = days.len(),
            "Split created"
        );
        Ok(SplitResponse::assemble(split, days))
    }

    pub async fn get(&self, id: &str) -> Result<SplitResponse> {
        let split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;
        let days = refs::resolve_ordered(&self.store, &split.days).await?;
        Ok(SplitResponse::assemble(split, days))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<SplitResponse>> {
        let splits: Vec<WorkoutSplit> = self
            .store
            .list(&Filter::new().field_eq("user_id", user_id))
            .await?;

        let mut responses = Vec::with_capacity(splits.len());
        for split in splits {
            let days = refs::resolve_ordered(&self.store, &split.days).await?;
            responses.push(SplitResponse::assemble(split, days));
        }
        Ok(responses)
    }

    pub async fn update(&self, id: &str, patch: SplitPatch) -> Result<SplitResponse> {
        let mut split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;

        if let Some(name) = patch.name {
            split.name = name;
        }
        if let Some(description) = patch.description {
            split.description = Some(description);
        }
        if let Some(split_type) = patch.split_type {
            split.split_type = split_type;
        }
        if let Some(weeks) = patch.weeks_duration {
            split.weeks_duration = Some(weeks);
        }
        split.updated_at = Some(Utc::now());
        self.store.put(&split).await?;

        // The active flag has its own invariant; route it separately.
        match patch.is_active {
            Some(true) => self.activate(id).await,
            Some(false) => self.deactivate(id).await,
            None => self.get(id).await,
        }
    }

    /// Make this split the user's active one.
    ///
    /// Deactivates any other split currently active for the same user, then
    /// activates this one. Re-activating an already-active split is a
    /// no-op. The two steps are not atomic in the store; the operation is
    /// safe to re-run.
    pub async fn activate(&self, id: &str) -> Result<SplitResponse> {
        let split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;

        let lock = self
            .activation_locks
            .entry(split.user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Re-read under the lock; another activation may have run.
        let mut split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;
        if split.is_active {
            return self.get(id).await;
        }

        let active: Vec<WorkoutSplit> = self
            .store
            .list(
                &Filter::new()
                    .field_eq("user_id", &split.user_id)
                    .field_eq("is_active", true),
            )
            .await?;
        for mut other in active {
            other.is_active = false;
            other.updated_at = Some(Utc::now());
            self.store.put(&other).await?;
            tracing::info!(split_id = %other.id, user_id = %other.user_id, "Split deactivated");
        }

        split.is_active = true;
        split.updated_at = Some(Utc::now());
        self.store.put(&split).await?;
        tracing::info!(split_id = %split.id, user_id = %split.user_id, "Split activated");

        let days = refs::resolve_ordered(&self.store, &split.days).await?;
        Ok(SplitResponse::assemble(split, days))
    }

    pub async fn deactivate(&self, id: &str) -> Result<SplitResponse> {
        let mut split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;
        if split.is_active {
            split.is_active = false;
            split.updated_at = Some(Utc::now());
            self.store.put(&split).await?;
        }
        let days = refs::resolve_ordered(&self.store, &split.days).await?;
        Ok(SplitResponse::assemble(split, days))
    }

    /// Delete a split and cascade to its owned days.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let split = refs::require_target::<WorkoutSplit>(&self.store, id).await?;
        for did in &split.days {
            self.store.delete::<SplitDay>(did).await?;
        }
        self.store.delete::<WorkoutSplit>(id).await?;
        tracing::info!(split_id = %id, days = split.days.len(), "Split deleted with days");
        Ok(())
    }

    /// Resolve submitted days: verify workout references, verify ownership
    /// for existing ids, and enforce day-number uniqueness in the parent.
    async fn resolve_days(
        &self,
        split_id: &str,
        specs: Vec<ChildRef<SplitDayCreate>>,
    ) -> Result<Vec<SplitDay>> {
        let mut days = Vec::with_capacity(specs.len());
        for spec in specs {
            match spec {
                ChildRef::New(p) => {
                    refs::require::<Workout>(&self.store, &p.workout_id).await?;
                    days.push(SplitDay {
                        id: self.store.allocate_id(),
                        day_name: p.day_name,
                        workout_id: p.workout_id,
                        split_id: Some(split_id.to_string()),
                        day_number: p.day_number,
                        rest_day: p.rest_day,
                    });
                }
                ChildRef::Existing(r) => {
                    let mut day = refs::require::<SplitDay>(&self.store, &r.id).await?;
                    if let Some(owner) = &day.split_id {
                        if owner != split_id {
                            return Err(AppError::OwnershipConflict(format!(
                                "split day {} already belongs to split {}",
                                r.id, owner
                            )));
                        }
                    }
                    day.split_id = Some(split_id.to_string());
                    days.push(day);
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for day in &days {
            if !seen.insert(day.day_number) {
                return Err(AppError::BadRequest(format!(
                    "duplicate day_number {} in split",
                    day.day_number
                )));
            }
        }

        Ok(days)
    }
}
