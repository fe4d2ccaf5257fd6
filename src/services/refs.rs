// SPDX-License-Identifier: MIT

//! Reference resolution for parent/child document composition.
//!
//! The store has no foreign-key constraints, so this module is what stands
//! in for them: it dereferences child identifiers against their
//! collections, fails composite writes on dangling ids, and cleans up
//! already-created children when a composite write fails partway.

use futures_util::{stream, StreamExt};
use serde::Deserialize;
use validator::Validate;

use crate::db::{Document, DocumentStore};
use crate::error::{AppError, Result};

/// Bounded concurrency for bulk child fetches.
const MAX_CONCURRENT_DB_OPS: usize = 16;

/// A child entry in a parent payload: either an existing document id or an
/// inline creation payload synthesized in the same logical operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChildRef<T> {
    Existing(ExistingRef),
    New(T),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExistingRef {
    pub id: String,
}

/// Shape-validate the inline payloads of a child list.
pub fn validate_children<T: Validate>(children: &[ChildRef<T>]) -> Result<()> {
    for child in children {
        if let ChildRef::New(payload) = child {
            payload
                .validate()
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
        }
    }
    Ok(())
}

/// Dereference a child id held by a parent payload.
///
/// Fails with `DanglingReference`: this is a reference inside a composite
/// write, not a request target.
pub async fn require<T: Document>(store: &DocumentStore, id: &str) -> Result<T> {
    store
        .get::<T>(id)
        .await?
        .ok_or_else(|| AppError::DanglingReference(format!("{}/{}", T::COLLECTION, id)))
}

/// Fetch a request target, failing with `NotFound`.
pub async fn require_target<T: Document>(store: &DocumentStore, id: &str) -> Result<T> {
    store
        .get::<T>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{}/{}", T::COLLECTION, id)))
}

/// Order-preserving bulk fetch of a parent's child list.
///
/// Read path only: a stored id that no longer resolves is logged and
/// skipped (orphans are repaired lazily, not served as errors).
pub async fn resolve_ordered<T: Document>(
    store: &DocumentStore,
    ids: &[String],
) -> Result<Vec<T>> {
    let fetched: Vec<(String, Result<Option<T>>)> = stream::iter(ids.to_vec())
        .map(|id| {
            let store = store.clone();
            async move {
                let result = store.get::<T>(&id).await;
                (id, result)
            }
        })
        .buffered(MAX_CONCURRENT_DB_OPS)
        .collect()
        .await;

    let mut docs = Vec::with_capacity(ids.len());
    for (id, result) in fetched {
        match result? {
            Some(doc) => docs.push(doc),
            None => tracing::warn!(
                collection = T::COLLECTION,
                id = %id,
                "Dangling child reference skipped"
            ),
        }
    }
    Ok(docs)
}

/// Compensate a failed composite write by deleting the children it created.
///
/// Returns the original cause when cleanup succeeds; when a cleanup delete
/// itself fails, returns `PartialWriteUnrecovered` carrying the ids left
/// behind so an operator can run repair.
pub async fn rollback_children<T: Document>(
    store: &DocumentStore,
    created_ids: &[String],
    cause: AppError,
) -> AppError {
    let mut orphaned = Vec::new();
    for id in created_ids {
        if let Err(e) = store.delete::<T>(id).await {
            tracing::error!(
                collection = T::COLLECTION,
                id = %id,
                error = %e,
                "Compensation delete failed"
            );
            orphaned.push(id.clone());
        }
    }

    if orphaned.is_empty() {
        tracing::warn!(
            collection = T::COLLECTION,
            count = created_ids.len(),
            error = %cause,
            "Composite write rolled back"
        );
        cause
    } else {
        AppError::PartialWriteUnrecovered { orphaned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Exercise;

    #[derive(Debug, Deserialize, Validate)]
    struct FakePayload {
        #[validate(range(min = 1))]
        count: u32,
    }

    #[test]
    fn test_child_ref_deserializes_existing_and_inline() {
        let existing: ChildRef<FakePayload> =
            serde_json::from_str(r#"{"id": "abc-123"}"#).unwrap();
        assert!(matches!(existing, ChildRef::Existing(ref r) if r.id == "abc-123"));

        let inline: ChildRef<FakePayload> = serde_json::from_str(r#"{"count": 3}"#).unwrap();
        assert!(matches!(inline, ChildRef::New(ref p) if p.count == 3));
    }

    #[test]
    fn test_validate_children_rejects_bad_inline_payload() {
        let children = vec![ChildRef::New(FakePayload { count: 0 })];
        assert!(matches!(
            validate_children(&children),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_require_distinguishes_dangling_from_not_found() {
        let store = DocumentStore::memory();

        let err = require::<Exercise>(&store, "missing").await.unwrap_err();
        assert!(matches!(err, AppError::DanglingReference(_)));

        let err = require_target::<Exercise>(&store, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_ordered_skips_dangling_ids() {
        let store = DocumentStore::memory();
        let ex = Exercise {
            id: "e1".to_string(),
            name: "Squat".to_string(),
            description: None,
            muscle_groups: vec!["quads".to_string()],
            equipment: Some("barbell".to_string()),
            instructions: vec![],
            difficulty: Default::default(),
            created_at: chrono::Utc::now(),
        };
        store.put(&ex).await.unwrap();

        let docs: Vec<Exercise> =
            resolve_ordered(&store, &["e1".to_string(), "gone".to_string()])
                .await
                .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "e1");
    }
}
