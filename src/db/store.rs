// SPDX-License-Identifier: MIT

//! Generic document store with typed operations.
//!
//! Two backends behind one handle:
//! - Firestore for deployments (one collection per entity type)
//! - an in-process memory map for tests and local development
//!
//! The store knows nothing about cross-collection consistency. Reference
//! checks and multi-document writes are the service layer's responsibility.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};

/// A value stored as one document in a named collection.
///
/// The id is part of the document and doubles as the document id in the
/// backing store. Ids are store-allocated (UUID v4) and opaque to callers.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Conjunctive filter over indexed fields, plus pagination.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Clause)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Debug, Clone)]
enum Clause {
    Eq(serde_json::Value),
    /// Array field contains the value.
    Contains(serde_json::Value),
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field equals value.
    pub fn field_eq(mut self, field: &str, value: impl Serialize) -> Self {
        let value = filter_value(field, value);
        self.clauses.push((field.to_string(), Clause::Eq(value)));
        self
    }

    /// Array field contains value (membership predicate).
    pub fn field_contains(mut self, field: &str, value: impl Serialize) -> Self {
        let value = filter_value(field, value);
        self.clauses
            .push((field.to_string(), Clause::Contains(value)));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    fn matches(&self, doc: &serde_json::Value) -> bool {
        self.clauses.iter().all(|(field, clause)| {
            let actual = doc.get(field).unwrap_or(&serde_json::Value::Null);
            match clause {
                Clause::Eq(expected) => actual == expected,
                Clause::Contains(expected) => actual
                    .as_array()
                    .is_some_and(|items| items.contains(expected)),
            }
        })
    }
}

/// A filter clause value must serialize; an unserializable one (e.g. a
/// NaN float) cannot match anything meaningful.
fn filter_value(field: &str, value: impl Serialize) -> serde_json::Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(field, error = %e, "Filter value does not serialize");
            debug_assert!(false, "filter value for {} does not serialize: {}", field, e);
            serde_json::Value::Null
        }
    }
}

/// Keyed by (collection, document id).
type MemoryMap = Arc<DashMap<(String, String), serde_json::Value>>;

/// Fault injection handle for the memory backend.
///
/// Lets tests force store failures at chosen points, so the service-layer
/// compensation paths can be exercised without a real backend outage.
#[derive(Clone, Default)]
pub struct MemoryFaults {
    state: Arc<FaultState>,
}

struct FaultState {
    put_budget: AtomicI64,
    deletes_fail: AtomicBool,
}

impl Default for FaultState {
    fn default() -> Self {
        Self {
            put_budget: AtomicI64::new(i64::MAX),
            deletes_fail: AtomicBool::new(false),
        }
    }
}

impl MemoryFaults {
    /// Let the next `n` puts succeed, then fail every put after them.
    pub fn fail_puts_after(&self, n: u32) {
        self.state.put_budget.store(i64::from(n), Ordering::SeqCst);
    }

    /// Fail every delete from now on.
    pub fn fail_deletes(&self) {
        self.state.deletes_fail.store(true, Ordering::SeqCst);
    }

    fn put_fails(&self) -> bool {
        self.state.put_budget.fetch_sub(1, Ordering::SeqCst) <= 0
    }

    fn delete_fails(&self) -> bool {
        self.state.deletes_fail.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
struct MemoryBackend {
    map: MemoryMap,
    faults: MemoryFaults,
}

#[derive(Clone)]
enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(MemoryBackend),
}

/// Document store handle, cheap to clone, passed to every service at
/// construction time. No ambient globals.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Backend,
    op_timeout: Duration,
}

impl DocumentStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn firestore(project_id: &str, op_timeout: Duration) -> Result<Self> {
        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to connect to Firestore: {}", e))
            })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: Backend::Firestore(client),
            op_timeout,
        })
    }

    /// Create an in-process memory store (tests, local development).
    pub fn memory() -> Self {
        Self::memory_with_faults().0
    }

    /// Memory store plus a fault handle, for tests that need to force
    /// failures mid-write.
    pub fn memory_with_faults() -> (Self, MemoryFaults) {
        let backend = MemoryBackend::default();
        let faults = backend.faults.clone();
        (
            Self {
                backend: Backend::Memory(backend),
                op_timeout: Duration::from_secs(5),
            },
            faults,
        )
    }

    /// Allocate a new opaque document id.
    pub fn allocate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Create or replace a document under its own id.
    pub async fn put<T: Document>(&self, doc: &T) -> Result<()> {
        match &self.backend {
            Backend::Firestore(client) => {
                let fut = async {
                    let _: () = client
                        .fluent()
                        .update()
                        .in_col(T::COLLECTION)
                        .document_id(doc.id())
                        .object(doc)
                        .execute()
                        .await
                        .map_err(store_err)?;
                    Ok(())
                };
                self.with_timeout(fut).await
            }
            Backend::Memory(mem) => {
                if mem.faults.put_fails() {
                    return Err(AppError::StoreUnavailable(
                        "injected put failure".to_string(),
                    ));
                }
                let value = serde_json::to_value(doc)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("serialize: {}", e)))?;
                mem.map
                    .insert((T::COLLECTION.to_string(), doc.id().to_string()), value);
                Ok(())
            }
        }
    }

    /// Fetch a document by id. `Ok(None)` when the id does not resolve.
    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>> {
        match &self.backend {
            Backend::Firestore(client) => {
                let fut = async {
                    client
                        .fluent()
                        .select()
                        .by_id_in(T::COLLECTION)
                        .obj()
                        .one(id)
                        .await
                        .map_err(store_err)
                };
                self.with_timeout(fut).await
            }
            Backend::Memory(mem) => mem
                .map
                .get(&(T::COLLECTION.to_string(), id.to_string()))
                .map(|entry| {
                    serde_json::from_value(entry.value().clone())
                        .map_err(|e| AppError::Internal(anyhow::anyhow!("deserialize: {}", e)))
                })
                .transpose(),
        }
    }

    /// Delete a document. Returns whether it existed.
    pub async fn delete<T: Document>(&self, id: &str) -> Result<bool> {
        match &self.backend {
            Backend::Firestore(client) => {
                // Firestore deletes are blind; read first to report existence.
                let existed = self.get::<T>(id).await?.is_some();
                if !existed {
                    return Ok(false);
                }
                let fut = async {
                    client
                        .fluent()
                        .delete()
                        .from(T::COLLECTION)
                        .document_id(id)
                        .execute()
                        .await
                        .map_err(store_err)?;
                    Ok(true)
                };
                self.with_timeout(fut).await
            }
            Backend::Memory(mem) => {
                if mem.faults.delete_fails() {
                    return Err(AppError::StoreUnavailable(
                        "injected delete failure".to_string(),
                    ));
                }
                Ok(mem
                    .map
                    .remove(&(T::COLLECTION.to_string(), id.to_string()))
                    .is_some())
            }
        }
    }

    /// List documents matching a conjunctive filter.
    pub async fn list<T: Document>(&self, filter: &Filter) -> Result<Vec<T>> {
        match &self.backend {
            Backend::Firestore(client) => {
                let clauses = filter.clauses.clone();
                let query = client
                    .fluent()
                    .select()
                    .from(T::COLLECTION)
                    .filter(move |q| {
                        q.for_all(clauses.iter().map(|(field, clause)| match clause {
                            Clause::Eq(v) => q.field(field).eq(v.clone()),
                            Clause::Contains(v) => q.field(field).array_contains(v.clone()),
                        }))
                    });
                let query = match filter.limit {
                    Some(limit) => query.limit(limit),
                    None => query,
                };
                let query = match filter.offset {
                    Some(offset) => query.offset(offset),
                    None => query,
                };
                let fut = async { query.obj().query().await.map_err(store_err) };
                self.with_timeout(fut).await
            }
            Backend::Memory(mem) => {
                let mut matched: Vec<(String, serde_json::Value)> = mem
                    .map
                    .iter()
                    .filter(|entry| entry.key().0 == T::COLLECTION)
                    .filter(|entry| filter.matches(entry.value()))
                    .map(|entry| (entry.key().1.clone(), entry.value().clone()))
                    .collect();
                // Deterministic pagination: memory iteration order is arbitrary.
                matched.sort_by(|a, b| a.0.cmp(&b.0));

                let offset = filter.offset.unwrap_or(0) as usize;
                let limit = filter.limit.map(|l| l as usize).unwrap_or(usize::MAX);
                matched
                    .into_iter()
                    .skip(offset)
                    .take(limit)
                    .map(|(_, value)| {
                        serde_json::from_value(value)
                            .map_err(|e| AppError::Internal(anyhow::anyhow!("deserialize: {}", e)))
                    })
                    .collect()
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::StoreUnavailable(format!(
                "store operation timed out after {:?}",
                self.op_timeout
            ))),
        }
    }
}

fn store_err(e: firestore::errors::FirestoreError) -> AppError {
    AppError::StoreUnavailable(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        owner: String,
        tags: Vec<String>,
        size: u32,
    }

    impl Document for Widget {
        const COLLECTION: &'static str = "widgets";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn widget(id: &str, owner: &str, tags: &[&str], size: u32) -> Widget {
        Widget {
            id: id.to_string(),
            owner: owner.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            size,
        }
    }

    #[tokio::test]
    async fn test_put_get_delete_roundtrip() {
        let store = DocumentStore::memory();
        let w = widget("w1", "alice", &["red"], 3);

        store.put(&w).await.unwrap();
        let fetched: Widget = store.get("w1").await.unwrap().expect("widget exists");
        assert_eq!(fetched, w);

        assert!(store.delete::<Widget>("w1").await.unwrap());
        assert!(!store.delete::<Widget>("w1").await.unwrap());
        assert!(store.get::<Widget>("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_eq_and_membership_filters() {
        let store = DocumentStore::memory();
        store.put(&widget("a", "alice", &["red", "big"], 1)).await.unwrap();
        store.put(&widget("b", "alice", &["blue"], 2)).await.unwrap();
        store.put(&widget("c", "bob", &["red"], 3)).await.unwrap();

        let alice: Vec<Widget> = store
            .list(&Filter::new().field_eq("owner", "alice"))
            .await
            .unwrap();
        assert_eq!(alice.len(), 2);

        let red_alice: Vec<Widget> = store
            .list(
                &Filter::new()
                    .field_eq("owner", "alice")
                    .field_contains("tags", "red"),
            )
            .await
            .unwrap();
        assert_eq!(red_alice.len(), 1);
        assert_eq!(red_alice[0].id, "a");
    }

    #[tokio::test]
    async fn test_list_pagination_is_deterministic() {
        let store = DocumentStore::memory();
        for i in 0..5 {
            store
                .put(&widget(&format!("w{}", i), "alice", &[], i))
                .await
                .unwrap();
        }

        let page: Vec<Widget> = store
            .list(&Filter::new().offset(1).limit(2))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "w1");
        assert_eq!(page[1].id, "w2");
    }

    #[test]
    fn test_allocate_id_is_unique() {
        let store = DocumentStore::memory();
        assert_ne!(store.allocate_id(), store.allocate_id());
    }

    #[tokio::test]
    async fn test_fault_handle_fails_puts_after_budget_and_deletes() {
        let (store, faults) = DocumentStore::memory_with_faults();
        store.put(&widget("w1", "alice", &[], 1)).await.unwrap();

        faults.fail_puts_after(1);
        store.put(&widget("w2", "alice", &[], 2)).await.unwrap();
        let err = store.put(&widget("w3", "alice", &[], 3)).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));

        faults.fail_deletes();
        let err = store.delete::<Widget>("w1").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
        assert!(store.get::<Widget>("w1").await.unwrap().is_some());
    }

    #[test]
    #[should_panic(expected = "does not serialize")]
    fn test_filter_value_must_serialize() {
        let _ = Filter::new().field_eq("size", f64::NAN);
    }
}
