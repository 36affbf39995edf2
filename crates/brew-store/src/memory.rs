//! # In-Memory Document Store
//!
//! The reference [`DocumentStore`] backend: a `HashMap` of versioned JSON
//! values behind an async `RwLock`. Used by tests and single-register
//! deployments that keep their working set in process.
//!
//! Commit takes the write lock once, verifies **every** assertion, and
//! only then applies writes. A failed verification applies nothing, which
//! is what makes multi-document reservations all-or-nothing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Version, VersionedDocument};
use crate::error::{StoreError, StoreResult};
use crate::path::{CollectionPath, DocumentPath};
use crate::store::{CommitSet, DocumentStore};

#[derive(Debug, Clone)]
struct StoredDocument {
    version: Version,
    value: serde_json::Value,
}

/// In-memory versioned document store.
///
/// Cloning is cheap and shares the underlying documents, so a test can
/// hold one handle while the engine holds another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<DocumentPath, StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Inserts or replaces a document at version 1, bypassing conflict
    /// checks. Fixture setup only; production writes go through
    /// [`DocumentStore::commit`] or [`DocumentStore::create`].
    pub async fn seed(&self, path: DocumentPath, value: serde_json::Value) {
        let mut documents = self.documents.write().await;
        documents.insert(path, StoredDocument { version: 1, value });
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn snapshot(&self, paths: &[DocumentPath]) -> StoreResult<Vec<Option<VersionedDocument>>> {
        let documents = self.documents.read().await;
        Ok(paths
            .iter()
            .map(|path| {
                documents.get(path).map(|stored| VersionedDocument {
                    path: path.clone(),
                    version: stored.version,
                    value: stored.value.clone(),
                })
            })
            .collect())
    }

    async fn commit(&self, set: CommitSet) -> StoreResult<()> {
        let mut documents = self.documents.write().await;

        // Phase 1: verify every assertion before touching anything.
        for assertion in &set.assertions {
            let current = documents.get(&assertion.path).map(|d| d.version);
            if current != assertion.version {
                debug!(
                    path = %assertion.path,
                    expected = ?assertion.version,
                    actual = ?current,
                    "commit conflict"
                );
                return Err(StoreError::Conflict {
                    path: assertion.path.to_string(),
                });
            }
        }

        // Phase 2: apply all writes under the same lock.
        for write in set.writes {
            match documents.get_mut(&write.path) {
                Some(stored) => {
                    stored.version += 1;
                    stored.value = write.value;
                }
                None => {
                    documents.insert(
                        write.path,
                        StoredDocument {
                            version: 1,
                            value: write.value,
                        },
                    );
                }
            }
        }

        Ok(())
    }

    async fn create(&self, path: &DocumentPath, value: serde_json::Value) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        documents.insert(path.clone(), StoredDocument { version: 1, value });
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> StoreResult<Vec<VersionedDocument>> {
        let documents = self.documents.read().await;
        let mut matching: Vec<VersionedDocument> = documents
            .iter()
            .filter(|(path, _)| path.collection() == collection)
            .map(|(path, stored)| VersionedDocument {
                path: path.clone(),
                version: stored.version,
                value: stored.value.clone(),
            })
            .collect();
        matching.sort_by(|a, b| a.path.id().cmp(b.path.id()));
        Ok(matching)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentWrite, ReadAssertion};
    use serde_json::json;

    fn ingredients() -> CollectionPath {
        CollectionPath::new("shops/s1/ingredients")
    }

    #[tokio::test]
    async fn test_snapshot_missing_document_is_none() {
        let store = MemoryStore::new();
        let docs = store.snapshot(&[ingredients().doc("nope")]).await.unwrap();
        assert_eq!(docs, vec![None]);
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let path = ingredients().doc("milk");
        store.create(&path, json!({ "used": 0.0 })).await.unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.value["used"], 0.0);
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = MemoryStore::new();
        let path = ingredients().doc("milk");
        store.create(&path, json!({})).await.unwrap();

        let err = store.create(&path, json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_commit_bumps_version() {
        let store = MemoryStore::new();
        let path = ingredients().doc("milk");
        store.seed(path.clone(), json!({ "used": 0.0 })).await;

        store
            .commit(CommitSet {
                assertions: vec![ReadAssertion {
                    path: path.clone(),
                    version: Some(1),
                }],
                writes: vec![DocumentWrite {
                    path: path.clone(),
                    value: json!({ "used": 250.0 }),
                }],
            })
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.version, 2);
        assert_eq!(doc.value["used"], 250.0);
    }

    #[tokio::test]
    async fn test_commit_with_stale_version_conflicts() {
        let store = MemoryStore::new();
        let path = ingredients().doc("milk");
        store.seed(path.clone(), json!({ "used": 0.0 })).await;

        // Someone else commits first.
        store
            .commit(CommitSet {
                assertions: vec![ReadAssertion {
                    path: path.clone(),
                    version: Some(1),
                }],
                writes: vec![DocumentWrite {
                    path: path.clone(),
                    value: json!({ "used": 100.0 }),
                }],
            })
            .await
            .unwrap();

        // Our assertion still says version 1.
        let err = store
            .commit(CommitSet {
                assertions: vec![ReadAssertion {
                    path: path.clone(),
                    version: Some(1),
                }],
                writes: vec![DocumentWrite {
                    path: path.clone(),
                    value: json!({ "used": 50.0 }),
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { .. }));
        // Loser's write did not land.
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc.value["used"], 100.0);
    }

    #[tokio::test]
    async fn test_commit_asserting_absence_conflicts_when_present() {
        let store = MemoryStore::new();
        let path = ingredients().doc("milk");
        store.seed(path.clone(), json!({})).await;

        let err = store
            .commit(CommitSet {
                assertions: vec![ReadAssertion {
                    path: path.clone(),
                    version: None,
                }],
                writes: vec![DocumentWrite {
                    path,
                    value: json!({}),
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_failed_commit_applies_no_writes() {
        let store = MemoryStore::new();
        let milk = ingredients().doc("milk");
        let beans = ingredients().doc("beans");
        store.seed(milk.clone(), json!({ "used": 0.0 })).await;
        store.seed(beans.clone(), json!({ "used": 0.0 })).await;

        // Milk assertion is fine, beans is stale: neither write may land.
        let err = store
            .commit(CommitSet {
                assertions: vec![
                    ReadAssertion {
                        path: milk.clone(),
                        version: Some(1),
                    },
                    ReadAssertion {
                        path: beans.clone(),
                        version: Some(7),
                    },
                ],
                writes: vec![
                    DocumentWrite {
                        path: milk.clone(),
                        value: json!({ "used": 300.0 }),
                    },
                    DocumentWrite {
                        path: beans.clone(),
                        value: json!({ "used": 18.0 }),
                    },
                ],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict { .. }));
        let milk_doc = store.get(&milk).await.unwrap().unwrap();
        let beans_doc = store.get(&beans).await.unwrap().unwrap();
        assert_eq!(milk_doc.value["used"], 0.0);
        assert_eq!(beans_doc.value["used"], 0.0);
        assert_eq!(milk_doc.version, 1);
        assert_eq!(beans_doc.version, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts_by_id() {
        let store = MemoryStore::new();
        store.seed(ingredients().doc("milk"), json!({})).await;
        store.seed(ingredients().doc("beans"), json!({})).await;
        store
            .seed(CollectionPath::new("shops/s2/ingredients").doc("milk"), json!({}))
            .await;

        let docs = store.list(&ingredients()).await.unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.path.id()).collect();
        assert_eq!(ids, vec!["beans", "milk"]);
    }
}
