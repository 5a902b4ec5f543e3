//! In-memory document store (tests and `STORE_BACKEND=memory`)

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{Document, DocumentStore, StoreError, StoreResult, sort_documents};

#[derive(Debug, Clone)]
struct Entry {
    body: Value,
    version: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<DashMap<String, BTreeMap<String, Entry>>>,
    writes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes (puts and deletes) so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail with a database error
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Database("write rejected".to_string()));
        }
        Ok(())
    }

    fn write(&self, collection: &str, id: &str, body: Value, expected: Option<u64>) -> StoreResult<u64> {
        self.check_writable()?;
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        let current = docs.get(id).map(|e| e.version).unwrap_or(0);
        if let Some(expected) = expected
            && expected != current
        {
            return Err(StoreError::VersionConflict {
                collection: collection.to_string(),
                id: id.to_string(),
                expected,
                actual: current,
            });
        }
        let version = current + 1;
        docs.insert(id.to_string(), Entry { body, version });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.collections.get(collection).and_then(|docs| {
            docs.get(id).map(|e| Document {
                id: id.to_string(),
                body: e.body.clone(),
                version: e.version,
            })
        }))
    }

    async fn put(&self, collection: &str, id: &str, body: Value) -> StoreResult<u64> {
        self.write(collection, id, body, None)
    }

    async fn put_versioned(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: u64,
    ) -> StoreResult<u64> {
        self.write(collection, id, body, Some(expected_version))
    }

    async fn list(&self, collection: &str, order_by: Option<&str>) -> StoreResult<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, e)| Document {
                        id: id.clone(),
                        body: e.body.clone(),
                        version: e.version,
                    })
                    .collect()
            })
            .unwrap_or_default();
        sort_documents(&mut docs, order_by);
        Ok(docs)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.check_writable()?;
        let removed = self
            .collections
            .get_mut(collection)
            .and_then(|mut docs| docs.remove(id))
            .is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}
