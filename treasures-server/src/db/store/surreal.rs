//! SurrealDB document store (embedded RocksDB)
//!
//! Each collection is a table; a record keeps the document body as a JSON
//! string next to its version. Writes go through one lock so the version
//! check and the write are atomic for the owning process (the embedded
//! engine is opened by exactly one process).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use tokio::sync::Mutex;

use super::{Document, DocumentStore, StoreError, StoreResult, sort_documents};

const NAMESPACE: &str = "treasures";
const DATABASE: &str = "storefront";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRow {
    key: String,
    body: String,
    version: u64,
    updated_at: i64,
}

impl StoredRow {
    fn into_document(self) -> StoreResult<Document> {
        Ok(Document {
            body: serde_json::from_str(&self.body)?,
            id: self.key,
            version: self.version,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SurrealDocumentStore {
    db: Surreal<Db>,
    write_lock: Arc<Mutex<()>>,
}

impl SurrealDocumentStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_string_lossy().into_owned();
        tracing::info!(path = %path, "Opening document database");
        let db = Surreal::new::<RocksDb>(path).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self::new(db))
    }

    /// Non-persistent engine, same semantics
    pub async fn in_memory() -> StoreResult<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self::new(db))
    }

    async fn read_row(&self, collection: &str, id: &str) -> StoreResult<Option<StoredRow>> {
        let row: Option<StoredRow> = self
            .db
            .select((collection.to_owned(), id.to_owned()))
            .await?;
        Ok(row)
    }

    async fn write_row(&self, collection: &str, id: &str, body: &Value, version: u64) -> StoreResult<()> {
        let row = StoredRow {
            key: id.to_owned(),
            body: serde_json::to_string(body)?,
            version,
            updated_at: shared::util::now_millis(),
        };
        let _: Option<StoredRow> = self
            .db
            .upsert((collection.to_owned(), id.to_owned()))
            .content(row)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SurrealDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.read_row(collection, id)
            .await?
            .map(StoredRow::into_document)
            .transpose()
    }

    async fn put(&self, collection: &str, id: &str, body: Value) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let current = self.read_row(collection, id).await?.map(|r| r.version).unwrap_or(0);
        let version = current + 1;
        self.write_row(collection, id, &body, version).await?;
        Ok(version)
    }

    async fn put_versioned(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: u64,
    ) -> StoreResult<u64> {
        let _guard = self.write_lock.lock().await;
        let current = self.read_row(collection, id).await?.map(|r| r.version).unwrap_or(0);
        if current != expected_version {
            return Err(StoreError::VersionConflict {
                collection: collection.to_string(),
                id: id.to_string(),
                expected: expected_version,
                actual: current,
            });
        }
        let version = current + 1;
        self.write_row(collection, id, &body, version).await?;
        Ok(version)
    }

    async fn list(&self, collection: &str, order_by: Option<&str>) -> StoreResult<Vec<Document>> {
        let rows: Vec<StoredRow> = self.db.select(collection.to_owned()).await?;
        let mut docs = rows
            .into_iter()
            .map(StoredRow::into_document)
            .collect::<StoreResult<Vec<_>>>()?;
        sort_documents(&mut docs, order_by);
        Ok(docs)
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        let removed: Option<StoredRow> = self
            .db
            .delete((collection.to_owned(), id.to_owned()))
            .await?;
        Ok(removed.is_some())
    }

    async fn batch_put(&self, collection: &str, docs: Vec<(String, Value)>) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        for (id, body) in docs {
            let current = self.read_row(collection, &id).await?.map(|r| r.version).unwrap_or(0);
            self.write_row(collection, &id, &body, current + 1).await?;
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.db.health().await?;
        Ok(())
    }
}
