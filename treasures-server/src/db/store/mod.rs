//! Document Store
//!
//! Collections of JSON documents addressed by `(collection, id)`. The store
//! never merges: callers compute the full document and overwrite it.
//! Every document carries a version that increases on each write, which
//! [`DocumentStore::put_versioned`] uses for optimistic concurrency.

mod memory;
mod surreal;

pub use memory::MemoryDocumentStore;
pub use surreal::SurrealDocumentStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::AppError;
use std::cmp::Ordering;
use thiserror::Error;

/// Storage error types (documents and blobs)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Version conflict on {collection}/{id}: expected {expected}, found {actual}")]
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { collection, id, .. } => {
                tracing::warn!(collection = %collection, id = %id, "Concurrent write rejected");
                AppError::conflict(format!("{collection}/{id} was modified concurrently"))
            }
            StoreError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database(msg)
            }
            StoreError::Serialization(e) => {
                tracing::error!(error = %e, "Stored document could not be decoded");
                AppError::database(format!("Invalid stored document: {e}"))
            }
            StoreError::Io(e) => {
                tracing::error!(error = %e, "Storage I/O error");
                AppError::storage(e.to_string())
            }
            StoreError::InvalidPath(path) => AppError::invalid_request(format!("Invalid path: {path}")),
        }
    }
}

/// A stored document with its current version
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
    pub version: u64,
}

impl Document {
    /// Decode the body into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Unconditional overwrite; returns the new version
    async fn put(&self, collection: &str, id: &str, body: Value) -> StoreResult<u64>;

    /// Overwrite only if the stored version equals `expected_version`
    /// (0 means the document must not exist yet); returns the new version
    async fn put_versioned(
        &self,
        collection: &str,
        id: &str,
        body: Value,
        expected_version: u64,
    ) -> StoreResult<u64>;

    /// All documents of a collection, sorted by a top-level body field
    /// (or by id when `order_by` is `None`)
    async fn list(&self, collection: &str, order_by: Option<&str>) -> StoreResult<Vec<Document>>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Write several documents of one collection. Not atomic: a failure
    /// leaves the earlier writes in place.
    async fn batch_put(&self, collection: &str, docs: Vec<(String, Value)>) -> StoreResult<()> {
        for (id, body) in docs {
            self.put(collection, &id, body).await?;
        }
        Ok(())
    }

    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Sort documents by a top-level field of their body.
///
/// Numbers compare numerically, strings lexically; documents without the
/// field go last. Ties (and `None`) fall back to the id.
pub(crate) fn sort_documents(docs: &mut [Document], order_by: Option<&str>) {
    docs.sort_by(|a, b| {
        let by_field = match order_by {
            Some(field) => compare_field(a.body.get(field), b.body.get(field)),
            None => Ordering::Equal,
        };
        by_field.then_with(|| a.id.cmp(&b.id))
    });
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
