//! Database Module
//!
//! Document store backends and the repositories built on top of them

pub mod repository;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use shared::{AppError, AppResult};

use store::{DocumentStore, MemoryDocumentStore, SurrealDocumentStore};

/// Which document store backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Embedded SurrealDB (RocksDB) under `<work_dir>/database`
    Surreal,
    /// Process memory, lost on restart
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surreal" | "surrealdb" | "rocksdb" => Ok(Self::Surreal),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(AppError::with_message(
                shared::ErrorCode::ConfigError,
                format!("Unknown STORE_BACKEND '{}'", other),
            )),
        }
    }
}

/// Open the configured document store
pub async fn open_store(backend: StoreBackend, db_path: &Path) -> AppResult<Arc<dyn DocumentStore>> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store, data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Surreal => {
            Ok(Arc::new(SurrealDocumentStore::open(db_path).await?))
        }
    }
}
