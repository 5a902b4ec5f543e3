use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::blob::{BlobStore, LocalBlobStore, MemoryBlobStore};
use crate::core::{Config, Result};
use crate::db::repository::{AdminRepository, ImageRepository, ProductRepository, SettingsRepository};
use crate::db::store::DocumentStore;
use crate::db::{StoreBackend, open_store};
use crate::message::ChangeBus;

/// Shared server state - cheap to clone, handed to every handler
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | store / blobs | storage backends |
/// | bus | change notifications (handlers + SSE) |
/// | settings / images / products / admins | repositories |
/// | jwt_service | session tokens |
/// | shutdown | cancelled when the server stops |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub bus: ChangeBus,
    pub settings: SettingsRepository,
    pub images: ImageRepository,
    pub products: ProductRepository,
    pub admins: AdminRepository,
    pub jwt_service: Arc<JwtService>,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Wire repositories onto existing stores
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        let bus = ChangeBus::new();
        bus.subscribe(|event| {
            tracing::info!(
                resource = %event.resource,
                action = %event.action,
                id = ?event.id,
                version = event.version,
                "Resource changed"
            )
        })
        .detach();
        let compress = config.compress_uploads;
        Self {
            settings: SettingsRepository::new(Arc::clone(&store), bus.clone()),
            images: ImageRepository::new(Arc::clone(&store), Arc::clone(&blobs), bus.clone(), compress),
            products: ProductRepository::new(Arc::clone(&store), Arc::clone(&blobs), bus.clone(), compress),
            admins: AdminRepository::new(Arc::clone(&store)),
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            shutdown: CancellationToken::new(),
            config,
            store,
            blobs,
            bus,
        }
    }

    /// Open the configured stores under the work directory and make sure
    /// the settings document exists.
    pub async fn initialize(config: &Config) -> Result<Self> {
        let (store, blobs): (Arc<dyn DocumentStore>, Arc<dyn BlobStore>) = match config.store_backend {
            StoreBackend::Memory => (
                open_store(StoreBackend::Memory, &config.database_path()).await?,
                Arc::new(MemoryBlobStore::with_base_url(&config.public_base_url)),
            ),
            StoreBackend::Surreal => {
                let db_path = config.database_path();
                if let Some(parent) = db_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let uploads = config.uploads_dir();
                std::fs::create_dir_all(&uploads)?;
                (
                    open_store(StoreBackend::Surreal, &db_path).await?,
                    Arc::new(LocalBlobStore::new(uploads, config.public_base_url.clone())),
                )
            }
        };

        let state = Self::new(config.clone(), store, blobs);
        state.settings.get().await?;
        tracing::info!(backend = ?config.store_backend, "Server state initialized");
        Ok(state)
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}
