use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::db::StoreBackend;

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | database, uploads and logs live here |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | default tracing level (`RUST_LOG` wins) |
/// | STORE_BACKEND | surreal | `surreal` or `memory` |
/// | PUBLIC_BASE_URL | (empty) | prefix for blob URLs, empty for relative |
/// | COMPRESS_UPLOADS | true | re-encode uploads as JPEG ≤ 1 MB |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown window |
/// | JWT_* | | see [`JwtConfig::from_env`] |
///
/// ```ignore
/// WORK_DIR=/srv/treasures HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub store_backend: StoreBackend,
    pub public_base_url: String,
    pub compress_uploads: bool,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self, crate::core::ServerError> {
        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value
                .parse()
                .map_err(|e: shared::AppError| crate::core::ServerError::Config(e.message))?,
            Err(_) => StoreBackend::Surreal,
        };
        let jwt = JwtConfig::from_env().map_err(|e| crate::core::ServerError::Config(e.to_string()))?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            jwt,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            store_backend,
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or_default(),
            compress_uploads: env_parse("COMPRESS_UPLOADS", true),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS", 30000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS", 10000),
        })
    }

    /// In-memory configuration for tests: memory store, random JWT secret
    pub fn for_testing(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            jwt: JwtConfig::ephemeral(),
            environment: "test".into(),
            log_level: "debug".into(),
            store_backend: StoreBackend::Memory,
            public_base_url: String::new(),
            compress_uploads: true,
            request_timeout_ms: 30000,
            shutdown_timeout_ms: 1000,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("store.db")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
