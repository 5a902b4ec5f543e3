use thiserror::Error;

/// Startup and serving errors (the HTTP handlers use [`shared::AppError`])
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage initialization failed: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<shared::AppError> for ServerError {
    fn from(err: shared::AppError) -> Self {
        ServerError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
