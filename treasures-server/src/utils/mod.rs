//! Utilities: logging setup and image processing

pub mod imaging;
pub mod logger;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
