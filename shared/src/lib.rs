//! Shared types for The Homely Treasures storefront
//!
//! Models, error codes, response envelope and change events used by the
//! server crate and by anything that talks to its HTTP API.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{ChangeAction, ChangeEvent, ResourceKind};
