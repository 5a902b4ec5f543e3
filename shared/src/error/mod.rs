//! Unified error system for the storefront
//!
//! - [`ErrorCode`]: standardized error codes
//! - [`ErrorCategory`]: classification of errors by code range
//! - [`AppError`]: error with code, message and details
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Settings errors
//! - 4xxx: Image errors
//! - 6xxx: Product errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::ImageNotFound);
//! let err = AppError::validation("Product name is required")
//!     .with_detail("field", "name");
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(ErrorCode::ValidationFailed.code()));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
