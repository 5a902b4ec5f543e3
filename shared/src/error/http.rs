//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::ImageNotFound | Self::ProductNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::AdminAlreadyExists | Self::SettingsConflict => {
                StatusCode::CONFLICT
            }

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::ImageTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ImageUnsupportedType => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            Self::InternalError
            | Self::DatabaseError
            | Self::StorageError
            | Self::ConfigError
            | Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 for validation and business rule errors
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
