//! Error codes shared by the server and its API consumers
//!
//! Codes are grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Settings errors
//! - 4xxx: Image errors
//! - 6xxx: Product errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare u16 so that the admin UI can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Admin is not authenticated
    NotAuthenticated = 1001,
    /// Invalid email/password
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// An admin account already exists
    AdminAlreadyExists = 1005,
    /// Password too short
    PasswordTooShort = 1006,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Settings ====================
    /// Settings were changed concurrently since they were read
    SettingsConflict = 3001,
    /// Settings patch does not fit the settings schema
    SettingsInvalid = 3002,

    // ==================== 4xxx: Image ====================
    /// Image not found
    ImageNotFound = 4001,
    /// Image exceeds the size limit
    ImageTooLarge = 4002,
    /// MIME type is not an accepted image type
    ImageUnsupportedType = 4003,
    /// The slider already holds the maximum number of images
    ImageLimitReached = 4004,
    /// The last selected image cannot be deselected
    LastSelectedImage = 4005,
    /// The bytes could not be decoded as an image
    ImageDecodeFailed = 4006,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product name is required
    ProductNameRequired = 6002,
    /// Product needs at least one image
    ProductImageRequired = 6003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Blob storage error
    StorageError = 9003,
    /// Configuration error
    ConfigError = 9004,
}

impl ErrorCode {
    /// Numeric value of this code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Whether this code represents success
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid token",
            Self::AdminAlreadyExists => "An admin account already exists",
            Self::PasswordTooShort => "Password is too short",

            Self::PermissionDenied => "Permission denied",

            Self::SettingsConflict => "Settings were modified concurrently, reload and retry",
            Self::SettingsInvalid => "Settings update does not match the settings schema",

            Self::ImageNotFound => "Image not found",
            Self::ImageTooLarge => "Image is too large",
            Self::ImageUnsupportedType => "Unsupported image type",
            Self::ImageLimitReached => "Maximum number of images reached",
            Self::LastSelectedImage => "At least one image must remain selected",
            Self::ImageDecodeFailed => "File is not a readable image",

            Self::ProductNotFound => "Product not found",
            Self::ProductNameRequired => "Product name is required",
            Self::ProductImageRequired => "At least one product image is required",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::StorageError => "Storage error",
            Self::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1005 => Self::AdminAlreadyExists,
            1006 => Self::PasswordTooShort,

            2001 => Self::PermissionDenied,

            3001 => Self::SettingsConflict,
            3002 => Self::SettingsInvalid,

            4001 => Self::ImageNotFound,
            4002 => Self::ImageTooLarge,
            4003 => Self::ImageUnsupportedType,
            4004 => Self::ImageLimitReached,
            4005 => Self::LastSelectedImage,
            4006 => Self::ImageDecodeFailed,

            6001 => Self::ProductNotFound,
            6002 => Self::ProductNameRequired,
            6003 => Self::ProductImageRequired,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::StorageError,
            9004 => Self::ConfigError,

            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::SettingsConflict.code(), 3001);
        assert_eq!(ErrorCode::ImageLimitReached.code(), 4004);
        assert_eq!(ErrorCode::ProductNameRequired.code(), 6002);
        assert_eq!(ErrorCode::StorageError.code(), 9003);
    }

    #[test]
    fn test_try_from_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::AdminAlreadyExists,
            ErrorCode::PasswordTooShort,
            ErrorCode::PermissionDenied,
            ErrorCode::SettingsConflict,
            ErrorCode::SettingsInvalid,
            ErrorCode::ImageNotFound,
            ErrorCode::ImageTooLarge,
            ErrorCode::ImageUnsupportedType,
            ErrorCode::ImageLimitReached,
            ErrorCode::LastSelectedImage,
            ErrorCode::ImageDecodeFailed,
            ErrorCode::ProductNotFound,
            ErrorCode::ProductNameRequired,
            ErrorCode::ProductImageRequired,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::StorageError,
            ErrorCode::ConfigError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(9999), Err(InvalidErrorCode(9999)));
        assert_eq!(InvalidErrorCode(42).to_string(), "invalid error code: 42");
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::LastSelectedImage).unwrap();
        assert_eq!(json, "4005");
        let code: ErrorCode = serde_json::from_str("6001").unwrap();
        assert_eq!(code, ErrorCode::ProductNotFound);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::ImageTooLarge.to_string(), "E4002");
    }
}
