//! Admin authentication
//!
//! - [`JwtService`] - session token issue/validation
//! - [`CurrentUser`] - authenticated admin extracted from the token
//! - [`require_auth`] - middleware guarding writes and admin routes
//! - [`password`] - argon2 hashing

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, CurrentUser, IssuedToken, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, requires_auth};
