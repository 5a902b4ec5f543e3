//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token even though they are not GET
const PUBLIC_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/setup"];

/// Whether a request needs a valid session token.
///
/// Storefront reads are public; every write under `/api/`, everything
/// under `/api/admin/`, and the session check need a token.
pub fn requires_auth(method: &Method, path: &str) -> bool {
    if method == Method::OPTIONS || !path.starts_with("/api/") {
        return false;
    }
    if PUBLIC_ROUTES.contains(&path) {
        return false;
    }
    if path.starts_with("/api/admin/") || path == "/api/auth/me" {
        return true;
    }
    !(method == Method::GET || method == Method::HEAD)
}

/// Validate `Authorization: Bearer <token>` on protected routes and put
/// the [`CurrentUser`] into the request extensions.
///
/// | Failure | Error |
/// |---------|-------|
/// | no header | `NotAuthenticated` (401) |
/// | expired | `TokenExpired` (401) |
/// | anything else | `TokenInvalid` (401) |
/// | role other than admin | `PermissionDenied` (403) |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !requires_auth(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().path().to_string());
            return Err(AppError::unauthorized());
        }
    };

    match state.jwt_service().validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            if !user.is_admin() {
                security_log!("WARN", "role_denied", admin_id = user.id.clone(), role = user.role.clone());
                return Err(AppError::forbidden("Admin role required"));
            }
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().path().to_string()
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_reads() {
        assert!(!requires_auth(&Method::GET, "/api/settings"));
        assert!(!requires_auth(&Method::GET, "/api/images/selected"));
        assert!(!requires_auth(&Method::GET, "/api/products"));
        assert!(!requires_auth(&Method::GET, "/api/events"));
        assert!(!requires_auth(&Method::GET, "/health"));
        assert!(!requires_auth(&Method::OPTIONS, "/api/settings"));
    }

    #[test]
    fn test_writes_need_token() {
        assert!(requires_auth(&Method::PATCH, "/api/settings"));
        assert!(requires_auth(&Method::POST, "/api/images"));
        assert!(requires_auth(&Method::DELETE, "/api/products/1"));
        assert!(requires_auth(&Method::POST, "/api/auth/logout"));
    }

    #[test]
    fn test_special_routes() {
        assert!(!requires_auth(&Method::POST, "/api/auth/login"));
        assert!(!requires_auth(&Method::POST, "/api/auth/setup"));
        assert!(!requires_auth(&Method::GET, "/api/auth/setup"));
        assert!(requires_auth(&Method::GET, "/api/auth/me"));
        assert!(requires_auth(&Method::GET, "/api/admin/products"));
    }
}
