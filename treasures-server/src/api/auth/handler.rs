//! Authentication Handlers

use std::time::Duration;

use axum::{Json, extract::State};

use crate::api::ok;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::security_log;
use shared::models::{AdminAccount, AdminInfo, Credentials, LoginResponse, SetupStatus};
use shared::{ApiResponse, AppError, AppResult};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

pub async fn setup_status(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<SetupStatus>>> {
    Ok(ok(SetupStatus {
        admin_exists: state.admins.exists().await?,
    }))
}

/// Create the first admin and log it in
pub async fn setup(
    State(state): State<ServerState>,
    Json(req): Json<Credentials>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let admin = state
        .admins
        .create_first(&req.email, &req.password)
        .await
        .inspect_err(|e| {
            security_log!("WARN", "setup_rejected", email = req.email.clone(), reason = e.message.clone())
        })?;
    security_log!("INFO", "admin_created", admin_id = admin.id.clone());
    Ok(ok(issue_token(&state, &admin)?))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<Credentials>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let admin = state.admins.find_by_email(&req.email).await?;

    // Fixed delay before checking the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // same error for unknown email and wrong password
    let admin = match admin {
        Some(a) if crate::auth::password::verify_password(&req.password, &a.password_hash) => a,
        Some(_) => {
            security_log!("WARN", "login_failed", email = req.email.clone(), reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", email = req.email.clone(), reason = "unknown_email");
            return Err(AppError::invalid_credentials());
        }
    };

    let response = issue_token(&state, &admin)?;
    tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin logged in");
    Ok(ok(response))
}

/// Session check: the admin behind the token
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<AdminInfo>>> {
    let admin = state.admins.get(&user.id).await?.ok_or_else(|| {
        security_log!("WARN", "session_orphaned", admin_id = user.id.clone());
        AppError::unauthorized()
    })?;
    Ok(ok(AdminInfo::from(&admin)))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(user: CurrentUser) -> Json<ApiResponse<()>> {
    tracing::info!(admin_id = %user.id, "Admin logged out");
    Json(ApiResponse::success_with_message("Logged out", ()))
}

fn issue_token(state: &ServerState, admin: &AdminAccount) -> AppResult<LoginResponse> {
    let issued = state
        .jwt_service()
        .generate_token(&admin.id, &admin.email, &admin.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;
    Ok(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        admin: AdminInfo::from(admin),
    })
}
