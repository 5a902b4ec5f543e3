//! Settings API Handlers

use axum::{Json, extract::State};
use serde_json::Value;

use crate::api::ok;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::models::{SettingChange, SettingsDocument, SliderView};
use shared::{ApiResponse, AppResult};

/// Current settings, default-filled
pub async fn get(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<SettingsDocument>>> {
    Ok(ok(state.settings.get().await?))
}

/// Merge a partial settings document
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(patch): Json<Value>,
) -> AppResult<Json<ApiResponse<SettingsDocument>>> {
    let settings = state.settings.update(&patch).await?;
    tracing::info!(admin = %user.email, "Settings patched");
    Ok(ok(settings))
}

/// Single-field edit from the admin form
pub async fn update_field(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(change): Json<SettingChange>,
) -> AppResult<Json<ApiResponse<SettingsDocument>>> {
    let settings = state.settings.apply_change(&change).await?;
    tracing::info!(
        admin = %user.email,
        section = ?change.section,
        subsection = ?change.subsection,
        key = %change.key,
        "Setting changed"
    );
    Ok(ok(settings))
}

/// Everything the slider needs in one request
pub async fn slider(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<SliderView>>> {
    let settings = state.settings.get().await?;
    let images = state.images.list_selected().await?;
    Ok(ok(SliderView { settings, images }))
}
