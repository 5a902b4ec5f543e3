//! HTTP API
//!
//! - [`health`] - liveness and store check
//! - [`settings`] - slider/storefront settings and the slider view
//! - [`images`] - slider image upload, order and selection
//! - [`products`] - product catalogue
//! - [`auth`] - first-run setup, login, session check
//! - [`events`] - server-sent change events
//! - [`blob`] - serves stored images

pub mod auth;
pub mod blob;
pub mod events;
pub mod health;
pub mod images;
pub mod products;
pub mod settings;

use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::{Json, Router};
use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::require_auth;
use crate::core::ServerState;
use crate::utils::imaging::{ImageUpload, MAX_UPLOAD_BYTES};
use shared::{ApiResponse, AppError, AppResult};

/// Request body limit: one maximal image plus multipart overhead
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Success envelope
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

/// All routes, without middleware or state
///
/// Everything except the event stream runs under the request timeout.
pub fn build_router(request_timeout: Duration) -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(settings::router())
        .merge(images::router())
        .merge(products::router())
        .merge(auth::router())
        .merge(blob::router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .merge(events::router())
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: &ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router(Duration::from_millis(state.config.request_timeout_ms))
        .layer(axum::middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state.clone())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
        .layer(CorsLayer::permissive())
}

/// Read the `file` field of a multipart upload
pub(crate) async fn read_image_field(mut multipart: Multipart) -> AppResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
            .to_vec();
        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(AppError::with_message(
        shared::ErrorCode::RequiredField,
        "No 'file' field found. Field name must be 'file'",
    ))
}
