//! Settings API
//!
//! | Path | Method | Auth |
//! |------|--------|------|
//! | /api/settings | GET | none |
//! | /api/settings | PATCH | admin |
//! | /api/settings/field | POST | admin |
//! | /api/slider | GET | none |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/settings", get(handler::get).patch(handler::update))
        .route("/api/settings/field", post(handler::update_field))
        .route("/api/slider", get(handler::slider))
}
