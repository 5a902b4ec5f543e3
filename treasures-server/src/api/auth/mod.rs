//! Authentication Routes
//!
//! - /api/auth/setup (GET, POST): public while no admin exists
//! - /api/auth/login: public
//! - /api/auth/me, /api/auth/logout: token required (global middleware)

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/setup", get(handler::setup_status).post(handler::setup))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
}
