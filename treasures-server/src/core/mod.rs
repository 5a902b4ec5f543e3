//! Core - configuration, shared state and the HTTP server
//!
//! - [`Config`] - environment configuration
//! - [`ServerState`] - stores, repositories and services shared by handlers
//! - [`Server`] - HTTP server with graceful shutdown
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
