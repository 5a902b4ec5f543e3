//! The Homely Treasures - storefront backend
//!
//! Serves the home page slider settings, the slider images and the product
//! catalogue, and notifies open admin/storefront pages when any of them
//! change.
//!
//! ```text
//! treasures-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, argon2, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # document stores and repositories
//! ├── blob/          # image byte storage
//! ├── message/       # change notification bus
//! └── utils/         # logging, image processing
//! ```

pub mod api;
pub mod auth;
pub mod blob;
pub mod core;
pub mod db;
pub mod message;
pub mod utils;

// Re-exports
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{ChangeBus, Subscription};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// Security event on the `security` target (kept in its own log file)
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        )
    }};
}

/// Load `.env`, prepare the work directory and start logging.
///
/// Reads `WORK_DIR`, `LOG_LEVEL` and `ENVIRONMENT` directly so logging is
/// up before the rest of the configuration is parsed.
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let production = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");

    let log_dir = std::path::Path::new(&work_dir).join("logs");
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(&log_level, production, log_dir.to_str())?;
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  _____
 |_   _| __ ___  __ _ ___ _   _ _ __ ___  ___
   | || '__/ _ \/ _` / __| | | | '__/ _ \/ __|
   | || | |  __/ (_| \__ \ |_| | | |  __/\__ \
   |_||_|  \___|\__,_|___/\__,_|_|  \___||___/
        The Homely Treasures storefront
    "#
    );
}
