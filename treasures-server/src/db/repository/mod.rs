//! Repository Module
//!
//! Typed access to the document and blob stores. Every mutating operation
//! persists first and publishes a change event only after it succeeded.

// Storefront
pub mod image;
pub mod product;
pub mod settings;
mod settings_patch;

// Auth
pub mod admin;

// Re-exports
pub use admin::AdminRepository;
pub use image::ImageRepository;
pub use product::ProductRepository;
pub use settings::SettingsRepository;
pub use settings_patch::normalize_patch;
