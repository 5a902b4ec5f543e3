//! Data models shared between the server and API consumers

pub mod admin;
pub mod image;
pub mod product;
pub mod settings;

pub use admin::*;
pub use image::*;
pub use product::*;
pub use settings::*;
