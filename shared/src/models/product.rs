//! Product Model

use serde::{Deserialize, Serialize};

pub const PRODUCTS_COLLECTION: &str = "products";

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Image URLs, first one is the cover
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub amazon_link: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

/// Create or update payload
///
/// `id = None` creates a new product, `Some(id)` replaces the editable
/// fields of an existing one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub amazon_link: String,
}

/// Uploaded product image reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImageUpload {
    pub url: String,
    pub path: String,
    pub size: u64,
}
