//! Slider Image Model

use serde::{Deserialize, Serialize};

/// Collection holding every uploaded slider image
pub const ALL_IMAGES_COLLECTION: &str = "slider_images";
/// Collection holding the images currently shown in the slider
pub const SELECTED_IMAGES_COLLECTION: &str = "selected_images";
/// Maximum number of slider images
pub const MAX_IMAGES: usize = 10;

/// Pixel dimensions of a stored image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Slider image record
///
/// The same shape is stored in both the all-images and the selected-images
/// collections; a selected entry mirrors the all-images record with the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: String,
    /// Blob storage path
    pub path: String,
    /// Public URL
    pub url: String,
    /// 1-based display position
    pub order: u32,
    pub created_at: i64,
    pub file_name: String,
    /// Stored size in bytes (after compression)
    pub size: u64,
    pub original_size: u64,
    pub dimensions: Dimensions,
}

/// Direction for moving one image in the slider order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Reorder payload: every image id in the new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<String>,
}

/// Result of toggling an image in or out of the slider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionState {
    pub id: String,
    pub selected: bool,
    pub selected_count: usize,
}
