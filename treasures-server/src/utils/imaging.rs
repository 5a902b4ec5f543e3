//! Image upload validation and compression
//!
//! Uploads must be `image/*`, at most 5MB and decodable. With compression on,
//! the image is scaled so its longest side is at most 1920px and re-encoded
//! as JPEG, lowering the quality until it fits in 1MB.

use std::io::Cursor;

use image::DynamicImage;
use image::imageops::FilterType;
use shared::models::Dimensions;
use shared::{AppError, AppResult, ErrorCode};

/// Maximum accepted upload size (5MB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Compression target size (1MB)
pub const COMPRESSION_TARGET_BYTES: usize = 1024 * 1024;
/// Longest side after compression
pub const MAX_DIMENSION: u32 = 1920;

const INITIAL_QUALITY: u8 = 85;
const MIN_QUALITY: u8 = 45;
const QUALITY_STEP: u8 = 10;
/// Stop downscaling below this longest side
const MIN_DIMENSION: u32 = 320;

/// Raw upload as received from the client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Image ready to be stored
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub extension: &'static str,
    pub dimensions: Dimensions,
    pub original_size: u64,
}

/// Check type and size before anything is decoded or uploaded
pub fn validate_upload(upload: &ImageUpload) -> AppResult<()> {
    let mime = normalized_mime(&upload.content_type);
    if !mime.starts_with("image/") {
        return Err(AppError::with_message(
            ErrorCode::ImageUnsupportedType,
            format!("Only image files are allowed (got '{}')", upload.content_type),
        )
        .with_detail("content_type", upload.content_type.clone()));
    }
    if upload.bytes.is_empty() {
        return Err(AppError::validation("Empty file provided"));
    }
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::with_message(
            ErrorCode::ImageTooLarge,
            format!(
                "File too large. Maximum size is {}MB",
                MAX_UPLOAD_BYTES / 1024 / 1024
            ),
        )
        .with_detail("max_bytes", MAX_UPLOAD_BYTES as u64)
        .with_detail("size", upload.bytes.len() as u64));
    }
    Ok(())
}

/// Validate, decode and (optionally) compress an upload
pub fn process_upload(upload: ImageUpload, compress: bool) -> AppResult<ProcessedImage> {
    validate_upload(&upload)?;

    let img = image::load_from_memory(&upload.bytes).map_err(|e| {
        AppError::with_message(ErrorCode::ImageDecodeFailed, format!("Invalid image: {}", e))
    })?;
    let original_size = upload.bytes.len() as u64;

    if !compress {
        let extension = image::guess_format(&upload.bytes)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("img");
        return Ok(ProcessedImage {
            dimensions: dimensions_of(&img),
            content_type: normalized_mime(&upload.content_type),
            extension,
            bytes: upload.bytes,
            original_size,
        });
    }

    let (img, bytes) = compress_image(img)?;
    tracing::debug!(
        file_name = %upload.file_name,
        original_size,
        compressed_size = bytes.len(),
        width = img.width(),
        height = img.height(),
        "Image compressed"
    );

    Ok(ProcessedImage {
        dimensions: dimensions_of(&img),
        content_type: "image/jpeg".to_string(),
        extension: "jpg",
        bytes,
        original_size,
    })
}

fn compress_image(img: DynamicImage) -> AppResult<(DynamicImage, Vec<u8>)> {
    let mut img = fit_within(img, MAX_DIMENSION);
    loop {
        let mut quality = INITIAL_QUALITY;
        let mut bytes = encode_jpeg(&img, quality)?;
        while bytes.len() > COMPRESSION_TARGET_BYTES && quality > MIN_QUALITY {
            quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
            bytes = encode_jpeg(&img, quality)?;
        }

        let longest = img.width().max(img.height());
        if bytes.len() <= COMPRESSION_TARGET_BYTES || longest <= MIN_DIMENSION {
            return Ok((img, bytes));
        }
        img = fit_within(img, longest * 3 / 4);
    }
}

fn fit_within(img: DynamicImage, max_side: u32) -> DynamicImage {
    if img.width().max(img.height()) <= max_side {
        return img;
    }
    img.resize(max_side, max_side, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality);
    img.to_rgb8()
        .write_with_encoder(encoder)
        .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    Ok(buffer)
}

fn dimensions_of(img: &DynamicImage) -> Dimensions {
    Dimensions {
        width: img.width(),
        height: img.height(),
    }
}

fn normalized_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
pub(crate) mod test_images {
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// PNG of the given size with a simple gradient
    pub fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode test png");
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, bytes: Vec<u8>) -> ImageUpload {
        ImageUpload {
            file_name: "photo.png".to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    #[test]
    fn test_rejects_non_image_type() {
        let err = validate_upload(&upload("application/pdf", vec![1, 2, 3])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageUnsupportedType);
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let err = validate_upload(&upload("image/png", vec![0; MAX_UPLOAD_BYTES + 1])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageTooLarge);
        assert!(err.details.unwrap().contains_key("max_bytes"));
    }

    #[test]
    fn test_accepts_exactly_max_size() {
        assert!(validate_upload(&upload("image/jpeg", vec![0; MAX_UPLOAD_BYTES])).is_ok());
    }

    #[test]
    fn test_mime_parameters_and_case_are_ignored() {
        assert!(validate_upload(&upload("IMAGE/PNG; charset=binary", vec![1])).is_ok());
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = process_upload(upload("image/png", vec![1, 2, 3, 4]), true).unwrap_err();
        assert_eq!(err.code, ErrorCode::ImageDecodeFailed);
    }

    #[test]
    fn test_compression_outputs_jpeg() {
        let processed = process_upload(upload("image/png", test_images::png(64, 32)), true).unwrap();
        assert_eq!(processed.content_type, "image/jpeg");
        assert_eq!(processed.extension, "jpg");
        assert_eq!(processed.dimensions, Dimensions { width: 64, height: 32 });
        assert_eq!(image::guess_format(&processed.bytes).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_compression_limits_longest_side() {
        let processed = process_upload(upload("image/png", test_images::png(2400, 600)), true).unwrap();
        assert_eq!(processed.dimensions.width, MAX_DIMENSION);
        assert_eq!(processed.dimensions.height, 480);
        assert!(processed.bytes.len() <= COMPRESSION_TARGET_BYTES);
    }

    #[test]
    fn test_without_compression_bytes_are_kept() {
        let bytes = test_images::png(10, 10);
        let processed = process_upload(upload("image/png", bytes.clone()), false).unwrap();
        assert_eq!(processed.bytes, bytes);
        assert_eq!(processed.extension, "png");
        assert_eq!(processed.content_type, "image/png");
        assert_eq!(processed.original_size, bytes.len() as u64);
    }
}
