//! Cover art normalization
//!
//! Thumbnails arrive in whatever format the catalog stores. Embedded covers are
//! always declared as `image/jpeg`, so they are re-encoded as baseline JPEG first.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use tracing::debug;

/// Maximum dimension for embedded cover art (width or height)
const MAX_COVER_SIZE: u32 = 1000;

/// JPEG quality (0-100)
const JPEG_QUALITY: u8 = 90;

/// Decode a thumbnail and re-encode it as a baseline JPEG that fits MAX_COVER_SIZE
pub fn normalize_cover_art(data: &[u8]) -> Result<Vec<u8>> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to guess image format")?
        .decode()
        .context("Failed to decode cover art")?;

    let img = resize_to_fit(img);

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY)
        .encode_image(&img.to_rgb8())
        .context("Failed to encode cover art as JPEG")?;

    debug!(
        "Normalized cover art: {}x{} -> {} bytes",
        img.width(),
        img.height(),
        output.len()
    );
    Ok(output)
}

/// Resize image to fit within MAX_COVER_SIZE while maintaining aspect ratio
fn resize_to_fit(img: DynamicImage) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= MAX_COVER_SIZE && height <= MAX_COVER_SIZE {
        return img;
    }

    debug!("Resizing cover art: {}x{}", width, height);
    img.resize(MAX_COVER_SIZE, MAX_COVER_SIZE, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_resize_small_image() {
        let img = DynamicImage::new_rgb8(100, 100);
        let resized = resize_to_fit(img);
        assert_eq!(resized.width(), 100);
        assert_eq!(resized.height(), 100);
    }

    #[test]
    fn test_resize_large_image() {
        let img = DynamicImage::new_rgb8(3000, 1500);
        let resized = resize_to_fit(img);
        assert_eq!(resized.width(), MAX_COVER_SIZE);
        assert_eq!(resized.height(), 500);
    }

    #[test]
    fn test_png_becomes_jpeg() {
        let jpeg = normalize_cover_art(&png_bytes(64, 64)).unwrap();
        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(normalize_cover_art(b"<html>not an image</html>").is_err());
    }
}
