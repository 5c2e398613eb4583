//! Utility functions for loading and decoding images.

use crate::core::errors::{DetectError, DetectResult};
use image::{DynamicImage, RgbImage};

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns [`DetectError::InvalidImage`] if the file cannot be opened or
/// decoded as an image.
pub fn load_image(path: &std::path::Path) -> DetectResult<RgbImage> {
    let img = image::open(path).map_err(DetectError::InvalidImage)?;
    Ok(dynamic_to_rgb(img))
}

/// Decodes an in-memory encoded image (PNG, JPEG, ...) to RgbImage.
///
/// # Errors
///
/// Returns [`DetectError::InvalidImage`] if the bytes are not a decodable
/// image.
pub fn decode_image(bytes: &[u8]) -> DetectResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(DetectError::InvalidImage)?;
    Ok(dynamic_to_rgb(img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    #[test]
    fn decodes_png_bytes() {
        let img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn garbage_bytes_are_invalid_image() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(matches!(err, DetectError::InvalidImage(_)));
    }

    #[test]
    fn missing_file_is_invalid_image() {
        let err = load_image(std::path::Path::new("does/not/exist.png")).unwrap_err();
        assert!(matches!(err, DetectError::InvalidImage(_)));
    }
}
