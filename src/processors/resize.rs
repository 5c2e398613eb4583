//! Image resizing for the feature extractor input.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

/// Resizes an image to exactly the model input shape.
///
/// The feature extractor has a fixed input resolution, so the aspect ratio
/// is not preserved. The filter defaults to Lanczos3; the interpolation
/// must stay deterministic so identical inputs produce identical tensors.
pub fn resize_to_input(
    img: &RgbImage,
    width: u32,
    height: u32,
    filter: Option<FilterType>,
) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }

    let filter = filter.unwrap_or(FilterType::Lanczos3);
    DynamicImage::ImageRgb8(img.clone())
        .resize_exact(width, height, filter)
        .to_rgb8()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn resizes_to_exact_dimensions() {
        let img = RgbImage::from_pixel(640, 480, Rgb([10, 20, 30]));
        let resized = resize_to_input(&img, 224, 224, None);
        assert_eq!(resized.dimensions(), (224, 224));
    }

    #[test]
    fn already_sized_image_is_returned_unchanged() {
        let img = RgbImage::from_pixel(224, 224, Rgb([10, 20, 30]));
        let resized = resize_to_input(&img, 224, 224, None);
        assert_eq!(resized, img);
    }

    #[test]
    fn resize_is_deterministic() {
        let mut img = RgbImage::new(100, 50);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]);
        }

        let a = resize_to_input(&img, 224, 224, None);
        let b = resize_to_input(&img, 224, 224, None);
        assert_eq!(a, b);
    }
}
