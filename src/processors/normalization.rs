//! Image normalization for the feature extractor.
//!
//! Normalization is expressed as a per-channel affine transform
//! `value * alpha + beta` with `alpha = scale / std` and `beta = -mean / std`,
//! which covers both plain rescaling and mean/std standardization. The
//! transform applied here must match the one the feature extractor was
//! trained with bit-for-bit; it is a contract, not a free parameter.

use crate::core::errors::{DetectError, DetectResult};
use crate::core::tensor::Tensor4D;
use image::RgbImage;

/// Channel ordering of the produced tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Channels-first: `(1, C, H, W)`.
    CHW,
    /// Channels-last: `(1, H, W, C)`.
    HWC,
}

/// Normalizes images into model input tensors.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std).
    beta: [f32; 3],
    /// Channel ordering of the output tensor.
    order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Scaling factor applied to raw 8-bit channel values
    /// * `mean` - Mean values for each channel, in the scaled domain
    /// * `std` - Standard deviation values for each channel
    /// * `order` - Channel ordering of the produced tensor
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if scale is not positive or any standard
    /// deviation is not positive.
    pub fn new(scale: f32, mean: [f32; 3], std: [f32; 3], order: ChannelOrder) -> DetectResult<Self> {
        if scale <= 0.0 {
            return Err(DetectError::config_error("scale must be greater than 0"));
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(DetectError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta, order })
    }

    /// Creates the normalization the MobileNetV2 backbone family was
    /// trained with: `x * 2/255 - 1`, mapping 8-bit values into `[-1, 1]`,
    /// channels-last.
    pub fn for_mobilenet() -> DetectResult<Self> {
        Self::new(2.0 / 255.0, [1.0, 1.0, 1.0], [1.0, 1.0, 1.0], ChannelOrder::HWC)
    }

    /// Normalizes a single image into a 4D batch-of-one tensor.
    pub fn normalize_to(&self, img: &RgbImage) -> DetectResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let (w, h) = (width as usize, height as usize);
        let channels = 3usize;

        match self.order {
            ChannelOrder::CHW => {
                let mut result = vec![0.0f32; channels * h * w];
                for (x, y, pixel) in img.enumerate_pixels() {
                    let (x, y) = (x as usize, y as usize);
                    for c in 0..channels {
                        result[c * h * w + y * w + x] =
                            pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
                ndarray::Array4::from_shape_vec((1, channels, h, w), result)
                    .map_err(|e| DetectError::normalization("create CHW image tensor", e))
            }
            ChannelOrder::HWC => {
                let mut result = vec![0.0f32; h * w * channels];
                for (x, y, pixel) in img.enumerate_pixels() {
                    let (x, y) = (x as usize, y as usize);
                    for c in 0..channels {
                        result[y * w * channels + x * channels + c] =
                            pixel[c] as f32 * self.alpha[c] + self.beta[c];
                    }
                }
                ndarray::Array4::from_shape_vec((1, h, w, channels), result)
                    .map_err(|e| DetectError::normalization("create HWC image tensor", e))
            }
        }
    }
}
