//! Image and feature processors feeding the inference pipeline.
//!
//! - [`resize`] brings images to the extractor's fixed input shape.
//! - [`normalization`] applies the training-time pixel transform.
//! - [`scaler`] standardizes embeddings for the classifier.

pub mod normalization;
pub mod resize;
pub mod scaler;

pub use normalization::{ChannelOrder, NormalizeImage};
pub use resize::resize_to_input;
pub use scaler::FeatureScaler;
