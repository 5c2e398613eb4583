//! Tensor type aliases shared across the pipeline.

/// A 2D tensor of f32 values, `(batch, features)` or `(batch, classes)`.
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of f32 values holding a normalized image batch.
pub type Tensor4D = ndarray::Array4<f32>;
