//! Traits defining the model seams of the pipeline.
//!
//! The pipeline talks to its three pre-trained artifacts through these
//! traits so that the production ONNX engine can be swapped for
//! deterministic stubs in tests. All implementations must be safe to call
//! from multiple threads concurrently; the models are read-only after load.

use crate::core::errors::DetectResult;
use crate::core::tensor::{Tensor2D, Tensor4D};

/// A model producing a fixed-length embedding from a normalized image
/// tensor.
///
/// Input is the `(1, H, W, 3)` tensor produced by preprocessing; output is
/// a `(1, embed_dim)` feature matrix.
pub trait EmbeddingModel: Send + Sync {
    /// Runs the feature extractor on a normalized image tensor.
    fn embed(&self, input: &Tensor4D) -> DetectResult<Tensor2D>;
}

/// A model producing a probability distribution over disease classes from
/// a scaled feature matrix.
pub trait ProbabilityModel: Send + Sync {
    /// Runs the classifier on `(1, embed_dim)` scaled features, returning
    /// `(1, num_classes)` probabilities.
    fn predict_proba(&self, features: &Tensor2D) -> DetectResult<Tensor2D>;
}

/// A model predicting a continuous severity percentage from unscaled image
/// features.
pub trait SeverityModel: Send + Sync {
    /// Runs the severity regressor on `(1, embed_dim)` features, returning
    /// a severity percentage. Callers clamp the output to `[0, 100]`.
    fn predict_percent(&self, features: &Tensor2D) -> DetectResult<f32>;
}
