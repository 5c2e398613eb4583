//! Per-dimension feature standardization.
//!
//! The classifier was trained on standardized embeddings; the means and
//! standard deviations fitted at training time are persisted alongside the
//! models as `feature_scaler.json` and applied elementwise here.

use crate::core::constants::FEATURE_SCALER_FILE;
use crate::core::errors::{DetectError, DetectResult};
use crate::core::tensor::Tensor2D;
use serde::Deserialize;
use std::path::Path;

/// A pre-fit per-dimension standardizer: `(x - mean) / std`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureScaler {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl FeatureScaler {
    /// Creates a scaler from fitted means and standard deviations.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the vectors are empty, differ in length,
    /// or any standard deviation is not positive.
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> DetectResult<Self> {
        let scaler = Self { mean, std };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Loads a scaler from its JSON artifact.
    pub fn load(path: impl AsRef<Path>) -> DetectResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            DetectError::model_unavailable(
                FEATURE_SCALER_FILE,
                format!("failed to read '{}'", path.display()),
                Some(e),
            )
        })?;
        let scaler: Self = serde_json::from_str(&data).map_err(|e| {
            DetectError::model_unavailable(
                FEATURE_SCALER_FILE,
                format!("failed to parse '{}'", path.display()),
                Some(e),
            )
        })?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> DetectResult<()> {
        if self.mean.is_empty() {
            return Err(DetectError::config_error("scaler must have at least one dimension"));
        }
        if self.mean.len() != self.std.len() {
            return Err(DetectError::config_error(format!(
                "scaler mean/std length mismatch: {} vs {}",
                self.mean.len(),
                self.std.len()
            )));
        }
        for (i, &s) in self.std.iter().enumerate() {
            if s <= 0.0 {
                return Err(DetectError::config_error(format!(
                    "scaler std at index {i} must be greater than 0, got {s}"
                )));
            }
        }
        Ok(())
    }

    /// Number of feature dimensions this scaler was fitted on.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Standardizes a `(batch, dim)` feature matrix, returning a new
    /// matrix. The input is never mutated.
    pub fn transform(&self, features: &Tensor2D) -> DetectResult<Tensor2D> {
        if features.shape()[1] != self.dim() {
            return Err(DetectError::invalid_input(format!(
                "feature dimension mismatch: scaler fitted on {}, got {}",
                self.dim(),
                features.shape()[1]
            )));
        }

        let mut scaled = features.clone();
        for mut row in scaled.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = (*value - self.mean[j]) / self.std[j];
            }
        }
        Ok(scaled)
    }
}
