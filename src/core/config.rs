//! Configuration for the detection pipeline.
//!
//! All tunables of the pipeline live here: where the artifact set is on
//! disk, the model input resolution, the confidence gate, and the ONNX
//! session pool size. A configuration is plain data; it is validated once
//! and consumed by [`crate::pipeline::DiseaseDetector::from_config`].

use crate::core::constants::{
    AGRI_KNOWLEDGE_FILE, CLASSIFIER_FILE, CLASS_INDICES_FILE, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_INPUT_SHAPE, FEATURE_EXTRACTOR_FILE, FEATURE_SCALER_FILE, SEVERITY_REGRESSOR_FILE,
};
use crate::core::errors::{DetectError, DetectResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_input_shape() -> (u32, u32) {
    DEFAULT_INPUT_SHAPE
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_session_pool_size() -> usize {
    1
}

/// Configuration for [`crate::pipeline::DiseaseDetector`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Directory containing the artifact set (models and JSON tables).
    pub model_dir: PathBuf,
    /// Input shape for the feature extractor (width, height).
    #[serde(default = "default_input_shape")]
    pub input_shape: (u32, u32),
    /// Minimum classifier probability required to accept a prediction.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// Number of pooled ONNX sessions per model for concurrent calls.
    #[serde(default = "default_session_pool_size")]
    pub session_pool_size: usize,
}

impl DetectorConfig {
    /// Creates a configuration for the given model directory with default
    /// settings for everything else.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            input_shape: DEFAULT_INPUT_SHAPE,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            session_pool_size: 1,
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> DetectResult<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| DetectError::config_error(format!("invalid config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the input shape has a zero dimension, the
    /// confidence threshold is outside `(0, 1]`, or the session pool size
    /// is zero.
    pub fn validate(&self) -> DetectResult<()> {
        let (width, height) = self.input_shape;
        if width == 0 || height == 0 {
            return Err(DetectError::config_error(format!(
                "input shape must be non-zero, got {width}x{height}"
            )));
        }

        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(DetectError::config_error(format!(
                "confidence threshold must be in (0, 1], got {}",
                self.confidence_threshold
            )));
        }

        if self.session_pool_size == 0 {
            return Err(DetectError::config_error(
                "session pool size must be at least 1",
            ));
        }

        Ok(())
    }

    /// Path to the feature extractor model.
    pub fn feature_extractor_path(&self) -> PathBuf {
        self.model_dir.join(FEATURE_EXTRACTOR_FILE)
    }

    /// Path to the classifier model.
    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(CLASSIFIER_FILE)
    }

    /// Path to the optional severity regressor model.
    pub fn severity_regressor_path(&self) -> PathBuf {
        self.model_dir.join(SEVERITY_REGRESSOR_FILE)
    }

    /// Path to the persisted feature scaler.
    pub fn feature_scaler_path(&self) -> PathBuf {
        self.model_dir.join(FEATURE_SCALER_FILE)
    }

    /// Path to the class-index table.
    pub fn class_indices_path(&self) -> PathBuf {
        self.model_dir.join(CLASS_INDICES_FILE)
    }

    /// Path to the remedy/fertilizer knowledge table.
    pub fn knowledge_path(&self) -> PathBuf {
        self.model_dir.join(AGRI_KNOWLEDGE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = DetectorConfig::new("models");
        assert!(config.validate().is_ok());
        assert_eq!(config.input_shape, (224, 224));
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.session_pool_size, 1);
    }

    #[test]
    fn rejects_zero_input_shape() {
        let mut config = DetectorConfig::new("models");
        config.input_shape = (0, 224);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = DetectorConfig::new("models");
        config.confidence_threshold = 1.5;
        assert!(config.validate().is_err());
        config.confidence_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_pool_size() {
        let mut config = DetectorConfig::new("models");
        config.session_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn artifact_paths_resolve_under_model_dir() {
        let config = DetectorConfig::new("models");
        assert_eq!(
            config.classifier_path(),
            PathBuf::from("models/classifier.onnx")
        );
        assert_eq!(
            config.knowledge_path(),
            PathBuf::from("models/agri_knowledge.json")
        );
    }

    #[test]
    fn loads_from_json_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"model_dir": "artifacts"}}"#).unwrap();

        let config = DetectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("artifacts"));
        assert_eq!(config.confidence_threshold, 0.5);
    }

    #[test]
    fn from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model_dir": "artifacts", "confidence_threshold": 2.0}}"#
        )
        .unwrap();

        assert!(DetectorConfig::from_file(file.path()).is_err());
    }
}
