//! Constants used throughout the detection pipeline.
//!
//! This module defines default values for image preprocessing, the
//! confidence gate, severity tiering, and the artifact file names resolved
//! from the configured model directory.

/// The default input shape for the feature extractor.
///
/// The feature extractor has a fixed input resolution; every image is
/// resized to this (width, height) before normalization.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (224, 224);

/// The default minimum classifier probability required to accept a
/// prediction instead of reporting ambiguity.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// The default threshold for parallel processing.
///
/// Batch entry points switch to parallel iteration once a batch holds more
/// items than this.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Severity percentage at or above which a diagnosis is tiered "High".
pub const SEVERITY_HIGH_THRESHOLD: f32 = 80.0;

/// Severity percentage at or above which a diagnosis is tiered "Moderate".
pub const SEVERITY_MODERATE_THRESHOLD: f32 = 60.0;

/// The separator sequence used in raw class names as produced at training
/// time (e.g. `Tomato___Early_blight`).
pub const CLASS_NAME_SEPARATOR: &str = "___";

/// The delimiter the raw separator is replaced with for display.
pub const DISPLAY_NAME_DELIMITER: &str = " - ";

/// File name of the feature extractor model inside the model directory.
pub const FEATURE_EXTRACTOR_FILE: &str = "feature_extractor.onnx";

/// File name of the classifier model inside the model directory.
pub const CLASSIFIER_FILE: &str = "classifier.onnx";

/// File name of the optional severity regressor inside the model directory.
pub const SEVERITY_REGRESSOR_FILE: &str = "severity_regressor.onnx";

/// File name of the persisted feature scaler inside the model directory.
pub const FEATURE_SCALER_FILE: &str = "feature_scaler.json";

/// File name of the class-index table inside the model directory.
pub const CLASS_INDICES_FILE: &str = "class_indices.json";

/// File name of the remedy/fertilizer knowledge table inside the model
/// directory.
pub const AGRI_KNOWLEDGE_FILE: &str = "agri_knowledge.json";
