//! Error types for the detection pipeline.
//!
//! This module defines the errors that can occur while loading artifacts and
//! running inference, along with utility constructors for creating them with
//! appropriate context. The user-correctable variants (`InvalidImage`,
//! `LowConfidence`) carry short human-readable messages; the internal
//! variants (`KnowledgeNotFound`, `ModelUnavailable`) are logged with full
//! context by the callers that raise them.

use thiserror::Error;

/// Enum representing different stages of processing in the detection
/// pipeline.
///
/// Used to identify which stage of the pipeline an internal error occurred
/// in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred during image normalization.
    Normalization,
    /// Error occurred during classification post-processing.
    PostProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Normalization => write!(f, "normalization"),
            ProcessingStage::PostProcessing => write!(f, "post-processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// A simple string error for processing failures that have no underlying
/// source error.
#[derive(Debug)]
pub struct SimpleError(String);

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for SimpleError {}

/// Enum representing the errors that can occur in the detection pipeline.
///
/// The first four variants form the externally visible taxonomy; the
/// remaining ones wrap failures from the runtime and ambient layers.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The input could not be decoded as an image. User-correctable.
    #[error("invalid image")]
    InvalidImage(#[source] image::ImageError),

    /// The classifier's best probability fell below the confidence gate.
    /// User-correctable (retake the photo, ensure the leaf is visible).
    #[error("leaf not detected clearly (confidence {confidence:.2})")]
    LowConfidence {
        /// The rejected raw probability, in `[0, 1]`.
        confidence: f32,
    },

    /// A classifier-reachable class has no entry in the class-index table
    /// or the knowledge base. This is an internal consistency fault between
    /// the trained artifacts and the knowledge base, not a user error.
    #[error("no knowledge entry for class '{class}'")]
    KnowledgeNotFound {
        /// The class name (or id, when the name itself is unknown) that
        /// failed to resolve.
        class: String,
    },

    /// An artifact failed to load at startup. Construction of the detector
    /// fails on this, so a service never reports itself healthy without a
    /// complete artifact set.
    #[error("artifact '{artifact}' unavailable: {reason}")]
    ModelUnavailable {
        /// Which artifact failed (feature extractor, classifier, ...).
        artifact: String,
        /// Why it failed to load.
        reason: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error occurred during pipeline-internal processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input to a pipeline component.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor shape operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl DetectError {
    /// Creates a DetectError for pipeline-internal processing failures.
    pub fn processing(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a DetectError for normalization operations.
    pub fn normalization(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing(ProcessingStage::Normalization, context, error)
    }

    /// Creates a DetectError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a DetectError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a DetectError for an artifact that failed to load at
    /// startup.
    pub fn model_unavailable(
        artifact: &str,
        reason: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelUnavailable {
            artifact: artifact.to_string(),
            reason: reason.into(),
            source: source.map(|e| Box::new(e) as _),
        }
    }

    /// Creates a DetectError for a class id or name that has no knowledge
    /// entry.
    pub fn knowledge_not_found(class: impl Into<String>) -> Self {
        Self::KnowledgeNotFound {
            class: class.into(),
        }
    }

    /// Whether this error is correctable by the end user (as opposed to an
    /// internal or operational fault).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DetectError::InvalidImage(_) | DetectError::LowConfidence { .. }
        )
    }
}

/// Convenient result alias for detection operations.
pub type DetectResult<T> = Result<T, DetectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_is_user_error() {
        let err = DetectError::LowConfidence { confidence: 0.3 };
        assert!(err.is_user_error());
        assert!(err.to_string().contains("0.30"));
    }

    #[test]
    fn knowledge_not_found_is_internal() {
        let err = DetectError::knowledge_not_found("Tomato___Early_blight");
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("Tomato___Early_blight"));
    }

    #[test]
    fn processing_errors_carry_stage_and_context() {
        let err = DetectError::processing(
            ProcessingStage::Generic,
            "resample buffer",
            SimpleError::new("short read"),
        );
        assert_eq!(err.to_string(), "processing failed: resample buffer");

        let err = DetectError::normalization("build tensor", SimpleError::new("shape"));
        assert_eq!(err.to_string(), "normalization failed: build tensor");
    }

    #[test]
    fn model_unavailable_reports_artifact() {
        let err = DetectError::model_unavailable(
            "classifier",
            "file not found",
            None::<std::io::Error>,
        );
        assert_eq!(
            err.to_string(),
            "artifact 'classifier' unavailable: file not found"
        );
    }
}
