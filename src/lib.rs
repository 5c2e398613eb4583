//! # leafscan
//!
//! A Rust library for plant leaf disease detection from images using ONNX
//! models.
//!
//! Given a single image and a pre-trained artifact set, the pipeline
//! produces a disease label, confidence, severity estimate, and
//! remedy/fertilizer guidance:
//!
//! raw image → resize → normalize → feature extraction → feature scaling →
//! classification → confidence gate → severity estimation → knowledge
//! lookup → structured result.
//!
//! ## Components
//!
//! - **Feature extraction**: a fixed-input-shape backbone producing an
//!   embedding per image
//! - **Classification**: a probability distribution over disease classes,
//!   gated by a confidence threshold
//! - **Severity estimation**: an optional regression head, with a
//!   confidence-based fallback
//! - **Knowledge lookup**: static remedy/fertilizer guidance per class,
//!   validated against the trained classes at startup
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, and the inference engine
//! * [`domain`] - Class mappings, the knowledge base, and the diagnosis record
//! * [`pipeline`] - The detector and frame-stream smoothing
//! * [`processors`] - Image and feature preprocessing
//! * [`server`] - HTTP boundary exposing the pipeline
//! * [`utils`] - Image loading helpers and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leafscan::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = DiseaseDetector::from_config(&DetectorConfig::new("models"))?;
//!
//! let diagnosis = detector.detect_path("leaf.jpg")?;
//! println!(
//!     "{}: severity {} ({}), confidence {}",
//!     diagnosis.disease, diagnosis.severity, diagnosis.severity_level, diagnosis.confidence
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Each detection call is independent and side-effect-free on shared
//! state; a detector can be shared across threads and called concurrently.

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod server;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use leafscan::prelude::*;
/// ```
pub mod prelude {
    // Pipeline (essential)
    pub use crate::pipeline::{DiseaseDetector, DiseaseDetectorBuilder, ProbabilitySmoother};

    // Configuration
    pub use crate::core::config::DetectorConfig;

    // Results
    pub use crate::domain::{Diagnosis, SeverityLevel};

    // Error Handling (essential)
    pub use crate::core::errors::{DetectError, DetectResult};

    // Image Utility (minimal)
    pub use crate::utils::{decode_image, load_image};
}
