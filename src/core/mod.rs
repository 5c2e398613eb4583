//! The core module of the detection pipeline.
//!
//! This module contains the fundamental components of the pipeline:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Inference engine integration
//! - Tensor aliases and the model trait seams
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;
pub mod inference;
pub mod tensor;
pub mod traits;

pub use config::DetectorConfig;
pub use constants::*;
pub use errors::{DetectError, DetectResult, ProcessingStage};
pub use inference::OrtModel;
pub use tensor::{Tensor2D, Tensor4D};
pub use traits::{EmbeddingModel, ProbabilityModel, SeverityModel};
