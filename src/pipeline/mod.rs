//! The detection pipeline and its frame-stream helpers.

pub mod detector;
pub mod smoothing;

pub use detector::{DiseaseDetector, DiseaseDetectorBuilder, FrameAnalysis};
pub use smoothing::{ProbabilitySmoother, DEFAULT_SMOOTH_FRAMES};
