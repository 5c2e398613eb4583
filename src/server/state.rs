//! Shared server state.

use crate::pipeline::DiseaseDetector;
use std::sync::Arc;
use std::time::Instant;

/// State shared across all request handlers.
#[derive(Debug)]
pub struct AppState {
    /// The detector, constructed once at startup with all artifacts loaded.
    pub detector: Arc<DiseaseDetector>,
    started: Instant,
}

/// Shared reference to the server state.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wraps a detector for serving.
    pub fn new(detector: Arc<DiseaseDetector>) -> SharedState {
        Arc::new(Self {
            detector,
            started: Instant::now(),
        })
    }

    /// Seconds since the server state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
