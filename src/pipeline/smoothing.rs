//! Probability smoothing for frame-stream callers.
//!
//! Camera and video callers invoke the same pipeline once per frame and
//! average the classifier's probability vectors over a short sliding window
//! before gating, so a single noisy frame cannot flip the diagnosis.

use std::collections::VecDeque;

/// Default number of frames averaged before a prediction is accepted.
pub const DEFAULT_SMOOTH_FRAMES: usize = 2;

/// A bounded sliding-window averager over probability vectors.
#[derive(Debug, Clone)]
pub struct ProbabilitySmoother {
    window: VecDeque<Vec<f32>>,
    capacity: usize,
}

impl ProbabilitySmoother {
    /// Creates a smoother averaging over `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Pushes one frame's probability vector.
    ///
    /// Returns the averaged vector once the window is full, `None` while
    /// still warming up. A vector whose length differs from the window's
    /// resets the window first; that only happens when the caller switched
    /// models mid-stream.
    pub fn push(&mut self, probabilities: Vec<f32>) -> Option<Vec<f32>> {
        if let Some(front) = self.window.front() {
            if front.len() != probabilities.len() {
                self.window.clear();
            }
        }

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(probabilities);

        if self.window.len() < self.capacity {
            return None;
        }

        let num_classes = self.window[0].len();
        let mut averaged = vec![0.0f32; num_classes];
        for frame in &self.window {
            for (sum, &p) in averaged.iter_mut().zip(frame) {
                *sum += p;
            }
        }
        let count = self.window.len() as f32;
        for value in &mut averaged {
            *value /= count;
        }
        Some(averaged)
    }

    /// Whether the window has filled up at least once since the last reset.
    pub fn is_warm(&self) -> bool {
        self.window.len() == self.capacity
    }

    /// Drops all buffered frames.
    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for ProbabilitySmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTH_FRAMES)
    }
}
