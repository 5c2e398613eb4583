//! The structured result of one detection call.
//!
//! A [`Diagnosis`] is immutable once constructed and serializes to the flat
//! record the HTTP layer returns: `disease`, `severity`, `severity_level`,
//! `fertilizer`, `remedy`, `confidence`.

use crate::core::constants::{
    CLASS_NAME_SEPARATOR, DISPLAY_NAME_DELIMITER, SEVERITY_HIGH_THRESHOLD,
    SEVERITY_MODERATE_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Three-level severity category derived from the severity percentage.
///
/// Tier boundaries are inclusive on the lower bound: ≥80 is High, ≥60 is
/// Moderate, everything below is Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Moderate,
    High,
}

impl SeverityLevel {
    /// Maps a severity percentage to its tier.
    pub fn from_percent(percent: f32) -> Self {
        if percent >= SEVERITY_HIGH_THRESHOLD {
            SeverityLevel::High
        } else if percent >= SEVERITY_MODERATE_THRESHOLD {
            SeverityLevel::Moderate
        } else {
            SeverityLevel::Low
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityLevel::Low => write!(f, "Low"),
            SeverityLevel::Moderate => write!(f, "Moderate"),
            SeverityLevel::High => write!(f, "High"),
        }
    }
}

/// The structured result of one successful detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Human-readable disease name, e.g. `Tomato - Early_blight`.
    pub disease: String,
    /// Severity percentage in `[0, 100]`, rounded to one decimal.
    pub severity: f32,
    /// Severity tier consistent with the reported `severity`.
    pub severity_level: SeverityLevel,
    /// Fertilizer guidance from the knowledge base.
    pub fertilizer: String,
    /// Remedy guidance from the knowledge base.
    pub remedy: String,
    /// Classifier confidence as a percentage in `[0, 100]`, rounded to two
    /// decimals.
    pub confidence: f32,
}

/// Formats a raw class name for display, replacing the training-time
/// separator with a readable delimiter.
///
/// `Tomato___Early_blight` becomes `Tomato - Early_blight`.
pub fn display_name(raw: &str) -> String {
    raw.replace(CLASS_NAME_SEPARATOR, DISPLAY_NAME_DELIMITER)
}

/// Rounds to one decimal place.
pub fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Rounds to two decimal places.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
