//! Analysis Confidence
//!
//! Heuristic score from landmark visibility and measurement plausibility.
//! The score is bounded to the configured output band so downstream
//! consumers never see a near-zero or perfect confidence.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfidenceConfig;
use crate::landmarks::LandmarkSet;
use crate::measurements::MeasurementSet;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("confidence score is not finite ({raw})")]
    NonFinite { raw: f64 },
}

/// Score with its contributing terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub base: f64,
    pub visibility_bonus: f64,
    pub height_bonus: f64,
    pub chest_bonus: f64,
    /// Landmarks with visibility above the threshold
    pub visible_landmarks: usize,
    /// Clamped and rounded final score
    pub score: f64,
}

/// Score an analysis
pub fn score_confidence(
    landmarks: &LandmarkSet,
    measurements: &MeasurementSet,
    config: &ConfidenceConfig,
) -> Result<ConfidenceBreakdown, ConfidenceError> {
    let visible = landmarks.visible_count(config.visibility_threshold);

    // Comparison instead of f64::min, which would swallow a NaN fraction
    let visibility_bonus = {
        let scaled = visible as f64 / config.expected_landmarks as f64 * config.max_visibility_bonus;
        if scaled > config.max_visibility_bonus {
            config.max_visibility_bonus
        } else {
            scaled
        }
    };

    let height_bonus = if config.plausible_height.contains(measurements.height) {
        config.height_bonus
    } else {
        0.0
    };
    let chest_bonus = if config.plausible_chest.contains(measurements.chest) {
        config.chest_bonus
    } else {
        0.0
    };

    let raw = config.base + visibility_bonus + height_bonus + chest_bonus;
    if !raw.is_finite() {
        return Err(ConfidenceError::NonFinite { raw });
    }

    Ok(ConfidenceBreakdown {
        base: config.base,
        visibility_bonus,
        height_bonus,
        chest_bonus,
        visible_landmarks: visible,
        score: round_hundredths(config.output_band.clamp(raw)),
    })
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
