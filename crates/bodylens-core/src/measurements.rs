//! Body Measurements
//!
//! Converts pixel-space landmark spans into inch measurements. Height is the
//! calibration anchor: it is estimated from how much of the frame the body
//! fills, and every other measurement is scaled from pixels with
//! `height_in / height_px`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::MeasurementConfig;
use crate::landmarks::{indices, LandmarkSet, PixelDistance};

/// Measurement estimation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("landmark {index} missing (detector returned {available} points)")]
    MissingLandmark { index: usize, available: usize },

    #[error("body height spans {0} px, pixel-to-inch scale is undefined")]
    DegenerateHeight(f64),
}

/// Body measurements in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSet {
    pub height: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    pub shoulders: f64,
    pub inseam: f64,
    pub arm_length: f64,
    pub neck: f64,
}

impl MeasurementSet {
    /// Substituted when landmarks are missing or unusable
    pub const FALLBACK: MeasurementSet = MeasurementSet {
        height: 66.0,
        chest: 36.0,
        waist: 30.0,
        hips: 38.0,
        shoulders: 42.0,
        inseam: 30.0,
        arm_length: 25.0,
        neck: 15.0,
    };

    pub fn fallback() -> Self {
        Self::FALLBACK
    }

    /// Named values in reporting order
    pub fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("height", self.height),
            ("chest", self.chest),
            ("waist", self.waist),
            ("hips", self.hips),
            ("shoulders", self.shoulders),
            ("inseam", self.inseam),
            ("armLength", self.arm_length),
            ("neck", self.neck),
        ]
    }
}

/// Pixel spans measured between landmark pairs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PixelSpans {
    /// Left shoulder to right shoulder
    pub shoulder_width: f64,
    /// Left hip to right hip
    pub hip_width: f64,
    /// Left shoulder to left hip
    pub torso_length: f64,
    /// Nose to ankle, averaged over both ankles
    pub height: f64,
    /// Shoulder to wrist, averaged over both arms
    pub arm_length: f64,
}

impl PixelSpans {
    /// Measure all spans; fails on the first absent landmark
    pub fn from_landmarks(
        landmarks: &LandmarkSet,
        width: u32,
        height: u32,
    ) -> Result<Self, MeasurementError> {
        let span = |a: usize, b: usize| -> Result<PixelDistance, MeasurementError> {
            landmarks.distance(a, b, width, height).ok_or_else(|| {
                let index = if landmarks.get(a).is_none() { a } else { b };
                MeasurementError::MissingLandmark {
                    index,
                    available: landmarks.len(),
                }
            })
        };

        let shoulder_width = span(indices::LEFT_SHOULDER, indices::RIGHT_SHOULDER)?.planar;
        let hip_width = span(indices::LEFT_HIP, indices::RIGHT_HIP)?.planar;
        let torso_length = span(indices::LEFT_SHOULDER, indices::LEFT_HIP)?.planar;

        let left_height = span(indices::NOSE, indices::LEFT_ANKLE)?.planar;
        let right_height = span(indices::NOSE, indices::RIGHT_ANKLE)?.planar;

        let left_arm = span(indices::LEFT_SHOULDER, indices::LEFT_WRIST)?.planar;
        let right_arm = span(indices::RIGHT_SHOULDER, indices::RIGHT_WRIST)?.planar;

        Ok(Self {
            shoulder_width,
            hip_width,
            torso_length,
            height: (left_height + right_height) / 2.0,
            arm_length: (left_arm + right_arm) / 2.0,
        })
    }
}

/// Estimate measurements from landmarks
pub fn estimate_measurements(
    landmarks: &LandmarkSet,
    width: u32,
    height: u32,
    config: &MeasurementConfig,
) -> Result<MeasurementSet, MeasurementError> {
    let spans = PixelSpans::from_landmarks(landmarks, width, height)?;
    log::debug!(
        "Pixel spans: shoulders={:.1} hips={:.1} torso={:.1} height={:.1} arm={:.1}",
        spans.shoulder_width,
        spans.hip_width,
        spans.torso_length,
        spans.height,
        spans.arm_length
    );
    estimate_from_spans(&spans, height, config)
}

/// Estimate measurements from pre-computed pixel spans
pub fn estimate_from_spans(
    spans: &PixelSpans,
    image_height: u32,
    config: &MeasurementConfig,
) -> Result<MeasurementSet, MeasurementError> {
    if !(spans.height.is_finite() && spans.height > 0.0) || image_height == 0 {
        return Err(MeasurementError::DegenerateHeight(spans.height));
    }

    // Height: linear in the fraction of the frame the body occupies
    let frame_fill = spans.height / image_height as f64;
    let height_in = config.height_band.clamp(
        config.base_height_in
            + (frame_fill - config.frame_fill_reference) * config.frame_fill_gain,
    );

    let px_to_in = height_in / spans.height;

    let shoulders = config.shoulder_band.clamp(spans.shoulder_width * px_to_in);

    // Derived, not measured
    let chest = shoulders * config.chest_per_shoulder;
    let waist = chest * config.waist_per_chest;
    let neck = chest * config.neck_per_chest;

    // Hip width is noisy under loose clothing; keep it chest-relative
    let hips = config
        .hip_to_chest_band
        .scaled(chest)
        .clamp(spans.hip_width * px_to_in);

    let inseam = height_in * config.inseam_per_height;
    let arm_length = config.arm_length_band.clamp(spans.arm_length * px_to_in);

    Ok(MeasurementSet {
        height: round_tenths(height_in),
        chest: round_tenths(chest),
        waist: round_tenths(waist),
        hips: round_tenths(hips),
        shoulders: round_tenths(shoulders),
        inseam: round_tenths(inseam),
        arm_length: round_tenths(arm_length),
        neck: round_tenths(neck),
    })
}

/// Round to one decimal place
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
