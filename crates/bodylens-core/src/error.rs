use serde::Serialize;
use thiserror::Error;

/// Structural input problems. No geometry is possible, so these are the only
/// errors that leave the analyzer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("frame buffer holds {actual} bytes, expected {expected} for RGB8")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("segmentation mask is {mask_width}x{mask_height}, image is {width}x{height}")]
    MaskDimensionMismatch {
        mask_width: u32,
        mask_height: u32,
        width: u32,
        height: u32,
    },

    #[error("no landmark collection supplied")]
    NoLandmarks,

    #[error("no person detected in image - try a clearer full-body photo")]
    NoPersonDetected,

    #[error("pose detector failed: {0}")]
    PoseDetector(String),
}

/// A stage that substituted its documented fallback value.
///
/// Attached to every result so callers can treat degraded analyses
/// differently from clean ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "reason", rename_all = "camelCase")]
pub enum Degradation {
    /// Default measurement set substituted
    MeasurementFallback(String),
    /// `medium_neutral` substituted
    SkinToneFallback(String),
    /// `rectangle` substituted
    BodyTypeFallback(String),
    /// Fixed confidence substituted
    ConfidenceFallback(String),
}

impl Degradation {
    pub fn reason(&self) -> &str {
        match self {
            Self::MeasurementFallback(r)
            | Self::SkinToneFallback(r)
            | Self::BodyTypeFallback(r)
            | Self::ConfidenceFallback(r) => r,
        }
    }
}
