//! Perception Capabilities
//!
//! Pluggable pose and face detection interfaces. The engine never runs a
//! model itself: detectors are constructed by the caller, injected into the
//! analyzer, and shared read-only across requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::{Frame, PixelRegion, SegmentationMask};
use crate::landmarks::LandmarkSet;

/// Detector backend failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{backend} detector failed: {message}")]
pub struct DetectorError {
    pub backend: String,
    pub message: String,
}

impl DetectorError {
    pub fn new(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Face bounding box in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    /// Left edge (0-1 of image width)
    pub x: f64,
    /// Top edge (0-1 of image height)
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Pixel rectangle covered by the box.
    ///
    /// Edges are truncated toward zero, then clipped to the image, so a box
    /// hanging off the frame samples only its visible part.
    pub fn to_pixel_region(&self, width: u32, height: u32) -> PixelRegion {
        let x = (self.x * width as f64).trunc();
        let y = (self.y * height as f64).trunc();
        let w = (self.width * width as f64).trunc();
        let h = (self.height * height as f64).trunc();

        let to_px = |v: f64, limit: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                v.min(limit as f64) as u32
            }
        };

        PixelRegion::new(
            to_px(x, width),
            to_px(y, height),
            to_px(x + w, width),
            to_px(y + h, height),
        )
    }
}

/// Pose detection result
#[derive(Debug, Clone, PartialEq)]
pub struct PoseDetection {
    /// 33 MediaPipe Pose landmarks
    pub landmarks: LandmarkSet,
    /// Optional per-pixel foreground probability
    pub segmentation_mask: Option<SegmentationMask>,
}

/// Pluggable pose detection trait
///
/// Implement this trait to integrate a pose backend:
/// - MediaPipe Pose (via FFI or a sidecar service)
/// - ONNX pose models
/// - Canned landmark sets for tests and offline replays
pub trait PoseDetector: Send + Sync {
    /// Detect one person in the frame.
    ///
    /// Returns `Ok(None)` when no person is found.
    fn detect(&self, frame: &Frame) -> Result<Option<PoseDetection>, DetectorError>;
}

/// Pluggable face detection trait
pub trait FaceDetector: Send + Sync {
    /// Detect the most prominent face, if any
    fn detect(&self, frame: &Frame) -> Result<Option<FaceBox>, DetectorError>;
}

/// No-op detector for when no face detection backend is wired in
///
/// Skin tone then samples the upper-torso region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _frame: &Frame) -> Result<Option<FaceBox>, DetectorError> {
        Ok(None)
    }
}

/// Pose detector returning a fixed detection regardless of the frame
///
/// Use this when landmarks were computed upstream (e.g. on the client) or to
/// drive the analyzer in tests without a model.
#[derive(Debug, Clone, Default)]
pub struct CannedPoseDetector {
    detection: Option<PoseDetection>,
}

impl CannedPoseDetector {
    pub fn new(landmarks: LandmarkSet, segmentation_mask: Option<SegmentationMask>) -> Self {
        Self {
            detection: Some(PoseDetection {
                landmarks,
                segmentation_mask,
            }),
        }
    }

    /// Detector that never finds a person
    pub fn empty() -> Self {
        Self { detection: None }
    }
}

impl PoseDetector for CannedPoseDetector {
    fn detect(&self, _frame: &Frame) -> Result<Option<PoseDetection>, DetectorError> {
        Ok(self.detection.clone())
    }
}

/// Face detector returning a fixed box
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedFaceDetector {
    face: Option<FaceBox>,
}

impl CannedFaceDetector {
    pub fn new(face: Option<FaceBox>) -> Self {
        Self { face }
    }
}

impl FaceDetector for CannedFaceDetector {
    fn detect(&self, _frame: &Frame) -> Result<Option<FaceBox>, DetectorError> {
        Ok(self.face)
    }
}
