//! BodyLens core: anthropometric estimation from a single full-body photo.
//!
//! Given an RGB frame and 33 MediaPipe Pose landmarks (plus an optional
//! segmentation mask and face box) the [`BodyAnalyzer`] produces:
//! - eight body measurements in inches, calibrated from apparent height
//! - a `depth_temperature` skin-tone label
//! - a body-shape label from an ordered rule list
//! - a bounded heuristic confidence score
//!
//! Pose and face detection are pluggable capabilities ([`PoseDetector`],
//! [`FaceDetector`]); the crate never runs a model itself.
//!
//! # Example
//!
//! ```ignore
//! use bodylens_core::{AnalysisInput, BodyAnalyzer, Frame};
//!
//! let analyzer = BodyAnalyzer::new();
//! let frame = Frame::from_file("photo.jpg")?;
//! let result = analyzer.analyze(&AnalysisInput::new(frame, landmarks))?;
//! println!("{} / {} ({:.2})", result.skin_tone, result.body_type, result.confidence);
//! ```

pub mod analyzer;
pub mod body_type;
pub mod confidence;
pub mod config;
pub mod error;
pub mod frame;
pub mod landmarks;
pub mod measurements;
pub mod perception;
pub mod skin_tone;

#[cfg(test)]
pub mod tests_config;
#[cfg(test)]
pub mod tests_proptest;

// ============================================================================
// CURATED PUBLIC API EXPORTS
// ============================================================================

// Pipeline
pub use analyzer::{
    AnalysisDiagnostics, AnalysisInput, AnalysisMetadata, AnalysisResult, BodyAnalyzer,
    ANALYSIS_VERSION,
};

// Configuration
pub use config::{
    AnalyzerConfig, Band, BodyTypeConfig, ConfidenceConfig, ConfigError, MeasurementConfig,
    SkinToneConfig,
};

// Errors
pub use error::{AnalysisError, Degradation};

// Inputs
pub use frame::{Frame, PixelRegion, SegmentationMask};
pub use landmarks::{indices as landmark_indices, landmark_distance, Landmark, LandmarkSet, PixelDistance};
pub use perception::{
    CannedFaceDetector, CannedPoseDetector, DetectorError, FaceBox, FaceDetector, NoFaceDetector,
    PoseDetection, PoseDetector,
};

// Stages
pub use body_type::{BodyRatios, BodyType, BodyTypeClassifier, BodyTypeResult, BodyTypeRule, ClassificationError};
pub use confidence::{score_confidence, ConfidenceBreakdown, ConfidenceError};
pub use measurements::{estimate_measurements, MeasurementError, MeasurementSet, PixelSpans};
pub use skin_tone::{
    analyze_skin_tone, SampleSource, SamplingError, SkinDepth, SkinToneLabel, SkinToneReading,
    Temperature,
};
