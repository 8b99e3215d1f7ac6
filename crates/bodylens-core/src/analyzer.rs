//! Body Analysis Pipeline
//!
//! ```text
//! AnalysisInput (frame + landmarks + optional mask / face box)
//!     │
//!     ├──► Structural checks (landmarks present, mask matches frame)
//!     │
//!     ├──► Measurement Estimation ──(error)──► default MeasurementSet
//!     │
//!     ├──► Skin Tone Sampling     ──(error)──► medium_neutral
//!     │
//!     ├──► Body Type Rules        ──(error)──► rectangle
//!     │
//!     └──► Confidence Score       ──(error)──► 0.80
//!
//! Output: AnalysisResult (+ Degradation per fallback taken)
//! ```
//!
//! Only structural input problems abort an analysis. Every per-stage
//! failure is replaced by that stage's fallback value and recorded in
//! [`AnalysisResult::degradations`].

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::body_type::{BodyType, BodyTypeClassifier, BodyTypeResult};
use crate::confidence::{score_confidence, ConfidenceBreakdown};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, Degradation};
use crate::frame::{Frame, SegmentationMask};
use crate::landmarks::LandmarkSet;
use crate::measurements::{estimate_measurements, MeasurementSet};
use crate::perception::{FaceBox, FaceDetector, NoFaceDetector, PoseDetector};
use crate::skin_tone::{analyze_skin_tone, SamplingError, SkinToneLabel, SkinToneReading};

/// Version tag stamped on every result
pub const ANALYSIS_VERSION: &str = "bodylens-v1.0";

// ============================================================================
// Input/Output Contracts
// ============================================================================

/// Everything one analysis needs
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub frame: Frame,
    /// Pose landmarks; `None` means the caller supplied no collection at all
    pub landmarks: Option<LandmarkSet>,
    pub segmentation_mask: Option<SegmentationMask>,
    /// Normalized face box; when absent the analyzer's face detector is asked
    pub face_bbox: Option<FaceBox>,
}

impl AnalysisInput {
    pub fn new(frame: Frame, landmarks: LandmarkSet) -> Self {
        Self {
            frame,
            landmarks: Some(landmarks),
            segmentation_mask: None,
            face_bbox: None,
        }
    }

    pub fn with_segmentation_mask(mut self, mask: SegmentationMask) -> Self {
        self.segmentation_mask = Some(mask);
        self
    }

    pub fn with_face_bbox(mut self, face: FaceBox) -> Self {
        self.face_bbox = Some(face);
        self
    }
}

/// Descriptive facts about the analyzed input
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub image_width: u32,
    pub image_height: u32,
    /// `"{width}x{height}"`
    pub image_size: String,
    pub landmark_count: usize,
    pub has_segmentation: bool,
    pub has_face_region: bool,
}

/// Intermediate values behind the reported labels
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDiagnostics {
    pub skin_tone: Option<SkinToneReading>,
    pub body_type: Option<BodyTypeResult>,
    pub confidence: Option<ConfidenceBreakdown>,
}

/// Result of one body analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_id: Uuid,
    pub measurements: MeasurementSet,
    pub skin_tone: SkinToneLabel,
    pub body_type: BodyType,
    /// In the configured output band, two decimals
    pub confidence: f64,
    /// Fallbacks taken, in pipeline order
    pub degradations: Vec<Degradation>,
    pub analysis_version: String,
    pub processing_time_ms: f64,
    /// Unix seconds
    pub timestamp: i64,
    pub metadata: AnalysisMetadata,
    #[serde(skip)]
    pub diagnostics: AnalysisDiagnostics,
}

impl AnalysisResult {
    /// True when at least one stage substituted its fallback
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

// ============================================================================
// BodyAnalyzer (Stateless)
// ============================================================================

/// Stateless analysis pipeline.
///
/// Holds only configuration and injected detectors, so a single instance can
/// be shared across threads and serve concurrent requests.
pub struct BodyAnalyzer {
    config: AnalyzerConfig,
    classifier: BodyTypeClassifier,
    face_detector: Arc<dyn FaceDetector>,
}

impl BodyAnalyzer {
    /// Create analyzer with default config and no face detector
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    /// Create analyzer with custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            classifier: BodyTypeClassifier::with_thresholds(config.body_type.clone()),
            config,
            face_detector: Arc::new(NoFaceDetector),
        }
    }

    /// Use `detector` whenever an input carries no face box
    pub fn with_face_detector(mut self, detector: Arc<dyn FaceDetector>) -> Self {
        self.face_detector = detector;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Run pose detection on `frame`, then analyze its output
    pub fn analyze_with(
        &self,
        pose_detector: &dyn PoseDetector,
        frame: Frame,
    ) -> Result<AnalysisResult, AnalysisError> {
        let detection = pose_detector
            .detect(&frame)
            .map_err(|e| AnalysisError::PoseDetector(e.to_string()))?
            .ok_or(AnalysisError::NoPersonDetected)?;

        log::debug!("Pose detector returned {} landmarks", detection.landmarks.len());

        self.analyze(&AnalysisInput {
            frame,
            landmarks: Some(detection.landmarks),
            segmentation_mask: detection.segmentation_mask,
            face_bbox: None,
        })
    }

    /// Analyze a single input
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        let frame = &input.frame;
        let (width, height) = (frame.width(), frame.height());

        // 1. Structural checks
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidDimensions { width, height });
        }
        let landmarks = input.landmarks.as_ref().ok_or(AnalysisError::NoLandmarks)?;
        if let Some(mask) = &input.segmentation_mask {
            mask.ensure_matches(frame)?;
        }

        let mut degradations = Vec::new();
        let mut diagnostics = AnalysisDiagnostics::default();

        // 2. Measurements
        let measurements = match estimate_measurements(landmarks, width, height, &self.config.measurement) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Measurement estimation failed ({e}), using default measurements");
                degradations.push(Degradation::MeasurementFallback(e.to_string()));
                MeasurementSet::fallback()
            }
        };

        // 3. Skin tone
        let face = self.resolve_face(input);
        let has_face_region = matches!(face, Ok(Some(_)));
        let skin = face.and_then(|face| {
            analyze_skin_tone(
                frame,
                input.segmentation_mask.as_ref(),
                face,
                &self.config.skin_tone,
            )
        });
        let skin_tone = match skin {
            Ok(reading) => {
                diagnostics.skin_tone = Some(reading);
                reading.label
            }
            Err(e) => {
                log::warn!("Skin tone sampling failed ({e}), using {}", SkinToneLabel::FALLBACK);
                degradations.push(Degradation::SkinToneFallback(e.to_string()));
                SkinToneLabel::FALLBACK
            }
        };

        // 4. Body type
        let body_type = match self.classifier.classify(&measurements) {
            Ok(result) => {
                log::debug!("Body type {} via rule {:?}", result.body_type, result.rule);
                diagnostics.body_type = Some(result);
                result.body_type
            }
            Err(e) => {
                log::warn!("Body type classification failed ({e}), using {}", BodyType::FALLBACK);
                degradations.push(Degradation::BodyTypeFallback(e.to_string()));
                BodyType::FALLBACK
            }
        };

        // 5. Confidence
        let confidence = match score_confidence(landmarks, &measurements, &self.config.confidence) {
            Ok(breakdown) => {
                diagnostics.confidence = Some(breakdown);
                breakdown.score
            }
            Err(e) => {
                log::warn!("Confidence scoring failed ({e}), using {:.2}", self.config.confidence.fallback);
                degradations.push(Degradation::ConfidenceFallback(e.to_string()));
                self.config.confidence.fallback
            }
        };

        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        let result = AnalysisResult {
            analysis_id: Uuid::new_v4(),
            measurements,
            skin_tone,
            body_type,
            confidence,
            degradations,
            analysis_version: ANALYSIS_VERSION.to_string(),
            processing_time_ms,
            timestamp: chrono::Utc::now().timestamp(),
            metadata: AnalysisMetadata {
                image_width: width,
                image_height: height,
                image_size: format!("{width}x{height}"),
                landmark_count: landmarks.len(),
                has_segmentation: input.segmentation_mask.is_some(),
                has_face_region,
            },
            diagnostics,
        };

        log::info!(
            "Analysis {} completed in {:.2}ms: {} / {} (confidence {:.2}, {} fallbacks)",
            result.analysis_id,
            processing_time_ms,
            result.skin_tone,
            result.body_type,
            result.confidence,
            result.degradations.len()
        );

        Ok(result)
    }

    // --- Private ---

    fn resolve_face(&self, input: &AnalysisInput) -> Result<Option<FaceBox>, SamplingError> {
        match input.face_bbox {
            Some(face) => Ok(Some(face)),
            None => Ok(self.face_detector.detect(&input.frame)?),
        }
    }
}

impl Default for BodyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
