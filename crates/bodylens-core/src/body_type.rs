//! Body Shape Classification
//!
//! Ordered decision list over four proportion ratios. Rules are evaluated
//! top to bottom and the first match wins; a tiebreak default makes the
//! classifier total over all measurement sets with positive chest and hips.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::BodyTypeConfig;
use crate::measurements::MeasurementSet;

/// Body shape classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Hourglass,
    Pear,
    Apple,
    Rectangle,
    InvertedTriangle,
}

impl BodyType {
    pub const ALL: [BodyType; 5] = [
        BodyType::Hourglass,
        BodyType::Pear,
        BodyType::Apple,
        BodyType::Rectangle,
        BodyType::InvertedTriangle,
    ];

    /// Substituted when the ratios cannot be computed
    pub const FALLBACK: BodyType = BodyType::Rectangle;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourglass => "hourglass",
            Self::Pear => "pear",
            Self::Apple => "apple",
            Self::Rectangle => "rectangle",
            Self::InvertedTriangle => "inverted_triangle",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision-list rule that produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyTypeRule {
    Hourglass,
    Pear,
    InvertedTriangle,
    Apple,
    Rectangle,
    /// No rule matched; shoulders dominate hips
    DefaultInvertedTriangle,
    /// No rule matched; hips dominate chest
    DefaultPear,
    /// No rule matched and nothing dominates
    DefaultRectangle,
}

impl BodyTypeRule {
    pub fn body_type(&self) -> BodyType {
        match self {
            Self::Hourglass => BodyType::Hourglass,
            Self::Pear | Self::DefaultPear => BodyType::Pear,
            Self::InvertedTriangle | Self::DefaultInvertedTriangle => BodyType::InvertedTriangle,
            Self::Apple => BodyType::Apple,
            Self::Rectangle | Self::DefaultRectangle => BodyType::Rectangle,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(
            self,
            Self::DefaultInvertedTriangle | Self::DefaultPear | Self::DefaultRectangle
        )
    }
}

/// Classification failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("degenerate proportions (chest {chest}, hips {hips}): ratios undefined")]
    DegenerateRatio { chest: f64, hips: f64 },
}

/// Proportion ratios the rules test against
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyRatios {
    pub waist_to_chest: f64,
    pub waist_to_hip: f64,
    pub shoulder_to_hip: f64,
    pub hip_to_chest: f64,
    /// Absolute shoulder/hip difference in inches
    pub shoulder_hip_gap: f64,
}

impl BodyRatios {
    pub fn from_measurements(m: &MeasurementSet) -> Result<Self, ClassificationError> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(m.chest) || !usable(m.hips) {
            return Err(ClassificationError::DegenerateRatio {
                chest: m.chest,
                hips: m.hips,
            });
        }

        Ok(Self {
            waist_to_chest: m.waist / m.chest,
            waist_to_hip: m.waist / m.hips,
            shoulder_to_hip: m.shoulders / m.hips,
            hip_to_chest: m.hips / m.chest,
            shoulder_hip_gap: (m.shoulders - m.hips).abs(),
        })
    }
}

/// Classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyTypeResult {
    pub body_type: BodyType,
    pub rule: BodyTypeRule,
    pub ratios: BodyRatios,
}

/// Rule-based body shape classifier
#[derive(Debug, Clone, Default)]
pub struct BodyTypeClassifier {
    thresholds: BodyTypeConfig,
}

impl BodyTypeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: BodyTypeConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BodyTypeConfig {
        &self.thresholds
    }

    pub fn classify(&self, measurements: &MeasurementSet) -> Result<BodyTypeResult, ClassificationError> {
        let ratios = BodyRatios::from_measurements(measurements)?;
        let rule = self.select_rule(&ratios);
        Ok(BodyTypeResult {
            body_type: rule.body_type(),
            rule,
            ratios,
        })
    }

    /// First matching rule, in priority order
    pub fn select_rule(&self, r: &BodyRatios) -> BodyTypeRule {
        let t = &self.thresholds;

        if r.waist_to_chest <= t.hourglass_max_waist_ratio
            && r.waist_to_hip <= t.hourglass_max_waist_ratio
            && r.shoulder_hip_gap <= t.hourglass_max_shoulder_hip_gap
        {
            return BodyTypeRule::Hourglass;
        }

        if r.hip_to_chest >= t.pear_min_hip_to_chest && r.waist_to_hip <= t.pear_max_waist_to_hip {
            return BodyTypeRule::Pear;
        }

        if r.shoulder_to_hip >= t.inverted_min_shoulder_to_hip
            && r.waist_to_chest >= t.inverted_min_waist_to_chest
        {
            return BodyTypeRule::InvertedTriangle;
        }

        if r.waist_to_chest >= t.apple_min_waist_ratio && r.waist_to_hip >= t.apple_min_waist_ratio {
            return BodyTypeRule::Apple;
        }

        if r.waist_to_chest >= t.rectangle_min_waist_ratio
            && r.waist_to_hip >= t.rectangle_min_waist_ratio
            && r.shoulder_hip_gap <= t.rectangle_max_shoulder_hip_gap
        {
            return BodyTypeRule::Rectangle;
        }

        if r.shoulder_to_hip > t.fallback_shoulder_to_hip {
            BodyTypeRule::DefaultInvertedTriangle
        } else if r.hip_to_chest > t.fallback_hip_to_chest {
            BodyTypeRule::DefaultPear
        } else {
            BodyTypeRule::DefaultRectangle
        }
    }
}
