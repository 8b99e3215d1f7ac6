use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Closed interval used for clamps and plausibility checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Hard floor/ceiling. NaN input collapses to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Scale both ends, e.g. a chest-relative band to inches
    pub fn scaled(&self, factor: f64) -> Band {
        Band::new(self.min * factor, self.max * factor)
    }

    fn is_ordered(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// All tunable constants of the analysis pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub measurement: MeasurementConfig,
    pub skin_tone: SkinToneConfig,
    pub body_type: BodyTypeConfig,
    pub confidence: ConfidenceConfig,
}

/// Anthropometric ratios and plausibility bands (inches)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Height assigned to a body filling `frame_fill_reference` of the frame
    pub base_height_in: f64,
    /// Fraction of image height a person of `base_height_in` occupies
    pub frame_fill_reference: f64,
    /// Inches added per unit of frame fill above the reference
    pub frame_fill_gain: f64,
    pub height_band: Band,
    pub shoulder_band: Band,
    pub arm_length_band: Band,
    /// Hip band expressed as multiples of chest
    pub hip_to_chest_band: Band,
    pub chest_per_shoulder: f64,
    pub waist_per_chest: f64,
    pub neck_per_chest: f64,
    pub inseam_per_height: f64,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            base_height_in: 65.0,
            frame_fill_reference: 0.8,
            frame_fill_gain: 20.0,
            height_band: Band::new(58.0, 78.0),
            shoulder_band: Band::new(14.0, 24.0),
            arm_length_band: Band::new(22.0, 32.0),
            hip_to_chest_band: Band::new(0.9, 1.3),
            chest_per_shoulder: 1.15,
            waist_per_chest: 0.82,
            neck_per_chest: 0.40,
            inseam_per_height: 0.46,
        }
    }
}

/// Sampling and color thresholds for skin-tone classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinToneConfig {
    /// Mask confidence a pixel must exceed to count as foreground
    pub mask_threshold: f32,
    /// Masked pixels required (strictly more than) before the mask is used
    pub min_masked_pixels: usize,
    /// red/green above this marks a red-leaning sample
    pub warm_red_green: f64,
    /// red-leaning samples with blue/red below this are warm
    pub warm_blue_red: f64,
    /// blue/red above this is cool
    pub cool_blue_red: f64,
    /// HSV value upper bounds for deep, tan, medium, light (fair above)
    pub depth_thresholds: [f64; 4],
}

impl Default for SkinToneConfig {
    fn default() -> Self {
        Self {
            mask_threshold: 0.5,
            min_masked_pixels: 100,
            warm_red_green: 1.05,
            warm_blue_red: 0.9,
            cool_blue_red: 1.05,
            depth_thresholds: [0.25, 0.45, 0.65, 0.8],
        }
    }
}

/// Decision-list thresholds for body-shape classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTypeConfig {
    pub hourglass_max_waist_ratio: f64,
    pub hourglass_max_shoulder_hip_gap: f64,
    pub pear_min_hip_to_chest: f64,
    pub pear_max_waist_to_hip: f64,
    pub inverted_min_shoulder_to_hip: f64,
    pub inverted_min_waist_to_chest: f64,
    pub apple_min_waist_ratio: f64,
    pub rectangle_min_waist_ratio: f64,
    pub rectangle_max_shoulder_hip_gap: f64,
    /// Tiebreak: shoulder/hip above this falls back to inverted triangle
    pub fallback_shoulder_to_hip: f64,
    /// Tiebreak: hip/chest above this falls back to pear
    pub fallback_hip_to_chest: f64,
}

impl Default for BodyTypeConfig {
    fn default() -> Self {
        Self {
            hourglass_max_waist_ratio: 0.75,
            hourglass_max_shoulder_hip_gap: 2.0,
            pear_min_hip_to_chest: 1.05,
            pear_max_waist_to_hip: 0.8,
            inverted_min_shoulder_to_hip: 1.05,
            inverted_min_waist_to_chest: 0.85,
            apple_min_waist_ratio: 0.9,
            rectangle_min_waist_ratio: 0.8,
            rectangle_max_shoulder_hip_gap: 3.0,
            fallback_shoulder_to_hip: 1.1,
            fallback_hip_to_chest: 1.1,
        }
    }
}

/// Weights of the confidence heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base: f64,
    pub visibility_threshold: f64,
    pub max_visibility_bonus: f64,
    /// Landmark count the visibility fraction is scaled against
    pub expected_landmarks: usize,
    pub height_bonus: f64,
    pub plausible_height: Band,
    pub chest_bonus: f64,
    pub plausible_chest: Band,
    pub output_band: Band,
    /// Reported when the score cannot be computed
    pub fallback: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.5,
            visibility_threshold: 0.5,
            max_visibility_bonus: 0.3,
            expected_landmarks: 33,
            height_bonus: 0.1,
            plausible_height: Band::new(58.0, 78.0),
            chest_bonus: 0.1,
            plausible_chest: Band::new(28.0, 50.0),
            output_band: Band::new(0.65, 0.95),
            fallback: 0.80,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: AnalyzerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with BODYLENS_
    /// Example: BODYLENS_MEASUREMENT_BASE_HEIGHT_IN=64.0
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (if exists)
    /// 3. Default config file
    /// 4. Built-in defaults (lowest priority)
    pub fn load_layered(
        default_path: Option<&Path>,
        user_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut config = AnalyzerConfig::default();

        if let Some(path) = default_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        // Sections omitted from the user file keep their serde defaults,
        // so the user file replaces the default file wholesale.
        if let Some(path) = user_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (env-style keys)
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_with(&lookup, "BODYLENS_MEASUREMENT_BASE_HEIGHT_IN", &mut self.measurement.base_height_in)?;
        override_with(&lookup, "BODYLENS_MEASUREMENT_FRAME_FILL_REFERENCE", &mut self.measurement.frame_fill_reference)?;
        override_with(&lookup, "BODYLENS_MEASUREMENT_FRAME_FILL_GAIN", &mut self.measurement.frame_fill_gain)?;

        override_with(&lookup, "BODYLENS_SKIN_TONE_MASK_THRESHOLD", &mut self.skin_tone.mask_threshold)?;
        override_with(&lookup, "BODYLENS_SKIN_TONE_MIN_MASKED_PIXELS", &mut self.skin_tone.min_masked_pixels)?;

        override_with(&lookup, "BODYLENS_CONFIDENCE_BASE", &mut self.confidence.base)?;
        override_with(&lookup, "BODYLENS_CONFIDENCE_VISIBILITY_THRESHOLD", &mut self.confidence.visibility_threshold)?;
        override_with(&lookup, "BODYLENS_CONFIDENCE_EXPECTED_LANDMARKS", &mut self.confidence.expected_landmarks)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.measurement;
        for (name, band) in [
            ("measurement.height_band", m.height_band),
            ("measurement.shoulder_band", m.shoulder_band),
            ("measurement.arm_length_band", m.arm_length_band),
            ("measurement.hip_to_chest_band", m.hip_to_chest_band),
        ] {
            if !band.is_ordered() || band.min <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive band with min <= max"
                )));
            }
        }
        for (name, value) in [
            ("measurement.base_height_in", m.base_height_in),
            ("measurement.frame_fill_reference", m.frame_fill_reference),
            ("measurement.chest_per_shoulder", m.chest_per_shoulder),
            ("measurement.waist_per_chest", m.waist_per_chest),
            ("measurement.neck_per_chest", m.neck_per_chest),
            ("measurement.inseam_per_height", m.inseam_per_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!("{name} must be positive")));
            }
        }
        if !m.frame_fill_gain.is_finite() {
            return Err(ConfigError::Validation(
                "measurement.frame_fill_gain must be finite".to_string(),
            ));
        }

        let s = &self.skin_tone;
        if !(0.0..=1.0).contains(&s.mask_threshold) {
            return Err(ConfigError::Validation(
                "skin_tone.mask_threshold must be in [0, 1]".to_string(),
            ));
        }
        if !(s.warm_red_green > 0.0 && s.warm_blue_red > 0.0 && s.cool_blue_red > 0.0) {
            return Err(ConfigError::Validation(
                "skin_tone ratio thresholds must be positive".to_string(),
            ));
        }
        let d = s.depth_thresholds;
        if !(d[0] > 0.0 && d[0] < d[1] && d[1] < d[2] && d[2] < d[3] && d[3] <= 1.0) {
            return Err(ConfigError::Validation(
                "skin_tone.depth_thresholds must be strictly ascending within (0, 1]".to_string(),
            ));
        }

        let b = &self.body_type;
        if b.hourglass_max_shoulder_hip_gap < 0.0 || b.rectangle_max_shoulder_hip_gap < 0.0 {
            return Err(ConfigError::Validation(
                "body_type shoulder/hip gaps must be non-negative".to_string(),
            ));
        }

        let c = &self.confidence;
        if c.expected_landmarks == 0 {
            return Err(ConfigError::Validation(
                "confidence.expected_landmarks must be > 0".to_string(),
            ));
        }
        if !c.output_band.is_ordered() || c.output_band.min < 0.0 || c.output_band.max > 1.0 {
            return Err(ConfigError::Validation(
                "confidence.output_band must lie within [0, 1]".to_string(),
            ));
        }
        if !c.output_band.contains(c.fallback) {
            return Err(ConfigError::Validation(
                "confidence.fallback must lie within confidence.output_band".to_string(),
            ));
        }
        if !c.plausible_height.is_ordered() || !c.plausible_chest.is_ordered() {
            return Err(ConfigError::Validation(
                "confidence plausibility bands must have min <= max".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(val) = lookup(key) {
        *target = val
            .trim()
            .parse()
            .map_err(|_| ConfigError::Validation(format!("Invalid {key}: {val:?}")))?;
    }
    Ok(())
}
