//! Skin Tone Analysis
//!
//! Samples skin color from the face box (or the upper torso when no face is
//! available) and classifies it into a depth/temperature label such as
//! `fair_warm`. The classifier is a colorimetric heuristic: deterministic for
//! identical pixels, not calibrated against ground truth.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::SkinToneConfig;
use crate::frame::{Frame, PixelRegion, SegmentationMask};
use crate::perception::{DetectorError, FaceBox};

/// Skin depth classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkinDepth {
    Fair,
    Light,
    Medium,
    Tan,
    Deep,
}

impl SkinDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fair => "fair",
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Tan => "tan",
            Self::Deep => "deep",
        }
    }
}

/// Undertone temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temperature {
    Warm,
    Cool,
    Neutral,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Neutral => "neutral",
        }
    }
}

/// Composite `depth_temperature` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkinToneLabel {
    pub depth: SkinDepth,
    pub temperature: Temperature,
}

impl SkinToneLabel {
    /// Substituted when sampling fails
    pub const FALLBACK: SkinToneLabel = SkinToneLabel {
        depth: SkinDepth::Medium,
        temperature: Temperature::Neutral,
    };

    pub const fn new(depth: SkinDepth, temperature: Temperature) -> Self {
        Self { depth, temperature }
    }
}

impl fmt::Display for SkinToneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.depth.as_str(), self.temperature.as_str())
    }
}

/// Unrecognized skin tone label text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown skin tone label: {0:?}")]
pub struct ParseSkinToneError(String);

impl FromStr for SkinToneLabel {
    type Err = ParseSkinToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSkinToneError(s.to_string());
        let (depth, temperature) = s.split_once('_').ok_or_else(err)?;

        let depth = match depth {
            "fair" => SkinDepth::Fair,
            "light" => SkinDepth::Light,
            "medium" => SkinDepth::Medium,
            "tan" => SkinDepth::Tan,
            "deep" => SkinDepth::Deep,
            _ => return Err(err()),
        };
        let temperature = match temperature {
            "warm" => Temperature::Warm,
            "cool" => Temperature::Cool,
            "neutral" => Temperature::Neutral,
            _ => return Err(err()),
        };
        Ok(Self { depth, temperature })
    }
}

impl Serialize for SkinToneLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SkinToneLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Hue, saturation, value, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Convert normalized RGB to HSV.
///
/// Hue wraps into [0, 1] so magenta-side colors come out near 1 rather
/// than negative.
pub fn rgb_to_hsv(rgb: [f64; 3]) -> Hsv {
    let [r, g, b] = rgb;
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let v = maxc;
    if maxc == minc {
        return Hsv { h: 0.0, s: 0.0, v };
    }

    let delta = maxc - minc;
    let s = delta / maxc;
    let rc = (maxc - r) / delta;
    let gc = (maxc - g) / delta;
    let bc = (maxc - b) / delta;

    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    Hsv {
        h: (h / 6.0).rem_euclid(1.0),
        s,
        v,
    }
}

/// Where the skin sample was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleSource {
    /// Pixels inside the face box
    FaceRegion,
    /// Upper-torso pixels the segmentation mask marks as foreground
    MaskedUpperTorso,
    /// Every pixel of the upper-torso region
    UpperTorso,
}

/// Averaged color sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorSample {
    /// Mean RGB normalized to [0, 1]
    pub mean_rgb: [f64; 3],
    pub pixel_count: u64,
    pub source: SampleSource,
}

/// Skin sampling failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("{0:?} region contains no pixels")]
    EmptyRegion(SampleSource),

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// Sample the mean skin color of the frame.
///
/// With a face box only pixels inside it are averaged. Otherwise the upper
/// torso region is used, restricted to mask foreground when the mask keeps
/// more than `min_masked_pixels` pixels there.
pub fn sample_skin(
    frame: &Frame,
    mask: Option<&SegmentationMask>,
    face: Option<FaceBox>,
    config: &SkinToneConfig,
) -> Result<ColorSample, SamplingError> {
    let (width, height) = (frame.width(), frame.height());

    if let Some(face) = face {
        let sum = frame.region_sum(face.to_pixel_region(width, height));
        return to_sample(sum.mean(), sum.count, SampleSource::FaceRegion);
    }

    let region = PixelRegion::upper_torso(width, height);

    if let Some(mask) = mask {
        let masked = frame.masked_region_sum(region, |x, y| mask.get(x, y) > config.mask_threshold);
        if masked.count > config.min_masked_pixels as u64 {
            return to_sample(masked.mean(), masked.count, SampleSource::MaskedUpperTorso);
        }
        log::debug!(
            "Only {} masked pixels in upper torso, sampling the whole region",
            masked.count
        );
    }

    let sum = frame.region_sum(region);
    to_sample(sum.mean(), sum.count, SampleSource::UpperTorso)
}

fn to_sample(
    mean: Option<[f64; 3]>,
    pixel_count: u64,
    source: SampleSource,
) -> Result<ColorSample, SamplingError> {
    let [r, g, b] = mean.ok_or(SamplingError::EmptyRegion(source))?;
    Ok(ColorSample {
        mean_rgb: [r / 255.0, g / 255.0, b / 255.0],
        pixel_count,
        source,
    })
}

/// Classify undertone from channel ratios.
///
/// The red test runs first: a red-leaning sample is never cool, even when
/// its blue/red ratio would qualify.
pub fn classify_temperature(rgb: [f64; 3], config: &SkinToneConfig) -> Temperature {
    let [r, g, b] = rgb;
    let red_to_green = if g != 0.0 { r / g } else { 1.0 };
    let blue_to_red = if r != 0.0 { b / r } else { 1.0 };

    if red_to_green > config.warm_red_green {
        if blue_to_red < config.warm_blue_red {
            Temperature::Warm
        } else {
            Temperature::Neutral
        }
    } else if blue_to_red > config.cool_blue_red {
        Temperature::Cool
    } else {
        Temperature::Neutral
    }
}

/// Classify depth from HSV value
pub fn classify_depth(value: f64, config: &SkinToneConfig) -> SkinDepth {
    let [deep, tan, medium, light] = config.depth_thresholds;
    if value < deep {
        SkinDepth::Deep
    } else if value < tan {
        SkinDepth::Tan
    } else if value < medium {
        SkinDepth::Medium
    } else if value < light {
        SkinDepth::Light
    } else {
        SkinDepth::Fair
    }
}

/// Individual Typology Angle in degrees (0 when red equals green).
///
/// Reported for diagnostics only; classification does not read it.
pub fn individual_typology_angle(rgb: [f64; 3], value: f64) -> f64 {
    let [r, g, _] = rgb;
    if r - g == 0.0 {
        return 0.0;
    }
    ((value - 0.3) / (r - g)).atan().to_degrees()
}

/// Full classification of one color sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SkinToneReading {
    pub label: SkinToneLabel,
    pub sample: ColorSample,
    pub hsv: Hsv,
    /// Not used by the label
    pub ita_degrees: f64,
}

impl SkinToneReading {
    pub fn from_sample(sample: ColorSample, config: &SkinToneConfig) -> Self {
        let hsv = rgb_to_hsv(sample.mean_rgb);
        let label = SkinToneLabel::new(
            classify_depth(hsv.v, config),
            classify_temperature(sample.mean_rgb, config),
        );
        Self {
            label,
            sample,
            hsv,
            ita_degrees: individual_typology_angle(sample.mean_rgb, hsv.v),
        }
    }
}

/// Sample and classify in one step
pub fn analyze_skin_tone(
    frame: &Frame,
    mask: Option<&SegmentationMask>,
    face: Option<FaceBox>,
    config: &SkinToneConfig,
) -> Result<SkinToneReading, SamplingError> {
    let sample = sample_skin(frame, mask, face, config)?;
    let reading = SkinToneReading::from_sample(sample, config);
    log::debug!(
        "Skin sample {:?} ({} px): rgb={:.3?} v={:.3} ita={:.1} -> {}",
        sample.source,
        sample.pixel_count,
        sample.mean_rgb,
        reading.hsv.v,
        reading.ita_degrees,
        reading.label
    );
    Ok(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn classify(rgb: [f64; 3]) -> SkinToneLabel {
        let sample = ColorSample {
            mean_rgb: rgb,
            pixel_count: 1,
            source: SampleSource::UpperTorso,
        };
        SkinToneReading::from_sample(sample, &SkinToneConfig::default()).label
    }

    #[test]
    fn test_fair_warm() {
        let label = classify([0.9, 0.75, 0.7]);
        assert_eq!(label, SkinToneLabel::new(SkinDepth::Fair, Temperature::Warm));
        assert_eq!(label.to_string(), "fair_warm");
    }

    #[test]
    fn test_red_leaning_never_cool() {
        // r/g = 1.2 and b/r = 1.17: the red branch wins, yielding neutral
        let t = classify_temperature([0.6, 0.5, 0.7], &SkinToneConfig::default());
        assert_eq!(t, Temperature::Neutral);

        let t = classify_temperature([0.5, 0.5, 0.6], &SkinToneConfig::default());
        assert_eq!(t, Temperature::Cool);
    }

    #[test]
    fn test_zero_channels_use_unit_ratios() {
        let config = SkinToneConfig::default();
        assert_eq!(classify_temperature([0.5, 0.0, 0.2], &config), Temperature::Neutral);
        assert_eq!(classify_temperature([0.0, 0.0, 0.0], &config), Temperature::Neutral);
    }

    #[test]
    fn test_depth_boundaries() {
        let config = SkinToneConfig::default();
        assert_eq!(classify_depth(0.2, &config), SkinDepth::Deep);
        assert_eq!(classify_depth(0.25, &config), SkinDepth::Tan);
        assert_eq!(classify_depth(0.5, &config), SkinDepth::Medium);
        assert_eq!(classify_depth(0.65, &config), SkinDepth::Light);
        assert_eq!(classify_depth(0.8, &config), SkinDepth::Fair);
    }

    #[test]
    fn test_rgb_to_hsv() {
        let red = rgb_to_hsv([1.0, 0.0, 0.0]);
        assert_eq!((red.h, red.s, red.v), (0.0, 1.0, 1.0));

        let blue = rgb_to_hsv([0.0, 0.0, 1.0]);
        assert_relative_eq!(blue.h, 2.0 / 3.0, epsilon = 1e-12);

        let magenta = rgb_to_hsv([1.0, 0.0, 1.0]);
        assert_relative_eq!(magenta.h, 5.0 / 6.0, epsilon = 1e-12);

        let gray = rgb_to_hsv([0.4, 0.4, 0.4]);
        assert_eq!((gray.h, gray.s, gray.v), (0.0, 0.0, 0.4));
    }

    #[test]
    fn test_ita_diagnostic() {
        assert_eq!(individual_typology_angle([0.5, 0.5, 0.1], 0.5), 0.0);
        // atan(0.3 / 0.3) = 45 degrees
        assert_relative_eq!(
            individual_typology_angle([0.6, 0.3, 0.2], 0.6),
            45.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_label_parse_and_serde() {
        let label: SkinToneLabel = "medium_neutral".parse().unwrap();
        assert_eq!(label, SkinToneLabel::FALLBACK);
        assert!("medium".parse::<SkinToneLabel>().is_err());
        assert!("beige_warm".parse::<SkinToneLabel>().is_err());

        let json = serde_json::to_string(&SkinToneLabel::new(SkinDepth::Deep, Temperature::Cool)).unwrap();
        assert_eq!(json, "\"deep_cool\"");
        let back: SkinToneLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.depth, SkinDepth::Deep);
    }

    #[test]
    fn test_face_region_sampled() {
        let mut frame = Frame::filled(20, 20, [30, 30, 30]).unwrap();
        frame.fill_region(PixelRegion::new(5, 5, 15, 15), [230, 190, 170]);

        let face = FaceBox::new(0.25, 0.25, 0.5, 0.5);
        let sample = sample_skin(&frame, None, Some(face), &SkinToneConfig::default()).unwrap();
        assert_eq!(sample.source, SampleSource::FaceRegion);
        assert_eq!(sample.pixel_count, 100);
        assert_relative_eq!(sample.mean_rgb[0], 230.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_face_outside_frame_is_empty() {
        let frame = Frame::filled(20, 20, [30, 30, 30]).unwrap();
        let face = FaceBox::new(1.5, 1.5, 0.2, 0.2);
        assert_eq!(
            sample_skin(&frame, None, Some(face), &SkinToneConfig::default()),
            Err(SamplingError::EmptyRegion(SampleSource::FaceRegion))
        );
    }

    fn torso_fixture(mask_rows: u32) -> (Frame, SegmentationMask) {
        // 40x30 image: upper torso is columns 10..30, rows 0..10 (200 px)
        let mut frame = Frame::filled(40, 30, [100, 100, 100]).unwrap();
        let mut mask = SegmentationMask::filled(40, 30, 0.0).unwrap();
        for y in 0..mask_rows {
            for x in 10..30 {
                frame.set_pixel(x, y, [200, 150, 120]);
                mask.set(x, y, 0.9);
            }
        }
        (frame, mask)
    }

    #[test]
    fn test_masked_torso_used_above_pixel_floor() {
        let (frame, mask) = torso_fixture(6); // 120 masked pixels
        let sample = sample_skin(&frame, Some(&mask), None, &SkinToneConfig::default()).unwrap();
        assert_eq!(sample.source, SampleSource::MaskedUpperTorso);
        assert_eq!(sample.pixel_count, 120);
        assert_relative_eq!(sample.mean_rgb[1], 150.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mask_at_pixel_floor_falls_back_to_region() {
        let (frame, mask) = torso_fixture(5); // exactly 100 masked pixels
        let sample = sample_skin(&frame, Some(&mask), None, &SkinToneConfig::default()).unwrap();
        assert_eq!(sample.source, SampleSource::UpperTorso);
        assert_eq!(sample.pixel_count, 200);
        assert_relative_eq!(sample.mean_rgb[0], 150.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tiny_frame_has_empty_torso() {
        let frame = Frame::filled(3, 2, [100, 100, 100]).unwrap();
        assert_eq!(
            analyze_skin_tone(&frame, None, None, &SkinToneConfig::default()),
            Err(SamplingError::EmptyRegion(SampleSource::UpperTorso))
        );
    }

    #[test]
    fn test_identical_pixels_classify_identically() {
        let (frame, mask) = torso_fixture(8);
        let config = SkinToneConfig::default();
        let a = analyze_skin_tone(&frame, Some(&mask), None, &config).unwrap();
        let b = analyze_skin_tone(&frame.clone(), Some(&mask.clone()), None, &config).unwrap();
        assert_eq!(a, b);
    }
}
