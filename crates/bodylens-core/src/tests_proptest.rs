use proptest::prelude::*;

/// Property-based tests for the pipeline's bounded-output guarantees

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body_type::{BodyType, BodyTypeClassifier};
    use crate::confidence::score_confidence;
    use crate::config::{ConfidenceConfig, MeasurementConfig, SkinToneConfig};
    use crate::landmarks::{Landmark, LandmarkSet};
    use crate::measurements::{estimate_measurements, MeasurementSet};
    use crate::skin_tone::{ColorSample, SampleSource, SkinToneReading};

    fn landmark() -> impl Strategy<Value = Landmark> {
        (-0.5f64..1.5, -0.5f64..1.5, -1.0f64..1.0, 0.0f64..1.0)
            .prop_map(|(x, y, z, v)| Landmark::new(x, y, z, v))
    }

    fn landmark_set(min: usize, max: usize) -> impl Strategy<Value = LandmarkSet> {
        prop::collection::vec(landmark(), min..=max).prop_map(LandmarkSet::from)
    }

    // =========================================================================
    // Test 1: Every estimate respects its band
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn test_measurements_within_bands(
            set in landmark_set(33, 33),
            width in 16u32..4000,
            height in 16u32..4000,
        ) {
            let config = MeasurementConfig::default();
            if let Ok(m) = estimate_measurements(&set, width, height, &config) {
                prop_assert!(config.height_band.contains(m.height));
                prop_assert!(config.shoulder_band.contains(m.shoulders));
                prop_assert!(config.arm_length_band.contains(m.arm_length));

                // Hips are banded against the unrounded chest; allow rounding slack
                let hips = config.hip_to_chest_band.scaled(m.chest);
                prop_assert!(m.hips >= hips.min - 0.15 && m.hips <= hips.max + 0.15,
                    "hips {} outside [{}, {}]", m.hips, hips.min, hips.max);

                for (name, value) in m.named() {
                    prop_assert!(value.is_finite() && value > 0.0, "{} = {}", name, value);
                }
            }
        }
    }

    // =========================================================================
    // Test 2: Classifier is total over positive measurements
    // =========================================================================
    proptest! {
        #[test]
        fn test_body_type_total(
            shoulders in 1.0f64..60.0,
            chest in 1.0f64..60.0,
            waist in 1.0f64..60.0,
            hips in 1.0f64..60.0,
        ) {
            let m = MeasurementSet { shoulders, chest, waist, hips, ..MeasurementSet::fallback() };
            let result = BodyTypeClassifier::new().classify(&m);
            prop_assert!(result.is_ok());
            let result = result.unwrap();
            prop_assert!(BodyType::ALL.contains(&result.body_type));
            prop_assert_eq!(result.rule.body_type(), result.body_type);
        }
    }

    // =========================================================================
    // Test 3: Confidence stays in the output band
    // =========================================================================
    proptest! {
        #[test]
        fn test_confidence_bounded(
            set in landmark_set(0, 60),
            height in 0.0f64..120.0,
            chest in 0.0f64..80.0,
        ) {
            let config = ConfidenceConfig::default();
            let m = MeasurementSet { height, chest, ..MeasurementSet::fallback() };
            let breakdown = score_confidence(&set, &m, &config).unwrap();
            prop_assert!(breakdown.score >= 0.65 && breakdown.score <= 0.95);
            // two decimals
            prop_assert!(((breakdown.score * 100.0).round() - breakdown.score * 100.0).abs() < 1e-9);
        }
    }

    // =========================================================================
    // Test 4: Skin tone classification is a pure function of the color
    // =========================================================================
    proptest! {
        #[test]
        fn test_skin_tone_deterministic(r in 0.0f64..=1.0, g in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let config = SkinToneConfig::default();
            let sample = ColorSample { mean_rgb: [r, g, b], pixel_count: 1, source: SampleSource::UpperTorso };
            let first = SkinToneReading::from_sample(sample, &config);
            let second = SkinToneReading::from_sample(sample, &config);
            prop_assert_eq!(first.label, second.label);
            prop_assert!(first.hsv.h >= 0.0 && first.hsv.h <= 1.0);
            prop_assert!(first.hsv.v >= 0.0 && first.hsv.v <= 1.0);
        }
    }
}
