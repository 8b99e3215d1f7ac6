#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::NamedTempFile;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_constants() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.measurement.height_band, Band::new(58.0, 78.0));
        assert_eq!(config.measurement.chest_per_shoulder, 1.15);
        assert_eq!(config.skin_tone.depth_thresholds, [0.25, 0.45, 0.65, 0.8]);
        assert_eq!(config.confidence.output_band, Band::new(0.65, 0.95));
        assert_eq!(config.confidence.expected_landmarks, 33);
    }

    #[test]
    fn test_band_clamp() {
        let band = Band::new(14.0, 24.0);
        assert_eq!(band.clamp(10.0), 14.0);
        assert_eq!(band.clamp(30.0), 24.0);
        assert_eq!(band.clamp(18.5), 18.5);
        assert_eq!(band.clamp(f64::NAN), 14.0);
        assert!(band.contains(24.0));
        assert!(!band.contains(24.01));
    }

    #[test]
    fn test_config_validation_measurement() {
        let mut config = AnalyzerConfig::default();
        config.measurement.height_band = Band::new(80.0, 60.0);
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.measurement.waist_per_chest = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_skin_tone() {
        let mut config = AnalyzerConfig::default();
        config.skin_tone.depth_thresholds = [0.25, 0.65, 0.45, 0.8];
        assert!(config.validate().is_err());

        let mut config = AnalyzerConfig::default();
        config.skin_tone.mask_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_confidence() {
        let mut config = AnalyzerConfig::default();
        config.confidence.expected_landmarks = 0;
        assert!(config.validate().is_err());

        // fallback must sit inside the output band
        let mut config = AnalyzerConfig::default();
        config.confidence.fallback = 0.99;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_to_toml_string_round_trips() {
        let config = AnalyzerConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("[measurement]"));
        assert!(toml_str.contains("[confidence]"));

        let parsed: AnalyzerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file_partial_sections_keep_defaults() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            "[measurement]\nbase_height_in = 64.0\n\n[confidence]\nbase = 0.55\n",
        )
        .unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.measurement.base_height_in, 64.0);
        assert_eq!(config.measurement.frame_fill_gain, 20.0);
        assert_eq!(config.confidence.base, 0.55);
        assert_eq!(config.body_type, BodyTypeConfig::default());
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[confidence]\nexpected_landmarks = 0\n").unwrap();
        assert!(matches!(
            AnalyzerConfig::from_file(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "[measurement\nbase_height_in = ").unwrap();
        assert!(matches!(
            AnalyzerConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_load_layered_missing_files_use_defaults() {
        let missing = std::path::Path::new("/nonexistent/bodylens.toml");
        let config = AnalyzerConfig::load_layered(Some(missing), Some(missing)).unwrap();
        assert_eq!(config.body_type, BodyTypeConfig::default());
    }

    #[test]
    fn test_load_layered_user_file_wins() {
        let defaults = NamedTempFile::new().unwrap();
        fs::write(defaults.path(), "[body_type]\napple_min_waist_ratio = 0.92\n").unwrap();
        let user = NamedTempFile::new().unwrap();
        fs::write(user.path(), "[body_type]\napple_min_waist_ratio = 0.95\n").unwrap();

        let config =
            AnalyzerConfig::load_layered(Some(defaults.path()), Some(user.path())).unwrap();
        assert_eq!(config.body_type.apple_min_waist_ratio, 0.95);
    }

    #[test]
    fn test_overrides_apply_parsed_values() {
        let mut config = AnalyzerConfig::default();
        config
            .apply_overrides_from(lookup(&[
                ("BODYLENS_MEASUREMENT_BASE_HEIGHT_IN", "63.5"),
                ("BODYLENS_SKIN_TONE_MIN_MASKED_PIXELS", " 250 "),
            ]))
            .unwrap();
        assert_eq!(config.measurement.base_height_in, 63.5);
        assert_eq!(config.skin_tone.min_masked_pixels, 250);
        assert_eq!(config.confidence.base, 0.5);
    }

    #[test]
    fn test_overrides_reject_garbage() {
        let mut config = AnalyzerConfig::default();
        let err = config
            .apply_overrides_from(lookup(&[("BODYLENS_CONFIDENCE_BASE", "high")]))
            .unwrap_err();
        assert!(err.to_string().contains("BODYLENS_CONFIDENCE_BASE"));
    }
}
