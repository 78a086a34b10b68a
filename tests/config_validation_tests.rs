//! Config Validation Tests
//!
//! Typo detection, range validation and file loading for the analysis
//! config, exercised independently from smoothing and ranking.

use std::io::Write;

use swing_insight::config::validation::{
    known_config_keys, suggest_correction, suspicious_value_warnings, validate_unknown_keys,
};
use swing_insight::config::{AnalysisConfig, ConfigError, SmoothingMethod};

// ============================================================================
// Typo Detection Tests
// ============================================================================

#[test]
fn typo_in_threshold_warns_with_suggestion() {
    let toml_str = r#"
[ranking.thresholds]
low_turn_sepp = 0.05
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("low_turn_sepp"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("ranking.thresholds.low_turn_sep"),
        "Should suggest the correct spelling"
    );
    assert!(warnings[0].to_string().contains("did you mean"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[smoothing]
alpha = 0.4
max_gap = 3
min_visibility = 0.5
min_presence = 0.5
method = "interpolate"

[ranking]
top_n = 2

[ranking.quality]
reference_frames = 120.0
min_frame_factor = 0.5
floor = 30.0
ceiling = 95.0

[ranking.confidence]
quality_weight = 0.6
signal_weight = 0.4

[ranking.thresholds]
low_turn_sep = 0.05
low_turn_hip_turn = 0.65
late_hips_sep = 0.035

[ranking.scoring]
base_score = 45.0
low_turn_sep_weight = 80.0
low_turn_hip_weight = 50.0
late_hips_sep_weight = 70.0
sway_bonus = 55.0
fallback_score = 10.0

[ranking.signals]
baseline = 35.0
sway_present = 90.0
sway_absent = 20.0
fallback = 20.0
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");

    let config = AnalysisConfig::from_toml_str(toml_str).unwrap();
    assert_eq!(config.smoothing.method, SmoothingMethod::Interpolate);
    assert_eq!(config.smoothing.max_gap, 3);
    assert_eq!(config.ranking.top_n, 2);
    assert_eq!(config.ranking.quality.reference_frames, 120.0);
}

#[test]
fn unknown_section_warns() {
    let toml_str = r#"
[smoothin]
alpha = 0.5
"#;
    let warnings = validate_unknown_keys(toml_str);
    // Both the section and its key are unknown
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].suggestion.as_deref(), Some("smoothing"));
}

#[test]
fn empty_toml_produces_zero_warnings() {
    assert!(validate_unknown_keys("").is_empty());
}

#[test]
fn known_keys_set_is_complete() {
    let keys = known_config_keys();
    for key in [
        "smoothing.alpha",
        "smoothing.method",
        "ranking.top_n",
        "ranking.quality.ceiling",
        "ranking.confidence.signal_weight",
        "ranking.scoring.fallback_score",
        "ranking.signals.sway_present",
    ] {
        assert!(keys.contains(key), "Missing known key: {key}");
    }
}

#[test]
fn known_keys_cover_serialized_defaults() {
    let toml_str = AnalysisConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&toml_str).is_empty());
}

#[test]
fn suggest_correction_returns_none_for_garbage() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("xyzzy_totally_wrong", &known), None);
}

// ============================================================================
// Range Validation Tests
// ============================================================================

#[test]
fn all_defaults_pass_validation() {
    AnalysisConfig::default().validate().unwrap();
    assert!(suspicious_value_warnings(&AnalysisConfig::default()).is_empty());
}

#[test]
fn zero_alpha_is_error() {
    let err = AnalysisConfig::from_toml_str("[smoothing]\nalpha = 0.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("smoothing.alpha"));
}

#[test]
fn alpha_of_one_is_valid_but_suspicious() {
    let config = AnalysisConfig::from_toml_str("[smoothing]\nalpha = 1.0\n").unwrap();
    let warnings = suspicious_value_warnings(&config);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "smoothing.alpha");
}

#[test]
fn floor_above_ceiling_is_error() {
    let toml_str = r#"
[ranking.quality]
floor = 90.0
ceiling = 40.0
"#;
    let err = AnalysisConfig::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("floor"));
}

#[test]
fn confidence_weights_must_sum_to_one() {
    let toml_str = r#"
[ranking.confidence]
quality_weight = 0.7
signal_weight = 0.7
"#;
    let err = AnalysisConfig::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("sum to 1.0"));
}

#[test]
fn zero_threshold_is_error() {
    let toml_str = r#"
[ranking.thresholds]
late_hips_sep = 0.0
"#;
    let err = AnalysisConfig::from_toml_str(toml_str).unwrap_err();
    assert!(err.to_string().contains("ranking.thresholds.late_hips_sep"));
}

#[test]
fn every_error_is_reported_at_once() {
    let toml_str = r#"
[smoothing]
alpha = 2.0
min_visibility = -0.1

[ranking]
top_n = 0
"#;
    match AnalysisConfig::from_toml_str(toml_str) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("Expected validation errors, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_parse_error() {
    let err = AnalysisConfig::from_toml_str("[smoothing]\nmax_gap = \"two\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn unknown_method_is_parse_error() {
    let err = AnalysisConfig::from_toml_str("[smoothing]\nmethod = \"kalman\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn partial_config_fills_defaults() {
    let config = AnalysisConfig::from_toml_str("[smoothing]\nalpha = 0.3\n").unwrap();
    assert_eq!(config.smoothing.alpha, 0.3);
    assert_eq!(config.smoothing.max_gap, 2);
    assert_eq!(config.ranking, AnalysisConfig::default().ranking);
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = AnalysisConfig::from_toml_str("[smoothing]\nalpah = 0.3\n").unwrap();
    assert_eq!(config, AnalysisConfig::default());
}

#[test]
fn load_from_file_reads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ranking]\ntop_n = 5").unwrap();
    let config = AnalysisConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.ranking.top_n, 5);
}

#[test]
fn load_from_file_parse_error_names_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[smoothing\nalpha = ").unwrap();
    match AnalysisConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse { path, .. }) => assert_eq!(path, file.path()),
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AnalysisConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

// ============================================================================
// Config Roundtrip Tests
// ============================================================================

#[test]
fn config_roundtrip_preserves_values() {
    let mut config = AnalysisConfig::default();
    config.smoothing.alpha = 0.25;
    config.smoothing.method = SmoothingMethod::Interpolate;
    config.ranking.thresholds.low_turn_sep = 0.05;

    let toml_str = config.to_toml().unwrap();
    let parsed = AnalysisConfig::from_toml_str(&toml_str).unwrap();
    assert_eq!(parsed, config);
}
