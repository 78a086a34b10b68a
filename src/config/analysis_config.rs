//! Analysis Configuration - smoothing and ranking tunables as TOML values
//!
//! Each struct implements `Default` with values from `defaults`, so a missing
//! file or a missing section behaves exactly like the built-in pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults::*;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SWING_INSIGHT_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "swing_insight.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `AnalysisConfig::load()` which searches:
/// 1. `$SWING_INSIGHT_CONFIG`
/// 2. `./swing_insight.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Landmark smoothing parameters
    #[serde(default)]
    pub smoothing: SmoothingConfig,

    /// Fault ranking heuristics
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl AnalysisConfig {
    /// Load configuration using the standard search order.
    ///
    /// Files that fail to load are logged and skipped; this never fails.
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded analysis config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./swing_insight.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded analysis config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings and otherwise ignored.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        for w in super::validation::suspicious_value_warnings(&config) {
            warn!("{}", w);
        }
        Ok(config)
    }

    /// Serialize the effective config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Smoothing alpha in (0, 1]; visibility/presence thresholds in [0, 1]
    /// - Proxy thresholds and the reference frame count must be > 0 (divisors)
    /// - Quality floor <= ceiling, both within [0, 100]
    /// - Confidence blend weights are non-negative and sum to ~1.0
    /// - At least one top fault is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let s = &self.smoothing;
        if !s.alpha.is_finite() || s.alpha <= 0.0 || s.alpha > 1.0 {
            errors.push(format!("smoothing.alpha = {} must be in (0, 1]", s.alpha));
        }
        Self::check_unit_range(s.min_visibility, "smoothing.min_visibility", &mut errors);
        Self::check_unit_range(s.min_presence, "smoothing.min_presence", &mut errors);

        let r = &self.ranking;
        if r.top_n == 0 {
            errors.push("ranking.top_n must be >= 1".to_string());
        }

        let q = &r.quality;
        Self::check_positive(q.reference_frames, "ranking.quality.reference_frames", &mut errors);
        if !q.min_frame_factor.is_finite() || q.min_frame_factor <= 0.0 || q.min_frame_factor > 1.0 {
            errors.push(format!(
                "ranking.quality.min_frame_factor = {} must be in (0, 1]",
                q.min_frame_factor
            ));
        }
        Self::check_percent(q.floor, "ranking.quality.floor", &mut errors);
        Self::check_percent(q.ceiling, "ranking.quality.ceiling", &mut errors);
        if q.floor > q.ceiling {
            errors.push(format!(
                "ranking.quality: floor ({:.1}) must be <= ceiling ({:.1})",
                q.floor, q.ceiling
            ));
        }

        let c = &r.confidence;
        Self::check_non_negative(c.quality_weight, "ranking.confidence.quality_weight", &mut errors);
        Self::check_non_negative(c.signal_weight, "ranking.confidence.signal_weight", &mut errors);
        let weight_sum = c.quality_weight + c.signal_weight;
        if (weight_sum - 1.0).abs() > 0.01 {
            errors.push(format!(
                "ranking.confidence: weights must sum to 1.0 (got {weight_sum:.3})"
            ));
        }

        let t = &r.thresholds;
        Self::check_positive(t.low_turn_sep, "ranking.thresholds.low_turn_sep", &mut errors);
        Self::check_positive(t.low_turn_hip_turn, "ranking.thresholds.low_turn_hip_turn", &mut errors);
        Self::check_positive(t.late_hips_sep, "ranking.thresholds.late_hips_sep", &mut errors);

        let sc = &r.scoring;
        for (value, name) in [
            (sc.base_score, "ranking.scoring.base_score"),
            (sc.low_turn_sep_weight, "ranking.scoring.low_turn_sep_weight"),
            (sc.low_turn_hip_weight, "ranking.scoring.low_turn_hip_weight"),
            (sc.late_hips_sep_weight, "ranking.scoring.late_hips_sep_weight"),
            (sc.sway_bonus, "ranking.scoring.sway_bonus"),
            (sc.fallback_score, "ranking.scoring.fallback_score"),
        ] {
            Self::check_non_negative(value, name, &mut errors);
        }

        let sg = &r.signals;
        for (value, name) in [
            (sg.baseline, "ranking.signals.baseline"),
            (sg.sway_present, "ranking.signals.sway_present"),
            (sg.sway_absent, "ranking.signals.sway_absent"),
            (sg.fallback, "ranking.signals.fallback"),
        ] {
            Self::check_percent(value, name, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_unit_range(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} = {value} must be in [0, 1]"));
        }
    }

    fn check_percent(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            errors.push(format!("{name} = {value} must be in [0, 100]"));
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so check finiteness first
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} = {value} must be > 0 (used as divisor)"));
        }
    }

    fn check_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{name} = {value} cannot be negative"));
        }
    }
}

/// Errors loading, parsing or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error ({}): {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Smoothing
// ============================================================================

/// Which smoothing strategy to run over a pose sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMethod {
    /// Streaming EMA, holding the last value through short gaps
    #[default]
    Ema,
    /// Offline: interpolate short interior gaps, then EMA each channel
    Interpolate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub alpha: f64,
    pub max_gap: usize,
    pub min_visibility: f64,
    pub min_presence: f64,
    pub method: SmoothingMethod,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: SMOOTHING_ALPHA,
            max_gap: SMOOTHING_MAX_GAP,
            min_visibility: SMOOTHING_MIN_VISIBILITY,
            min_presence: SMOOTHING_MIN_PRESENCE,
            method: SmoothingMethod::Ema,
        }
    }
}

// ============================================================================
// Ranking
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of leading faults reported as top faults
    pub top_n: usize,
    pub quality: QualityConfig,
    pub confidence: ConfidenceBlendConfig,
    pub thresholds: ProxyThresholds,
    pub scoring: ScoringConfig,
    pub signals: SignalConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: TOP_FAULTS,
            quality: QualityConfig::default(),
            confidence: ConfidenceBlendConfig::default(),
            thresholds: ProxyThresholds::default(),
            scoring: ScoringConfig::default(),
            signals: SignalConfig::default(),
        }
    }
}

/// How pose tracking quality maps to a 0-100 quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub reference_frames: f64,
    pub min_frame_factor: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            reference_frames: QUALITY_REFERENCE_FRAMES,
            min_frame_factor: QUALITY_MIN_FRAME_FACTOR,
            floor: QUALITY_FLOOR,
            ceiling: QUALITY_CEILING,
        }
    }
}

/// Weights of the quality/signal confidence blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceBlendConfig {
    pub quality_weight: f64,
    pub signal_weight: f64,
}

impl Default for ConfidenceBlendConfig {
    fn default() -> Self {
        Self {
            quality_weight: CONFIDENCE_QUALITY_WEIGHT,
            signal_weight: CONFIDENCE_SIGNAL_WEIGHT,
        }
    }
}

/// Proxy values below which a fault is signalled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyThresholds {
    pub low_turn_sep: f64,
    pub low_turn_hip_turn: f64,
    pub late_hips_sep: f64,
}

impl Default for ProxyThresholds {
    fn default() -> Self {
        Self {
            low_turn_sep: LOW_TURN_SEP_THRESHOLD,
            low_turn_hip_turn: LOW_TURN_HIP_TURN_THRESHOLD,
            late_hips_sep: LATE_HIPS_SEP_THRESHOLD,
        }
    }
}

/// Additive importance terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: f64,
    pub low_turn_sep_weight: f64,
    pub low_turn_hip_weight: f64,
    pub late_hips_sep_weight: f64,
    pub sway_bonus: f64,
    pub fallback_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: BASE_SCORE,
            low_turn_sep_weight: LOW_TURN_SEP_WEIGHT,
            low_turn_hip_weight: LOW_TURN_HIP_WEIGHT,
            late_hips_sep_weight: LATE_HIPS_SEP_WEIGHT,
            sway_bonus: SWAY_BONUS,
            fallback_score: FALLBACK_SCORE,
        }
    }
}

/// Fixed signal strengths for faults without a graded proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub baseline: f64,
    pub sway_present: f64,
    pub sway_absent: f64,
    pub fallback: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            baseline: BASELINE_SIGNAL,
            sway_present: SWAY_PRESENT_SIGNAL,
            sway_absent: SWAY_ABSENT_SIGNAL,
            fallback: FALLBACK_SIGNAL,
        }
    }
}
