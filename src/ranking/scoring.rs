//! Quality, signal, importance and confidence scoring.
//!
//! Every function is total: missing metrics resolve to configured
//! fallbacks and all arithmetic is clamped without panicking, even for a
//! config that skipped validation.

use crate::config::{ConfidenceBlendConfig, QualityConfig, RankingConfig};
use crate::types::{FaultKind, SwingMetrics};

/// `max(lo, min(hi, value))`; NaN-tolerant and never panics.
pub(crate) fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    lo.max(hi.min(value))
}

/// Clamp to [0, 100] and round to an integer percentage.
pub(crate) fn to_percent(value: f64) -> u8 {
    clamp(value, 0.0, 100.0).round() as u8
}

/// How far `value` sits below `threshold`, scaled to `[0, scale]`.
///
/// Zero at or above the threshold, `scale` at zero.
pub(crate) fn below_threshold(value: Option<f64>, threshold: f64, scale: f64) -> Option<f64> {
    value.map(|v| clamp((threshold - v) / threshold * scale, 0.0, scale))
}

/// Pose data quality, 0-100 within the configured floor and ceiling.
///
/// `okRate` defaults to 1.0 and `framesUsed` to 0. Short clips are
/// penalized down to `min_frame_factor` of the pose OK rate.
pub fn quality_score(metrics: &SwingMetrics, config: &QualityConfig) -> f64 {
    let ok_rate = metrics.ok_rate().unwrap_or(1.0);
    let frames = metrics.frames_used().unwrap_or(0.0);
    let frame_factor = clamp(frames / config.reference_frames, config.min_frame_factor, 1.0);
    clamp(ok_rate * 100.0 * frame_factor, config.floor, config.ceiling)
}

/// Strength of the metric evidence for a fault, 0-100.
pub fn signal_strength(kind: FaultKind, metrics: &SwingMetrics, config: &RankingConfig) -> f64 {
    let t = &config.thresholds;
    let s = &config.signals;

    match kind {
        FaultKind::LowTurn => [
            below_threshold(metrics.sep_med(), t.low_turn_sep, 100.0),
            below_threshold(metrics.hip_turn(), t.low_turn_hip_turn, 100.0),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f64::max),
        FaultKind::LateHips => {
            below_threshold(metrics.sep_med(), t.late_hips_sep, 100.0).unwrap_or(s.baseline)
        }
        FaultKind::Sway | FaultKind::ReversePivot => {
            if metrics.sway == Some(true) {
                s.sway_present
            } else {
                s.sway_absent
            }
        }
        FaultKind::Foundation => s.fallback,
        FaultKind::Other => s.baseline,
    }
}

/// Importance of a fault, 0-100.
///
/// Built additively from the base score and each proxy's distance below
/// its threshold. The generic fallback gets a flat low score.
pub fn importance_score(kind: FaultKind, metrics: &SwingMetrics, config: &RankingConfig) -> u8 {
    let t = &config.thresholds;
    let sc = &config.scoring;

    let score = match kind {
        FaultKind::LowTurn => {
            sc.base_score
                + below_threshold(metrics.sep_med(), t.low_turn_sep, sc.low_turn_sep_weight).unwrap_or(0.0)
                + below_threshold(metrics.hip_turn(), t.low_turn_hip_turn, sc.low_turn_hip_weight)
                    .unwrap_or(0.0)
        }
        FaultKind::LateHips => {
            sc.base_score
                + below_threshold(metrics.sep_med(), t.late_hips_sep, sc.late_hips_sep_weight).unwrap_or(0.0)
        }
        FaultKind::Sway | FaultKind::ReversePivot => {
            if metrics.sway == Some(true) {
                sc.base_score + sc.sway_bonus
            } else {
                sc.base_score
            }
        }
        FaultKind::Foundation => sc.fallback_score,
        FaultKind::Other => sc.base_score,
    };

    to_percent(score)
}

/// Blend data quality with signal strength into a 0-100 confidence.
///
/// Confidence stays bounded by quality when the signal is strong, and by
/// the signal when tracking is clean.
pub fn blended_confidence(quality: f64, signal: f64, blend: &ConfidenceBlendConfig) -> u8 {
    let signal = clamp(signal, 0.0, 100.0);
    to_percent(blend.quality_weight * quality + blend.signal_weight * signal)
}
