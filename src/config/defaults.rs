//! Built-in default constants.
//!
//! Every tunable in `AnalysisConfig` starts from one of these values, so a
//! run with no config file behaves exactly like the hardcoded pipeline.
//! The ranking thresholds are hand-tuned heuristics awaiting calibration
//! against labelled swings.

// ============================================================================
// Smoothing
// ============================================================================

/// EMA weight given to the newest observation.
pub const SMOOTHING_ALPHA: f64 = 0.45;

/// Smallest alpha accepted before clamping; keeps the filter responsive.
pub const SMOOTHING_MIN_ALPHA: f64 = 0.001;

/// Consecutive rejected frames during which the last smoothed value is held.
pub const SMOOTHING_MAX_GAP: usize = 2;

/// Minimum landmark visibility for an observation to be accepted.
pub const SMOOTHING_MIN_VISIBILITY: f64 = 0.0;

/// Minimum landmark presence for an observation to be accepted.
pub const SMOOTHING_MIN_PRESENCE: f64 = 0.0;

/// Upper bound on alpha for visibility/presence series in interpolation mode.
pub const CONFIDENCE_CHANNEL_MAX_ALPHA: f64 = 0.15;

// ============================================================================
// Ranking: pose quality
// ============================================================================

/// Frame count at which clip length stops limiting pose quality.
pub const QUALITY_REFERENCE_FRAMES: f64 = 90.0;

/// Smallest clip-length factor applied to quality (short clips).
pub const QUALITY_MIN_FRAME_FACTOR: f64 = 0.5;

/// Lowest reported quality; confidence is never reported as zero.
pub const QUALITY_FLOOR: f64 = 35.0;

/// Highest reported quality; confidence is never reported as absolute.
pub const QUALITY_CEILING: f64 = 98.0;

// ============================================================================
// Ranking: confidence blend
// ============================================================================

/// Weight of pose quality in the confidence blend.
pub const CONFIDENCE_QUALITY_WEIGHT: f64 = 0.55;

/// Weight of fault signal strength in the confidence blend.
pub const CONFIDENCE_SIGNAL_WEIGHT: f64 = 0.45;

// ============================================================================
// Ranking: proxy thresholds
// ============================================================================

/// Separation proxy below which a low turn is signalled.
pub const LOW_TURN_SEP_THRESHOLD: f64 = 0.045;

/// Hip turn proxy below which a low turn is signalled.
pub const LOW_TURN_HIP_TURN_THRESHOLD: f64 = 0.70;

/// Separation proxy below which late hips are signalled.
pub const LATE_HIPS_SEP_THRESHOLD: f64 = 0.040;

// ============================================================================
// Ranking: scoring
// ============================================================================

/// Starting importance for any fault with a scoring rule or none at all.
pub const BASE_SCORE: f64 = 50.0;

/// Maximum score added by the separation proxy for `low_turn`.
pub const LOW_TURN_SEP_WEIGHT: f64 = 80.0;

/// Maximum score added by the hip turn proxy for `low_turn`.
pub const LOW_TURN_HIP_WEIGHT: f64 = 50.0;

/// Maximum score added by the separation proxy for `late_hips`.
pub const LATE_HIPS_SEP_WEIGHT: f64 = 70.0;

/// Score added to sway-type faults when the sway flag is set.
pub const SWAY_BONUS: f64 = 60.0;

/// Flat score for the generic `foundation` fallback.
pub const FALLBACK_SCORE: f64 = 10.0;

// ============================================================================
// Ranking: signal strength
// ============================================================================

/// Signal for faults with no proxy metric.
pub const BASELINE_SIGNAL: f64 = 35.0;

/// Signal for sway-type faults when the sway flag is set.
pub const SWAY_PRESENT_SIGNAL: f64 = 90.0;

/// Signal for sway-type faults when the sway flag is false or missing.
pub const SWAY_ABSENT_SIGNAL: f64 = 20.0;

/// Signal for the generic `foundation` fallback.
pub const FALLBACK_SIGNAL: f64 = 20.0;

// ============================================================================
// Report
// ============================================================================

/// Number of leading faults listed as top faults.
pub const TOP_FAULTS: usize = 3;

// ============================================================================
// Pose QC
// ============================================================================

/// Frames with fewer landmark slots than this count as missing.
pub const QC_MIN_LANDMARKS: usize = 10;

/// Landmark indices tracked by the jitter proxy: wrists, hips, ankles.
pub const QC_JITTER_LANDMARKS: [usize; 6] = [15, 16, 23, 24, 27, 28];
