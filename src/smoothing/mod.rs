//! Landmark Smoothing
//!
//! Temporal stabilization of per-frame pose landmarks before angle and
//! metric extraction.
//!
//! ## Strategies
//! - `ema`: streaming exponential moving average per landmark index. Short
//!   tracking dropouts hold the last smoothed value; longer ones, or any
//!   change in skeleton layout, reset the state.
//! - `interpolate`: offline variant. Short interior gaps are linearly
//!   interpolated first, then each coordinate and confidence channel gets
//!   its own EMA.
//! - `document`: applies either strategy to loosely-shaped pose JSON.
//!
//! All entry points borrow the input and return a new sequence.

mod ema;
mod interpolate;
mod document;

pub use ema::{smooth, smooth_with_stats, SmoothingStats};
pub use interpolate::{interpolate_and_smooth, SMOOTHED_KEY};
pub use document::{decode_frames, frame_array, smooth_document, smooth_frames};

use serde_json::{json, Value};

use crate::config::defaults::{
    SMOOTHING_ALPHA, SMOOTHING_MAX_GAP, SMOOTHING_MIN_ALPHA, SMOOTHING_MIN_PRESENCE,
    SMOOTHING_MIN_VISIBILITY,
};
use crate::config::SmoothingConfig;

/// Parameters for one smoothing run.
///
/// Values are stored as given. Accessors sanitize them: alpha is clamped
/// into `[SMOOTHING_MIN_ALPHA, 1.0]` and non-finite values fall back to the
/// defaults, so a bad parameter degrades smoothing instead of corrupting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    /// Weight of the newest observation, (0, 1]
    pub alpha: f64,
    /// Rejected frames to bridge by holding the last value
    pub max_gap: usize,
    /// Minimum visibility for an accepted observation
    pub min_visibility: f64,
    /// Minimum presence for an accepted observation
    pub min_presence: f64,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            alpha: SMOOTHING_ALPHA,
            max_gap: SMOOTHING_MAX_GAP,
            min_visibility: SMOOTHING_MIN_VISIBILITY,
            min_presence: SMOOTHING_MIN_PRESENCE,
        }
    }
}

impl SmoothingParams {
    pub fn new(alpha: f64, max_gap: usize, min_visibility: f64, min_presence: f64) -> Self {
        Self {
            alpha,
            max_gap,
            min_visibility,
            min_presence,
        }
    }

    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self::new(
            config.alpha,
            config.max_gap,
            config.min_visibility,
            config.min_presence,
        )
    }

    /// Parameters from the installed global config, or built-in defaults.
    pub fn current() -> Self {
        Self::from_config(&crate::config::get().smoothing)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_max_gap(mut self, max_gap: usize) -> Self {
        self.max_gap = max_gap;
        self
    }

    pub fn with_min_visibility(mut self, min_visibility: f64) -> Self {
        self.min_visibility = min_visibility;
        self
    }

    pub fn with_min_presence(mut self, min_presence: f64) -> Self {
        self.min_presence = min_presence;
        self
    }

    /// Alpha clamped into `[SMOOTHING_MIN_ALPHA, 1.0]`.
    pub fn effective_alpha(&self) -> f64 {
        if self.alpha.is_finite() {
            self.alpha.clamp(SMOOTHING_MIN_ALPHA, 1.0)
        } else {
            SMOOTHING_ALPHA
        }
    }

    pub fn effective_min_visibility(&self) -> f64 {
        finite_or_zero(self.min_visibility)
    }

    pub fn effective_min_presence(&self) -> f64 {
        finite_or_zero(self.min_presence)
    }

    /// Effective parameters as recorded on offline-smoothed frames.
    pub fn stamp(&self) -> Value {
        json!({
            "alpha": self.effective_alpha(),
            "max_gap": self.max_gap,
            "vis_min": self.effective_min_visibility(),
            "pres_min": self.effective_min_presence(),
        })
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One EMA step: `alpha * current + (1 - alpha) * previous`.
#[inline]
pub(crate) fn ema(previous: f64, current: f64, alpha: f64) -> f64 {
    alpha * current + (1.0 - alpha) * previous
}
