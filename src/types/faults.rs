//! Fault ranking types: SwingMetrics, FaultKind, RankedFault, RankingReport

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Swing Metrics
// ============================================================================

/// Scalar swing metrics computed upstream from the smoothed pose.
///
/// Every field is optional; the ranker has a defined fallback for each.
/// Field names follow the JSON report layout (`okRate`, `sepMed`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwingMetrics {
    /// Fraction of sampled frames with an acceptable pose (0-1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok_rate: Option<f64>,
    /// Number of frames the metrics were computed from, as reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_used: Option<f64>,
    /// Median hip/shoulder separation proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sep_med: Option<f64>,
    /// Hip turn proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip_turn: Option<f64>,
    /// Shoulder turn proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sh_turn: Option<f64>,
    /// Lateral sway detected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sway: Option<bool>,
}

impl SwingMetrics {
    /// Read metrics from a loosely-typed JSON object.
    ///
    /// Values with the wrong type, or non-finite numbers, are treated as
    /// absent instead of failing the whole read.
    pub fn from_value(value: &Value) -> Self {
        let number = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_f64)
                .filter(|v| v.is_finite())
        };

        Self {
            ok_rate: number("okRate"),
            frames_used: value.get("framesUsed").and_then(frame_count),
            sep_med: number("sepMed"),
            hip_turn: number("hipTurn"),
            sh_turn: number("shTurn"),
            sway: value.get("sway").and_then(Value::as_bool),
        }
    }

    /// Pose OK rate with only finite values kept.
    pub fn ok_rate(&self) -> Option<f64> {
        self.ok_rate.filter(|v| v.is_finite())
    }

    pub fn frames_used(&self) -> Option<f64> {
        self.frames_used.filter(|v| v.is_finite())
    }

    pub fn sep_med(&self) -> Option<f64> {
        self.sep_med.filter(|v| v.is_finite())
    }

    pub fn hip_turn(&self) -> Option<f64> {
        self.hip_turn.filter(|v| v.is_finite())
    }

    pub fn sh_turn(&self) -> Option<f64> {
        self.sh_turn.filter(|v| v.is_finite())
    }
}

/// Read a JSON frame count as reported, fractional or not.
pub fn frame_count(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

// ============================================================================
// Fault Kind
// ============================================================================

/// Fault tags the ranker has dedicated scoring rules for.
///
/// Any other tag is still ranked, using baseline score and signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Insufficient body turn
    LowTurn,
    /// Hips late in the downswing sequence
    LateHips,
    /// Lateral sway off the ball
    Sway,
    /// Weight moving toward the target in the backswing
    ReversePivot,
    /// Generic setup/contact fallback; always ranks last
    Foundation,
    /// Tag without a dedicated rule
    Other,
}

impl FaultKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "low_turn" => Self::LowTurn,
            "late_hips" => Self::LateHips,
            "sway" => Self::Sway,
            "reverse_pivot" => Self::ReversePivot,
            "foundation" => Self::Foundation,
            _ => Self::Other,
        }
    }
}

/// Human-readable label for a fault tag.
///
/// Unknown tags fall back to the key with underscores replaced by spaces.
pub fn fault_label(key: &str) -> String {
    let label = match key {
        "face_open" => "Clubface (open)",
        "face_closed" => "Clubface (closed)",
        "over_the_top" => "Path (over the top)",
        "early_extend" => "Posture (early extension)",
        "late_hips" => "Sequence (hips late)",
        "low_turn" => "Sequence (low turn)",
        "arms_start_down" => "Sequence (arms first)",
        "flip" => "Impact (flip / stall)",
        "sway" => "Pressure shift (sway)",
        "reverse_pivot" => "Pressure shift (reverse pivot)",
        "foundation" => "Foundation (setup + contact)",
        "" => "foundation",
        other => return other.replace('_', " "),
    };
    label.to_string()
}

// ============================================================================
// Ranked Fault
// ============================================================================

/// One fault tag annotated for display.
///
/// The field set `{key, label, score, confidence, evidence}` is what report
/// renderers consume; keep it stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedFault {
    pub key: String,
    pub label: String,
    /// Importance, 0-100
    pub score: u8,
    /// Confidence, 0-100
    pub confidence: u8,
    /// Ordered justification lines; never empty
    pub evidence: Vec<String>,
}

/// Ranking attached to a swing report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingReport {
    /// Full ranking, most important first
    pub ranked_faults: Vec<RankedFault>,
    /// Keys of the leading faults
    pub top_faults: Vec<String>,
    pub priority_key: Option<String>,
    pub priority_label: Option<String>,
}
