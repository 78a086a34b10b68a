//! Pose Quality Check
//!
//! Summary of how usable a pose sequence is before smoothing or metric
//! extraction: dropped frames, mean detector confidence, and a jitter proxy
//! over the wrists, hips and ankles. Comparing the jitter proxy before and
//! after smoothing shows how much the filter removed.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::defaults::{QC_JITTER_LANDMARKS, QC_MIN_LANDMARKS};
use crate::smoothing::{decode_frames, frame_array};
use crate::types::{Frame, Landmark};

/// Quality summary of one pose sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseQcReport {
    /// Frames in the sequence
    pub frames: usize,
    /// Frames without a landmark list, or with fewer than `QC_MIN_LANDMARKS` slots
    pub missing_frames: usize,
    /// Missing frames as a percentage, two decimals
    pub missing_pct: f64,
    /// Mean over usable frames of each frame's mean visibility
    pub mean_visibility: Option<f64>,
    /// Mean over usable frames of each frame's mean presence
    pub mean_presence: Option<f64>,
    /// Mean summed displacement of the jitter landmarks between consecutive
    /// frames; lower is steadier
    pub jitter: Option<f64>,
}

impl PoseQcReport {
    /// Fraction of frames with a usable skeleton, on the scale of `okRate`.
    pub fn ok_rate(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        1.0 - self.missing_frames as f64 / self.frames as f64
    }
}

impl fmt::Display for PoseQcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== POSE QC ===")?;
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(f, "Missing frames: {} ({}%)", self.missing_frames, self.missing_pct)?;
        if let Some(visibility) = self.mean_visibility {
            writeln!(f, "Mean visibility: {visibility:.3}")?;
        }
        if let Some(presence) = self.mean_presence {
            writeln!(f, "Mean presence:   {presence:.3}")?;
        }
        match self.jitter {
            Some(jitter) => write!(
                f,
                "Jitter proxy (mean sum keypoint delta): {jitter:.4}  (lower is better)"
            ),
            None => write!(f, "Jitter proxy: not computed (missing keypoints)."),
        }
    }
}

/// Quality check of a decoded pose sequence; `None` for an empty one.
pub fn pose_qc(frames: &[Frame]) -> Option<PoseQcReport> {
    if frames.is_empty() {
        return None;
    }

    let usable: Vec<&Frame> = frames
        .iter()
        .filter(|frame| frame.landmark_count() >= QC_MIN_LANDMARKS)
        .collect();
    let missing_frames = frames.len() - usable.len();
    let missing_pct = (missing_frames as f64 / frames.len() as f64 * 10_000.0).round() / 100.0;

    let report = PoseQcReport {
        frames: frames.len(),
        missing_frames,
        missing_pct,
        mean_visibility: mean_of_frame_means(&usable, |lm| lm.visibility),
        mean_presence: mean_of_frame_means(&usable, |lm| lm.presence),
        jitter: jitter(frames),
    };

    debug!(
        frames = report.frames,
        missing = report.missing_frames,
        jitter = ?report.jitter,
        "Pose QC computed"
    );
    Some(report)
}

/// Quality check of a pose document in any known layout.
///
/// `None` when the document has no frame array, or an empty one.
pub fn pose_qc_document(doc: &Value) -> Option<PoseQcReport> {
    let frames = decode_frames(frame_array(doc)?);
    pose_qc(&frames)
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean of per-frame means; frames without any score are skipped.
fn mean_of_frame_means(frames: &[&Frame], score: fn(&Landmark) -> Option<f64>) -> Option<f64> {
    mean(frames.iter().filter_map(|frame| {
        mean(
            frame
                .landmarks
                .iter()
                .flatten()
                .flatten()
                .filter_map(score)
                .filter(|v| v.is_finite()),
        )
    }))
}

/// Mean frame-to-frame displacement summed over the jitter landmarks.
///
/// A frame missing any of them breaks the chain.
fn jitter(frames: &[Frame]) -> Option<f64> {
    let mut deltas = Vec::new();
    let mut prev: Option<Vec<(f64, f64)>> = None;

    for frame in frames {
        let current: Option<Vec<(f64, f64)>> = QC_JITTER_LANDMARKS
            .iter()
            .map(|&i| frame.landmark(i).map(|lm| (lm.x, lm.y)))
            .collect();
        if let (Some(prev), Some(current)) = (&prev, &current) {
            deltas.push(
                prev.iter()
                    .zip(current)
                    .map(|(&(x0, y0), &(x1, y1))| (x1 - x0).hypot(y1 - y0))
                    .sum::<f64>(),
            );
        }
        prev = current;
    }

    mean(deltas)
}
