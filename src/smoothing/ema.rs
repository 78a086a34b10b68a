//! Streaming EMA smoother with gap-holding.

use tracing::debug;

use super::{ema, SmoothingParams};
use crate::types::{reference_landmark_count, Frame, Landmark, PoseSequence};

/// Counters from one smoothing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothingStats {
    /// Frames in the sequence
    pub frames: usize,
    /// Landmark count fixed by the first non-empty frame
    pub landmark_count: usize,
    /// First accepted observations that started a track
    pub seeded: usize,
    /// Observations blended with their track
    pub smoothed: usize,
    /// Rejected observations replaced by the held value
    pub held: usize,
    /// Rejected observations left untouched (no track, or gap too long)
    pub dropped: usize,
    /// Frames whose layout did not match and reset every track
    pub structural_resets: usize,
}

/// Smoothing state for one landmark index.
#[derive(Debug, Clone, Default)]
struct LandmarkTrack {
    /// Last accepted smoothed value
    prev: Option<Landmark>,
    /// Consecutive rejected observations
    gap: usize,
}

enum Step {
    Seeded,
    Smoothed,
    Held,
    Dropped,
}

impl LandmarkTrack {
    fn reset(&mut self) {
        self.prev = None;
        self.gap = 0;
    }

    fn observe(&mut self, slot: &mut Option<Landmark>, alpha: f64, params: &SmoothingParams) -> Step {
        let min_visibility = params.effective_min_visibility();
        let min_presence = params.effective_min_presence();

        match slot
            .as_mut()
            .filter(|lm| lm.is_acceptable(min_visibility, min_presence))
        {
            Some(current) => self.accept(current, alpha),
            None => self.reject(slot, params.max_gap),
        }
    }

    fn accept(&mut self, current: &mut Landmark, alpha: f64) -> Step {
        self.gap = 0;

        let Some(prev) = &self.prev else {
            // First good sample seeds the track and passes through raw
            self.prev = Some(current.clone());
            return Step::Seeded;
        };

        current.x = ema(prev.x, current.x, alpha);
        current.y = ema(prev.y, current.y, alpha);
        if let (Some(cur_z), Some(prev_z)) = (current.finite_z(), prev.finite_z()) {
            current.z = Some(ema(prev_z, cur_z, alpha));
        }
        self.prev = Some(current.clone());
        Step::Smoothed
    }

    fn reject(&mut self, slot: &mut Option<Landmark>, max_gap: usize) -> Step {
        self.gap += 1;

        match &self.prev {
            Some(prev) if self.gap <= max_gap => {
                // Keep the raw landmark's other fields, but never its position
                let mut held = slot
                    .take()
                    .unwrap_or_else(|| Landmark::new(prev.x, prev.y));
                held.z = Some(prev.finite_z().or_else(|| held.finite_z()).unwrap_or(0.0));
                held.x = prev.x;
                held.y = prev.y;
                *slot = Some(held);
                Step::Held
            }
            _ => {
                self.prev = None;
                Step::Dropped
            }
        }
    }
}

/// Smooth a pose sequence with the streaming EMA.
///
/// Returns a new sequence with the same frames in the same order; only
/// landmark values change. See `smooth_with_stats` for run counters.
pub fn smooth(frames: &[Frame], params: &SmoothingParams) -> PoseSequence {
    smooth_with_stats(frames, params).0
}

/// Smooth a pose sequence and report what happened to each observation.
///
/// # Algorithm
/// The first frame with a non-empty landmark list fixes the landmark count
/// `K`. For every frame whose list is absent or not `K` long, all tracks are
/// reset and the frame is copied unchanged. Otherwise each slot is:
/// - accepted (present, finite, visibility/presence above threshold):
///   seeds its track, or is replaced by the EMA of the track and itself
/// - rejected: replaced by the track's last value while the consecutive
///   gap is within `max_gap`; beyond that the track is cleared and the
///   slot is left as-is
pub fn smooth_with_stats(frames: &[Frame], params: &SmoothingParams) -> (PoseSequence, SmoothingStats) {
    let mut out = frames.to_vec();
    let mut stats = SmoothingStats {
        frames: out.len(),
        ..Default::default()
    };

    let Some(k) = reference_landmark_count(&out) else {
        return (out, stats);
    };
    stats.landmark_count = k;

    let alpha = params.effective_alpha();
    let mut tracks = vec![LandmarkTrack::default(); k];

    for (frame_index, frame) in out.iter_mut().enumerate() {
        let found = frame.landmark_count();
        let slots = match frame.landmarks.as_mut() {
            Some(slots) if slots.len() == k => slots,
            _ => {
                tracks.iter_mut().for_each(LandmarkTrack::reset);
                stats.structural_resets += 1;
                debug!(
                    frame = frame_index,
                    expected = k,
                    found,
                    "Landmark layout changed, resetting smoothing state"
                );
                continue;
            }
        };

        for (slot, track) in slots.iter_mut().zip(tracks.iter_mut()) {
            match track.observe(slot, alpha, params) {
                Step::Seeded => stats.seeded += 1,
                Step::Smoothed => stats.smoothed += 1,
                Step::Held => stats.held += 1,
                Step::Dropped => stats.dropped += 1,
            }
        }
    }

    debug!(
        frames = stats.frames,
        landmarks = k,
        alpha,
        max_gap = params.max_gap,
        seeded = stats.seeded,
        smoothed = stats.smoothed,
        held = stats.held,
        dropped = stats.dropped,
        resets = stats.structural_resets,
        "Pose sequence smoothed"
    );

    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(x: f64, y: f64) -> Frame {
        Frame::from_landmarks(vec![Landmark::new(x, y)])
    }

    fn params(alpha: f64, max_gap: usize) -> SmoothingParams {
        SmoothingParams::default().with_alpha(alpha).with_max_gap(max_gap)
    }

    #[test]
    fn empty_sequence_is_identity() {
        let (out, stats) = smooth_with_stats(&[], &SmoothingParams::default());
        assert!(out.is_empty());
        assert_eq!(stats, SmoothingStats::default());
    }

    #[test]
    fn sequence_without_landmarks_is_unchanged() {
        let frames = vec![Frame::empty(), Frame::from_slots(vec![])];
        assert_eq!(smooth(&frames, &SmoothingParams::default()), frames);
    }

    #[test]
    fn second_sample_is_blended() {
        let frames = vec![single(0.0, 0.0), single(1.0, 1.0)];
        let out = smooth(&frames, &params(0.5, 2));
        let lm = out[1].landmark(0).unwrap();
        assert!((lm.x - 0.5).abs() < 1e-12);
        assert!((lm.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn z_is_blended_only_when_both_known() {
        let frames = vec![
            Frame::from_landmarks(vec![Landmark::new(0.0, 0.0).with_z(0.0)]),
            Frame::from_landmarks(vec![Landmark::new(0.0, 0.0).with_z(1.0)]),
            Frame::from_landmarks(vec![Landmark::new(0.0, 0.0)]),
            Frame::from_landmarks(vec![Landmark::new(0.0, 0.0).with_z(0.8)]),
        ];
        let out = smooth(&frames, &params(0.5, 2));
        assert_eq!(out[1].landmark(0).unwrap().z, Some(0.5));
        assert_eq!(out[2].landmark(0).unwrap().z, None);
        // Previous smoothed value has no z, so the raw z passes through
        assert_eq!(out[3].landmark(0).unwrap().z, Some(0.8));
    }

    #[test]
    fn low_visibility_frame_is_held_not_leaked() {
        let frames = vec![
            Frame::from_landmarks(vec![Landmark::new(0.2, 0.2).with_visibility(0.9)]),
            Frame::from_landmarks(vec![Landmark::new(0.9, 0.9).with_visibility(0.1)]),
        ];
        let p = params(0.5, 2).with_min_visibility(0.5);
        let out = smooth(&frames, &p);
        let held = out[1].landmark(0).unwrap();
        assert_eq!((held.x, held.y), (0.2, 0.2));
        // Raw confidence is kept on the held landmark
        assert_eq!(held.visibility, Some(0.1));
        assert_eq!(held.z, Some(0.0));
    }

    #[test]
    fn held_z_prefers_track_then_raw() {
        let frames = vec![
            single(0.2, 0.2),
            Frame::from_landmarks(vec![Landmark::new(0.5, 0.5).with_z(-0.3).with_presence(0.0)]),
        ];
        let p = params(0.5, 2).with_min_presence(0.5);
        let out = smooth(&frames, &p);
        assert_eq!(out[1].landmark(0).unwrap().z, Some(-0.3));
    }

    #[test]
    fn rejection_without_track_leaves_slot_untouched() {
        let frames = vec![Frame::from_slots(vec![None, Some(Landmark::new(0.1, 0.1))])];
        let (out, stats) = smooth_with_stats(&frames, &params(0.5, 2));
        assert_eq!(out, frames);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.seeded, 1);
    }

    #[test]
    fn zero_max_gap_never_holds() {
        let frames = vec![single(0.2, 0.2), Frame::from_slots(vec![None]), single(0.6, 0.6)];
        let out = smooth(&frames, &params(0.5, 0));
        assert!(out[1].landmark(0).is_none());
        // Track was cleared, so frame 2 reseeds
        assert_eq!(out[2].landmark(0).unwrap().x, 0.6);
    }

    #[test]
    fn input_is_not_mutated() {
        let frames = vec![single(0.0, 0.0), single(1.0, 1.0)];
        let before = frames.clone();
        let _ = smooth(&frames, &params(0.5, 2));
        assert_eq!(frames, before);
    }

    #[test]
    fn extra_fields_are_preserved() {
        let mut frame = single(0.4, 0.4);
        frame.extra.insert("t".to_string(), serde_json::json!(0.5));
        let out = smooth(&[frame.clone(), frame], &params(0.5, 2));
        assert_eq!(out[1].extra.get("t"), Some(&serde_json::json!(0.5)));
    }

    #[test]
    fn stats_count_every_slot() {
        let frames = vec![
            Frame::from_slots(vec![Some(Landmark::new(0.1, 0.1)), None]),
            Frame::from_slots(vec![Some(Landmark::new(0.2, 0.2)), None]),
            Frame::empty(),
        ];
        let (_, stats) = smooth_with_stats(&frames, &params(0.5, 2));
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.landmark_count, 2);
        assert_eq!(stats.seeded, 1);
        assert_eq!(stats.smoothed, 1);
        assert_eq!(stats.dropped, 2);
        assert_eq!(stats.structural_resets, 1);
    }
}
