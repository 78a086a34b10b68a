//! Offline smoothing: short-gap interpolation followed by per-channel EMA.
//!
//! Unlike the streaming smoother this sees the whole clip, so a short
//! dropout is bridged by a line between its neighbours rather than frozen
//! at the last value. Structural breaks are just holes in every channel.

use serde_json::Value;
use tracing::debug;

use super::{ema, SmoothingParams};
use crate::config::defaults::CONFIDENCE_CHANNEL_MAX_ALPHA;
use crate::types::{reference_landmark_count, Frame, Landmark, PoseSequence};

/// Per-landmark values tracked as independent time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    X,
    Y,
    Z,
    Visibility,
    Presence,
}

impl Channel {
    const ALL: [Self; 5] = [Self::X, Self::Y, Self::Z, Self::Visibility, Self::Presence];

    fn is_coordinate(self) -> bool {
        matches!(self, Self::X | Self::Y | Self::Z)
    }

    fn read(self, lm: &Landmark) -> Option<f64> {
        match self {
            Self::X => Some(lm.x),
            Self::Y => Some(lm.y),
            Self::Z => lm.z,
            Self::Visibility => lm.visibility,
            Self::Presence => lm.presence,
        }
        .filter(|v| v.is_finite())
    }

    fn write(self, lm: &mut Landmark, value: f64) {
        match self {
            Self::X => lm.x = value,
            Self::Y => lm.y = value,
            Self::Z => lm.z = Some(value),
            Self::Visibility => lm.visibility = Some(value),
            Self::Presence => lm.presence = Some(value),
        }
    }
}

type Series = Vec<Option<f64>>;

/// Frame field recording the parameters of an offline smoothing run.
pub const SMOOTHED_KEY: &str = "smoothed";

fn stamped(mut frame: Frame, stamp: &Value) -> Frame {
    frame.extra.insert(SMOOTHED_KEY.to_string(), stamp.clone());
    frame
}

/// Interpolate short gaps, then EMA every channel of every landmark.
///
/// Coordinates of rejected observations (below the visibility/presence
/// thresholds) become holes; their confidence scores are still smoothed.
/// Interior holes of at most `max_gap` frames are filled linearly. Holes
/// survive the EMA without resetting it. Coordinate channels use `alpha`,
/// confidence channels `min(alpha, CONFIDENCE_CHANNEL_MAX_ALPHA)`.
///
/// Frames that did not match the landmark layout are rebuilt with `K`
/// slots when interpolation produced values for them, and copied
/// unchanged otherwise. Every output frame records the effective
/// parameters under [`SMOOTHED_KEY`].
pub fn interpolate_and_smooth(frames: &[Frame], params: &SmoothingParams) -> PoseSequence {
    let stamp = params.stamp();
    let Some(k) = reference_landmark_count(frames) else {
        return frames.iter().map(|frame| stamped(frame.clone(), &stamp)).collect();
    };

    let alpha = params.effective_alpha();
    let min_visibility = params.effective_min_visibility();
    let min_presence = params.effective_min_presence();

    // series[landmark][channel][frame]
    let mut series: Vec<Vec<Series>> = vec![vec![Vec::with_capacity(frames.len()); Channel::ALL.len()]; k];

    for frame in frames {
        let slots = frame.landmarks.as_ref().filter(|slots| slots.len() == k);
        for (i, channels) in series.iter_mut().enumerate() {
            let lm = slots.and_then(|slots| slots[i].as_ref());
            let accepted = lm.is_some_and(|lm| lm.is_acceptable(min_visibility, min_presence));
            for (channel, values) in Channel::ALL.iter().zip(channels.iter_mut()) {
                let value = lm
                    .filter(|_| accepted || !channel.is_coordinate())
                    .and_then(|lm| channel.read(lm));
                values.push(value);
            }
        }
    }

    for channels in &mut series {
        for (channel, values) in Channel::ALL.iter().zip(channels.iter_mut()) {
            let channel_alpha = if channel.is_coordinate() {
                alpha
            } else {
                alpha.min(CONFIDENCE_CHANNEL_MAX_ALPHA)
            };
            fill_short_gaps(values, params.max_gap);
            ema_series(values, channel_alpha);
        }
    }

    let mut rebuilt = 0usize;
    let out: PoseSequence = frames
        .iter()
        .enumerate()
        .map(|(fi, frame)| {
            let matches_layout = frame.landmark_count() == k;
            let mut out = frame.clone();
            let slots: Vec<Option<Landmark>> = series
                .iter()
                .enumerate()
                .map(|(i, channels)| {
                    let raw = if matches_layout { frame.landmark(i) } else { None };
                    rebuild_landmark(raw, channels, fi)
                })
                .collect();

            if matches_layout {
                out.landmarks = Some(slots);
            } else if slots.iter().any(Option::is_some) {
                rebuilt += 1;
                out.landmarks = Some(slots);
            }
            stamped(out, &stamp)
        })
        .collect();

    debug!(
        frames = frames.len(),
        landmarks = k,
        alpha,
        max_gap = params.max_gap,
        rebuilt,
        "Pose sequence interpolated and smoothed"
    );

    out
}

/// Overlay smoothed channel values onto the raw landmark.
///
/// Without a raw landmark, one is synthesized only when both `x` and `y`
/// have values.
fn rebuild_landmark(raw: Option<&Landmark>, channels: &[Series], frame: usize) -> Option<Landmark> {
    let value = |channel: Channel| {
        Channel::ALL
            .iter()
            .position(|&c| c == channel)
            .and_then(|idx| channels[idx][frame])
    };

    let mut lm = match raw {
        Some(raw) => raw.clone(),
        None => Landmark::new(value(Channel::X)?, value(Channel::Y)?),
    };
    for channel in Channel::ALL {
        if let Some(v) = value(channel) {
            channel.write(&mut lm, v);
        }
    }
    Some(lm)
}

/// Linearly fill interior runs of `None` no longer than `max_gap`.
///
/// Runs touching either end of the series are left empty.
fn fill_short_gaps(values: &mut Series, max_gap: usize) {
    let n = values.len();
    let mut i = 0;
    while i < n {
        if values[i].is_some() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i;
        while end < n && values[end].is_none() {
            end += 1;
        }

        let gap = end - start;
        if start > 0 && end < n && gap <= max_gap {
            if let (Some(before), Some(after)) = (values[start - 1], values[end]) {
                let span = (end - (start - 1)) as f64;
                for (offset, slot) in values[start..end].iter_mut().enumerate() {
                    let t = (offset + 1) as f64 / span;
                    *slot = Some(before + (after - before) * t);
                }
            }
        }
        i = end;
    }
}

/// EMA over a series with holes; holes stay holes and keep the state.
fn ema_series(values: &mut Series, alpha: f64) {
    let mut prev: Option<f64> = None;
    for slot in values.iter_mut() {
        if let Some(v) = *slot {
            let next = prev.map_or(v, |p| ema(p, v, alpha));
            prev = Some(next);
            *slot = Some(next);
        }
    }
}
