//! Smoothing for pose JSON in any of the known layouts:
//! - `[ {landmarks: [...]}, ... ]`
//! - `[ [...landmarks], ... ]` (bare landmark lists, output as `{landmarks}`)
//! - `{ frames: [...], ... }`
//! - `{ pose: [...], ... }`
//!
//! Decoding is per frame and per landmark slot, so one malformed entry
//! never leaves the rest of the clip unsmoothed.

use serde_json::{Map, Value};
use tracing::warn;

use super::{interpolate_and_smooth, smooth, SmoothingParams};
use crate::config::SmoothingMethod;
use crate::types::{Frame, Landmark};

/// Keys searched, in order, for the frame array of a pose object.
const FRAME_KEYS: [&str; 2] = ["frames", "pose"];

/// Smooth a pose document, preserving its shape.
///
/// The frame array is replaced by its smoothed version; every other field
/// is copied. Unrecognized shapes are returned unchanged.
pub fn smooth_document(doc: &Value, params: &SmoothingParams, method: SmoothingMethod) -> Value {
    match doc {
        Value::Array(items) => smooth_frames(items, params, method)
            .map(Value::Array)
            .unwrap_or_else(|| doc.clone()),
        Value::Object(map) => {
            let Some((key, items)) = FRAME_KEYS
                .iter()
                .find_map(|&key| map.get(key).and_then(Value::as_array).map(|items| (key, items)))
            else {
                return doc.clone();
            };

            match smooth_frames(items, params, method) {
                Some(smoothed) => {
                    let mut out = map.clone();
                    out.insert(key.to_string(), Value::Array(smoothed));
                    Value::Object(out)
                }
                None => doc.clone(),
            }
        }
        _ => doc.clone(),
    }
}

/// Frame array of a pose document in any known layout.
pub fn frame_array(doc: &Value) -> Option<&Vec<Value>> {
    match doc {
        Value::Array(items) => Some(items),
        Value::Object(map) => FRAME_KEYS
            .iter()
            .find_map(|&key| map.get(key).and_then(Value::as_array)),
        _ => None,
    }
}

/// Leniently decode a JSON frame array.
///
/// Unreadable landmarks become dropped slots; frames without a landmark
/// list decode as [`Frame::empty`] plus their other fields.
pub fn decode_frames(items: &[Value]) -> Vec<Frame> {
    items.iter().map(|item| decode_frame(item).0).collect()
}

/// Decode, smooth and re-encode a JSON frame array.
///
/// Unreadable input is kept verbatim where the smoother leaves the slot or
/// frame empty. A held landmark over an unreadable object keeps the
/// object's other fields. Returns `None` only when encoding fails.
pub fn smooth_frames(items: &[Value], params: &SmoothingParams, method: SmoothingMethod) -> Option<Vec<Value>> {
    let (frames, unread): (Vec<Frame>, Vec<Unread>) = items.iter().map(decode_frame).unzip();

    let unread_slots: usize = unread.iter().map(|u| u.slots.len()).sum();
    let unread_frames = unread.iter().filter(|u| u.frame.is_some() || u.landmarks.is_some()).count();
    if unread_slots > 0 || unread_frames > 0 {
        warn!(
            slots = unread_slots,
            frames = unread_frames,
            "Unreadable pose entries treated as dropped"
        );
    }

    let smoothed = match method {
        SmoothingMethod::Ema => smooth(&frames, params),
        SmoothingMethod::Interpolate => interpolate_and_smooth(&frames, params),
    };

    smoothed
        .iter()
        .zip(&frames)
        .zip(unread)
        .map(|((out, input), unread)| encode_frame(out, input.landmark_count(), unread))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| warn!(error = %e, "Failed to encode smoothed frames"))
        .ok()
}

// ============================================================================
// Lenient decoding
// ============================================================================

/// Raw JSON the decoder could not read for one frame.
#[derive(Debug, Default)]
struct Unread {
    /// The whole frame, when it was neither an object nor a landmark list
    frame: Option<Value>,
    /// A `landmarks` value that was not a list
    landmarks: Option<Value>,
    /// Non-null slots that were not a readable landmark
    slots: Vec<(usize, Value)>,
}

fn decode_frame(item: &Value) -> (Frame, Unread) {
    let mut unread = Unread::default();

    let (slots, extra) = match item {
        Value::Array(slots) => (Some(slots), Map::new()),
        Value::Object(map) => {
            let mut extra = map.clone();
            let landmarks = extra.remove("landmarks");
            match map.get("landmarks").and_then(Value::as_array) {
                Some(slots) => (Some(slots), extra),
                None => {
                    unread.landmarks = landmarks;
                    (None, extra)
                }
            }
        }
        other => {
            unread.frame = Some(other.clone());
            (None, Map::new())
        }
    };

    let landmarks = slots.map(|slots| {
        slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let lm = Landmark::from_json(slot);
                if lm.is_none() && !slot.is_null() {
                    unread.slots.push((index, slot.clone()));
                }
                lm
            })
            .collect()
    });

    (Frame { landmarks, extra }, unread)
}

fn encode_frame(frame: &Frame, input_count: usize, unread: Unread) -> Result<Value, serde_json::Error> {
    if frame.landmarks.is_none() {
        if let Some(raw) = unread.frame {
            return Ok(raw);
        }
    }

    let mut value = serde_json::to_value(frame)?;

    if frame.landmarks.is_none() {
        if let (Some(raw), Some(map)) = (unread.landmarks, value.as_object_mut()) {
            map.insert("landmarks".to_string(), raw);
        }
        return Ok(value);
    }

    // Slot indices only line up when the frame kept its layout
    if frame.landmark_count() != input_count {
        return Ok(value);
    }
    if let Some(slots) = value.get_mut("landmarks").and_then(Value::as_array_mut) {
        for (index, raw) in unread.slots {
            let Some(slot) = slots.get_mut(index) else {
                continue;
            };
            *slot = match (slot.take(), raw) {
                (Value::Null, raw) => raw,
                (Value::Object(held), Value::Object(mut base)) => {
                    base.extend(held);
                    Value::Object(base)
                }
                (held, _) => held,
            };
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frames_json() -> Value {
        json!([
            {"landmarks": [{"x": 0.0, "y": 0.0}]},
            {"landmarks": [{"x": 1.0, "y": 1.0}]}
        ])
    }

    fn params() -> SmoothingParams {
        SmoothingParams::default().with_alpha(0.5)
    }

    #[test]
    fn bare_array_is_smoothed() {
        let out = smooth_document(&frames_json(), &params(), SmoothingMethod::Ema);
        assert_eq!(out[1]["landmarks"][0]["x"], json!(0.5));
        assert_eq!(out[0]["landmarks"][0]["x"], json!(0.0));
    }

    #[test]
    fn frames_key_is_smoothed_and_siblings_kept() {
        let doc = json!({"fps": 30, "frames": frames_json()});
        let out = smooth_document(&doc, &params(), SmoothingMethod::Ema);
        assert_eq!(out["fps"], json!(30));
        assert_eq!(out["frames"][1]["landmarks"][0]["y"], json!(0.5));
    }

    #[test]
    fn pose_key_is_used_when_frames_missing() {
        let doc = json!({"pose": frames_json()});
        let out = smooth_document(&doc, &params(), SmoothingMethod::Ema);
        assert_eq!(out["pose"][1]["landmarks"][0]["x"], json!(0.5));
    }

    #[test]
    fn non_array_frames_falls_through_to_pose() {
        let doc = json!({"frames": "n/a", "pose": frames_json()});
        let out = smooth_document(&doc, &params(), SmoothingMethod::Ema);
        assert_eq!(out["frames"], json!("n/a"));
        assert_eq!(out["pose"][1]["landmarks"][0]["x"], json!(0.5));
    }

    #[test]
    fn unrecognized_shapes_pass_through() {
        for doc in [json!(42), json!("pose"), json!({"clip": []}), json!(null)] {
            assert_eq!(smooth_document(&doc, &params(), SmoothingMethod::Ema), doc);
        }
    }

    #[test]
    fn frames_without_landmark_list_pass_through() {
        let doc = json!([{"landmarks": "broken", "t": 0}, 7, null]);
        assert_eq!(smooth_document(&doc, &params(), SmoothingMethod::Ema), doc);
    }

    #[test]
    fn null_coordinate_does_not_block_smoothing() {
        let doc = json!([
            {"landmarks": [{"x": 0.0, "y": 0.0}]},
            {"landmarks": [{"x": 1.0, "y": 1.0}]},
            {"landmarks": [{"x": null, "y": 0.5, "name": "nose"}]},
            {"landmarks": [{"x": 1.0, "y": 1.0}]}
        ]);
        let out = smooth_document(&doc, &params(), SmoothingMethod::Ema);

        assert_eq!(out[1]["landmarks"][0]["x"], json!(0.5));
        // Held over the unreadable landmark, keeping its other fields
        assert_eq!(out[2]["landmarks"][0], json!({"x": 0.5, "y": 0.5, "z": 0.0, "name": "nose"}));
        assert_eq!(out[3]["landmarks"][0]["x"], json!(0.75));
    }

    #[test]
    fn unreadable_landmark_is_kept_when_not_held() {
        let doc = json!([
            {"landmarks": [{"x": 0.0, "y": 0.0}, {"x": 0.0, "y": 0.0}]},
            {"landmarks": [{"x": 1.0, "y": 1.0}, {"x": 1.0, "y": 1.0, "visibility": "high"}]},
            {"landmarks": [{"x": 1.0, "y": 1.0}, {"x": "?", "y": 1.0}]}
        ]);
        let no_hold = params().with_max_gap(0);
        let out = smooth_document(&doc, &no_hold, SmoothingMethod::Ema);

        assert_eq!(out[2]["landmarks"][1], json!({"x": "?", "y": 1.0}));
        // A non-numeric score reads as absent; the landmark is still smoothed
        assert_eq!(out[1]["landmarks"][1], json!({"x": 0.5, "y": 0.5}));
        assert_eq!(out[2]["landmarks"][0]["x"], json!(0.75));
    }

    #[test]
    fn bare_landmark_lists_become_frames() {
        let doc = json!([[{"x": 0, "y": 0}], [{"x": 1, "y": 1}]]);
        let out = smooth_document(&doc, &params(), SmoothingMethod::Ema);
        assert_eq!(
            out,
            json!([
                {"landmarks": [{"x": 0.0, "y": 0.0}]},
                {"landmarks": [{"x": 0.5, "y": 0.5}]}
            ])
        );
    }

    #[test]
    fn decode_frames_is_lenient() {
        let items = vec![
            json!({"t": 0, "landmarks": [{"x": 0.1, "y": 0.2}, {"x": null}]}),
            json!([{"x": 0.3, "y": 0.4}]),
            json!("noise"),
        ];
        let frames = decode_frames(&items);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].landmark_count(), 2);
        assert!(frames[0].landmark(1).is_none());
        assert_eq!(frames[0].extra.get("t"), Some(&json!(0)));
        assert_eq!(frames[1].landmark(0).map(|l| l.x), Some(0.3));
        assert_eq!(frames[2], Frame::empty());
    }

    #[test]
    fn frame_array_finds_every_layout() {
        let frames = frames_json();
        assert_eq!(frame_array(&frames).map(Vec::len), Some(2));
        assert_eq!(frame_array(&json!({"pose": frames})).map(Vec::len), Some(2));
        assert!(frame_array(&json!({"clip": []})).is_none());
    }

    #[test]
    fn extra_landmark_fields_round_trip() {
        let doc = json!([
            {"t": 0, "landmarks": [{"x": 0.2, "y": 0.2, "name": "nose"}]},
            {"t": 1, "landmarks": [{"x": 0.2, "y": 0.2, "name": "nose"}]}
        ]);
        let out = smooth_document(&doc, &params(), SmoothingMethod::Interpolate);
        assert_eq!(out[1]["landmarks"][0]["name"], json!("nose"));
        assert_eq!(out[1]["t"], json!(1));
    }
}
