//! Pose types: Landmark, Frame, PoseSequence

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visibility / presence assumed when the detector did not report one.
pub const DEFAULT_CONFIDENCE: f64 = 1.0;

/// Landmark keys with a typed field; everything else lands in `extra`.
const LANDMARK_FIELDS: [&str; 5] = ["x", "y", "z", "visibility", "presence"];

// ============================================================================
// Landmark
// ============================================================================

/// A single tracked anatomical point in one frame.
///
/// Coordinates are normalized to the frame (`x`, `y` in [0, 1]); `z` is the
/// detector's relative depth when it reports one. Fields the detector emits
/// beyond these are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<f64>,
    /// Unrecognized detector fields, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Landmark {
    /// Create a 2D landmark with no depth or confidence scores.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
            presence: None,
            extra: Map::new(),
        }
    }

    /// Lenient decode of one detector landmark.
    ///
    /// `None` unless the value is an object with numeric `x` and `y`.
    /// A `z`, `visibility` or `presence` that is not a number is dropped.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let number = |key: &str| obj.get(key).and_then(Value::as_f64);

        Some(Self {
            x: number("x")?,
            y: number("y")?,
            z: number("z"),
            visibility: number("visibility"),
            presence: number("presence"),
            extra: obj
                .iter()
                .filter(|(key, _)| !LANDMARK_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        })
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_presence(mut self, presence: f64) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Visibility score, 1.0 when the detector did not report one.
    pub fn visibility_or_default(&self) -> f64 {
        finite_or(self.visibility, DEFAULT_CONFIDENCE)
    }

    /// Presence score, 1.0 when the detector did not report one.
    pub fn presence_or_default(&self) -> f64 {
        finite_or(self.presence, DEFAULT_CONFIDENCE)
    }

    /// Depth when it is a usable number.
    pub fn finite_z(&self) -> Option<f64> {
        self.z.filter(|z| z.is_finite())
    }

    /// Whether this observation can feed the smoother.
    ///
    /// Requires finite coordinates and both confidence scores at or above
    /// their thresholds.
    pub fn is_acceptable(&self, min_visibility: f64, min_presence: f64) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.visibility_or_default() >= min_visibility
            && self.presence_or_default() >= min_presence
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

// ============================================================================
// Frame / PoseSequence
// ============================================================================

/// One video frame's pose estimate.
///
/// `landmarks` is `None` when the detector produced nothing for this frame.
/// Individual slots are `None` when a landmark was dropped while the rest of
/// the skeleton was tracked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Option<Landmark>>>,
    /// Frame-level fields (timestamps, dimensions, ...), preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Frame {
    /// Frame with every landmark slot populated.
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Self {
        Self {
            landmarks: Some(landmarks.into_iter().map(Some).collect()),
            extra: Map::new(),
        }
    }

    /// Frame with explicit slots, `None` marking a dropped landmark.
    pub fn from_slots(slots: Vec<Option<Landmark>>) -> Self {
        Self {
            landmarks: Some(slots),
            extra: Map::new(),
        }
    }

    /// Frame where the detector produced no landmark list at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of landmark slots, 0 when the list is absent.
    pub fn landmark_count(&self) -> usize {
        self.landmarks.as_ref().map_or(0, Vec::len)
    }

    /// Landmark in slot `index`, if tracked.
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks
            .as_ref()
            .and_then(|lms| lms.get(index))
            .and_then(Option::as_ref)
    }
}

/// Ordered frames of one clip; the unit of work for smoothing.
pub type PoseSequence = Vec<Frame>;

/// Landmark count of the first frame that carries any landmarks.
///
/// This fixes the skeleton layout for a smoothing run. `None` when no frame
/// has landmarks.
pub fn reference_landmark_count(frames: &[Frame]) -> Option<usize> {
    frames
        .iter()
        .map(Frame::landmark_count)
        .find(|&count| count > 0)
}
