//! Config validation: unknown-key detection with Levenshtein suggestions
//! and warnings for legal-but-suspicious values.
//!
//! The raw TOML is first parsed into a `toml::Value` and its key tree is
//! compared against the known field names. Unknown keys only warn; the
//! serde pass that follows ignores them.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for `AnalysisConfig`.
///
/// Maintained by hand; any field added to `analysis_config.rs` must be
/// listed here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [smoothing]
        "smoothing",
        "smoothing.alpha",
        "smoothing.max_gap",
        "smoothing.min_visibility",
        "smoothing.min_presence",
        "smoothing.method",
        // [ranking]
        "ranking",
        "ranking.top_n",
        // [ranking.quality]
        "ranking.quality",
        "ranking.quality.reference_frames",
        "ranking.quality.min_frame_factor",
        "ranking.quality.floor",
        "ranking.quality.ceiling",
        // [ranking.confidence]
        "ranking.confidence",
        "ranking.confidence.quality_weight",
        "ranking.confidence.signal_weight",
        // [ranking.thresholds]
        "ranking.thresholds",
        "ranking.thresholds.low_turn_sep",
        "ranking.thresholds.low_turn_hip_turn",
        "ranking.thresholds.late_hips_sep",
        // [ranking.scoring]
        "ranking.scoring",
        "ranking.scoring.base_score",
        "ranking.scoring.low_turn_sep_weight",
        "ranking.scoring.low_turn_hip_weight",
        "ranking.scoring.late_hips_sep_weight",
        "ranking.scoring.sway_bonus",
        "ranking.scoring.fallback_score",
        // [ranking.signals]
        "ranking.signals",
        "ranking.signals.baseline",
        "ranking.signals.sway_present",
        "ranking.signals.sway_absent",
        "ranking.signals.fallback",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smaller key so suggestions are
/// stable across runs.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; parse errors are left to serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Suspicious Values
// ============================================================================

/// Warn about values that validate but are unlikely to be intended.
pub fn suspicious_value_warnings(config: &super::AnalysisConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let s = &config.smoothing;

    if s.alpha >= 0.95 {
        warnings.push(ValidationWarning {
            field: "smoothing.alpha".to_string(),
            message: format!("smoothing.alpha = {} leaves landmarks almost unsmoothed", s.alpha),
            suggestion: None,
        });
    }

    // At 30 fps, holding for more than ~1/3 s freezes visible motion
    if s.max_gap > 10 {
        warnings.push(ValidationWarning {
            field: "smoothing.max_gap".to_string(),
            message: format!(
                "smoothing.max_gap = {} holds stale landmarks across long dropouts",
                s.max_gap
            ),
            suggestion: None,
        });
    }

    let q = &config.ranking.quality;
    if q.ceiling >= 100.0 {
        warnings.push(ValidationWarning {
            field: "ranking.quality.ceiling".to_string(),
            message: "ranking.quality.ceiling = 100 allows absolute confidence".to_string(),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
