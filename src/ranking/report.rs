//! Attaching a fault ranking to a swing report.
//!
//! Swing reports are loosely-typed JSON produced upstream. Tags are read
//! from `faults` (or the older `faultKeys`), metrics from
//! `narrative.metrics` (or top-level `metrics`).

use serde_json::{Map, Value};

use super::rank_with;
use crate::config::RankingConfig;
use crate::types::{frame_count, RankingReport, SwingMetrics};

/// Rank tags and summarize the result using the installed config.
pub fn build_report<S: AsRef<str>>(tags: &[S], metrics: &SwingMetrics) -> RankingReport {
    build_report_with(tags, metrics, &crate::config::get().ranking)
}

/// Rank tags and summarize the result with explicit heuristics.
///
/// `top_faults` holds the first `top_n` keys; the priority fault is the
/// first ranked one, if any.
pub fn build_report_with<S: AsRef<str>>(
    tags: &[S],
    metrics: &SwingMetrics,
    config: &RankingConfig,
) -> RankingReport {
    let ranked_faults = rank_with(tags, metrics, config);
    let top_faults = ranked_faults
        .iter()
        .take(config.top_n)
        .map(|f| f.key.clone())
        .collect();
    let priority = ranked_faults.first();

    RankingReport {
        priority_key: priority.map(|f| f.key.clone()),
        priority_label: priority.map(|f| f.label.clone()),
        top_faults,
        ranked_faults,
    }
}

/// Fault tags of a report: `faults`, else `faultKeys`.
///
/// Non-string and empty entries are dropped.
pub fn fault_tags_from_report(report: &Value) -> Vec<String> {
    ["faults", "faultKeys"]
        .iter()
        .find_map(|&key| report.get(key).and_then(Value::as_array))
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Swing metrics of a report: `narrative.metrics`, else `metrics`.
///
/// When the metrics carry no usable `framesUsed`, the report's top-level
/// `sampled` count stands in for it.
pub fn metrics_from_report(report: &Value) -> SwingMetrics {
    let raw = report
        .get("narrative")
        .and_then(|n| n.get("metrics"))
        .filter(|m| m.is_object())
        .or_else(|| report.get("metrics").filter(|m| m.is_object()));

    let mut metrics = raw.map(SwingMetrics::from_value).unwrap_or_default();
    if metrics.frames_used.is_none() {
        metrics.frames_used = report.get("sampled").and_then(frame_count);
    }
    metrics
}

/// Write a ranking into a report object.
///
/// `rankedFaults` and `topFaults` are always replaced. An existing
/// `priorityKey`/`priorityLabel` is kept. `faults` is guaranteed to be an
/// array afterwards, taken from `faultKeys` when missing.
pub fn attach_ranking(report: &mut Map<String, Value>, ranking: &RankingReport) {
    if !report.get("faults").is_some_and(Value::is_array) {
        let faults = report
            .get("faultKeys")
            .filter(|v| v.is_array())
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        report.insert("faults".to_string(), faults);
    }

    report.insert(
        "rankedFaults".to_string(),
        serde_json::to_value(&ranking.ranked_faults).unwrap_or_else(|_| Value::Array(Vec::new())),
    );
    report.insert(
        "topFaults".to_string(),
        Value::Array(ranking.top_faults.iter().cloned().map(Value::String).collect()),
    );

    let absent = |report: &Map<String, Value>, key: &str| report.get(key).map_or(true, Value::is_null);
    if let (Some(key), Some(label)) = (&ranking.priority_key, &ranking.priority_label) {
        if absent(report, "priorityKey") {
            report.insert("priorityKey".to_string(), Value::String(key.clone()));
        }
        if absent(report, "priorityLabel") {
            report.insert("priorityLabel".to_string(), Value::String(label.clone()));
        }
    }
}
