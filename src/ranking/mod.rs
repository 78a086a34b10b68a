//! Fault Ranking
//!
//! Deterministic, rule-based ranking of qualitative swing fault tags. The
//! tags come from upstream analysis; this module explains them with the
//! swing metrics already computed and never invents new ones.
//!
//! ## Per fault
//! - **Score** (importance, 0-100): base score plus the distance of each
//!   relevant proxy below its threshold
//! - **Confidence** (0-100): `quality_weight * quality + signal_weight * signal`,
//!   so noisy tracking caps confidence in a strong signal and a weak signal
//!   caps confidence on clean tracking
//! - **Evidence**: the metric values and thresholds behind the numbers
//!
//! Results are sorted by score, then confidence, both descending. Identical
//! inputs always produce identical output.

mod scoring;
mod evidence;
mod report;

pub use evidence::evidence_for;
pub use report::{
    attach_ranking, build_report, build_report_with, fault_tags_from_report, metrics_from_report,
};
pub use scoring::{blended_confidence, importance_score, quality_score, signal_strength};

use tracing::debug;

use crate::config::RankingConfig;
use crate::types::{fault_label, FaultKind, RankedFault, SwingMetrics};

/// Rank fault tags using the installed config (or built-in defaults).
///
/// Empty tags are skipped; an empty tag list yields an empty ranking.
pub fn rank<S: AsRef<str>>(tags: &[S], metrics: &SwingMetrics) -> Vec<RankedFault> {
    rank_with(tags, metrics, &crate::config::get().ranking)
}

/// Rank fault tags with explicit ranking heuristics.
pub fn rank_with<S: AsRef<str>>(
    tags: &[S],
    metrics: &SwingMetrics,
    config: &RankingConfig,
) -> Vec<RankedFault> {
    let quality = quality_score(metrics, &config.quality);

    let mut ranked: Vec<RankedFault> = tags
        .iter()
        .map(|tag| tag.as_ref())
        .filter(|key| !key.is_empty())
        .map(|key| {
            let kind = FaultKind::from_key(key);
            let signal = signal_strength(kind, metrics, config);
            RankedFault {
                key: key.to_string(),
                label: fault_label(key),
                score: importance_score(kind, metrics, config),
                confidence: blended_confidence(quality, signal, &config.confidence),
                evidence: evidence_for(kind, metrics, config),
            }
        })
        .collect();

    // Stable sort: equal score and confidence keep input order
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.confidence.cmp(&a.confidence))
    });

    debug!(
        faults = ranked.len(),
        quality,
        priority = ranked.first().map(|f| f.key.as_str()),
        "Faults ranked"
    );

    ranked
}
