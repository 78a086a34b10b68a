//! Human-readable evidence lines for a ranked fault.

use super::scoring::below_threshold;
use crate::config::RankingConfig;
use crate::types::{FaultKind, SwingMetrics};

/// Round to `digits` decimals for display.
fn rounded(value: f64, digits: i32) -> f64 {
    let p = 10f64.powi(digits);
    (value * p).round() / p
}

/// Ordered evidence for one fault.
///
/// Data-quality lines come first (frame count when non-zero, then the pose
/// OK rate, 1 when not reported), followed by the proxies relevant to the
/// fault and the threshold each was compared against. The OK rate line
/// keeps the list non-empty.
pub fn evidence_for(kind: FaultKind, metrics: &SwingMetrics, config: &RankingConfig) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(frames) = metrics.frames_used().filter(|&f| f != 0.0) {
        lines.push(format!("Frames used: {frames}"));
    }
    let ok_rate = metrics.ok_rate().unwrap_or(1.0);
    lines.push(format!("Pose OK rate: {}", rounded(ok_rate, 2)));

    match kind {
        FaultKind::LowTurn | FaultKind::LateHips => {
            if let Some(sep) = metrics.sep_med() {
                lines.push(format!("Separation proxy (sepMed): {}", rounded(sep, 3)));
            }
            if let Some(hip) = metrics.hip_turn() {
                lines.push(format!("Hip turn proxy: {}", rounded(hip, 3)));
            }
            if let Some(shoulder) = metrics.sh_turn() {
                lines.push(format!("Shoulder turn proxy: {}", rounded(shoulder, 3)));
            }

            let t = &config.thresholds;
            let sep_threshold = if kind == FaultKind::LowTurn {
                t.low_turn_sep
            } else {
                t.late_hips_sep
            };
            if let Some(signal) = below_threshold(metrics.sep_med(), sep_threshold, 100.0) {
                lines.push(format!(
                    "Signal: sepMed below {sep_threshold} → {}%",
                    signal.round() as u32
                ));
            }
            if kind == FaultKind::LowTurn {
                if let Some(signal) = below_threshold(metrics.hip_turn(), t.low_turn_hip_turn, 100.0) {
                    lines.push(format!(
                        "Signal: hipTurn below {} → {}%",
                        t.low_turn_hip_turn,
                        signal.round() as u32
                    ));
                }
            }
        }
        FaultKind::Sway | FaultKind::ReversePivot => {
            if let Some(sway) = metrics.sway {
                lines.push(format!("Sway flag: {sway}"));
            }
        }
        FaultKind::Foundation | FaultKind::Other => {}
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_report_default_ok_rate() {
        let lines = evidence_for(FaultKind::LowTurn, &SwingMetrics::default(), &RankingConfig::default());
        assert_eq!(lines, vec!["Pose OK rate: 1".to_string()]);
    }

    #[test]
    fn low_turn_lists_values_then_signals() {
        let m = SwingMetrics {
            ok_rate: Some(0.934),
            frames_used: Some(72.0),
            sep_med: Some(0.03012),
            hip_turn: Some(0.56),
            sh_turn: Some(0.8),
            sway: Some(true),
        };
        let lines = evidence_for(FaultKind::LowTurn, &m, &RankingConfig::default());
        assert_eq!(
            lines,
            vec![
                "Frames used: 72",
                "Pose OK rate: 0.93",
                "Separation proxy (sepMed): 0.03",
                "Hip turn proxy: 0.56",
                "Shoulder turn proxy: 0.8",
                "Signal: sepMed below 0.045 → 33%",
                "Signal: hipTurn below 0.7 → 20%",
            ]
        );
    }

    #[test]
    fn late_hips_uses_its_own_threshold() {
        let m = SwingMetrics {
            sep_med: Some(0.02),
            ..SwingMetrics::default()
        };
        let lines = evidence_for(FaultKind::LateHips, &m, &RankingConfig::default());
        assert_eq!(lines.last().map(String::as_str), Some("Signal: sepMed below 0.04 → 50%"));
    }

    #[test]
    fn sway_reports_flag() {
        let m = SwingMetrics {
            sway: Some(false),
            ..SwingMetrics::default()
        };
        let lines = evidence_for(FaultKind::ReversePivot, &m, &RankingConfig::default());
        assert_eq!(lines, vec!["Pose OK rate: 1", "Sway flag: false"]);
    }

    #[test]
    fn zero_frames_are_not_reported() {
        let m = SwingMetrics {
            frames_used: Some(0.0),
            ok_rate: Some(0.5),
            ..SwingMetrics::default()
        };
        let lines = evidence_for(FaultKind::Other, &m, &RankingConfig::default());
        assert_eq!(lines, vec!["Pose OK rate: 0.5".to_string()]);
    }

    #[test]
    fn fractional_frame_count_is_shown_as_reported() {
        let m = SwingMetrics {
            frames_used: Some(44.5),
            ..SwingMetrics::default()
        };
        let lines = evidence_for(FaultKind::Foundation, &m, &RankingConfig::default());
        assert_eq!(lines, vec!["Frames used: 44.5", "Pose OK rate: 1"]);
    }
}
