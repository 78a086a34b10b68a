//! Swing Insight: pose smoothing and fault ranking for golf swing analysis
//!
//! Post-processing for per-frame pose estimates of a swing video.
//!
//! ## Architecture
//!
//! - **Smoothing**: EMA over landmark coordinates that holds through short
//!   tracking dropouts and resets on structural breaks, plus an offline
//!   interpolate-then-smooth variant
//! - **QC**: dropped frames, detector confidence and a jitter proxy for a
//!   pose sequence
//! - **Ranking**: rule-based importance, confidence and evidence for the
//!   fault tags of a swing report
//! - **Config**: TOML-tunable smoothing parameters and ranking heuristics
//! - **Document**: JSON I/O for pose sequences and swing reports

pub mod config;
pub mod document;
pub mod qc;
pub mod ranking;
pub mod smoothing;
pub mod types;

// Re-export configuration
pub use config::{AnalysisConfig, ConfigError, RankingConfig, SmoothingConfig, SmoothingMethod};

// Re-export commonly used types
pub use types::{
    FaultKind, Frame, Landmark, PoseSequence, RankedFault, RankingReport, SwingMetrics,
};

// Re-export the pipeline entry points
pub use document::DocumentError;
pub use qc::{pose_qc, pose_qc_document, PoseQcReport};
pub use ranking::{build_report, rank};
pub use smoothing::{interpolate_and_smooth, smooth, smooth_document, SmoothingParams};
