//! Analysis Configuration Module
//!
//! Smoothing parameters and ranking heuristics loaded from TOML, replacing
//! hardcoded constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `SWING_INSIGHT_CONFIG` environment variable (path to TOML file)
//! 2. `swing_insight.toml` in the current working directory
//! 3. Built-in defaults (see `defaults`)
//!
//! ## Usage
//!
//! ```ignore
//! // In main():
//! config::init(AnalysisConfig::load());
//!
//! // Anywhere in the codebase:
//! let alpha = config::get().smoothing.alpha;
//! ```
//!
//! Library entry points never require `init()`: they fall back to the
//! built-in defaults when no config has been installed.

mod analysis_config;
pub mod defaults;
pub mod validation;

pub use analysis_config::*;

use std::sync::OnceLock;

/// Global analysis configuration, initialized once at startup.
static ANALYSIS_CONFIG: OnceLock<AnalysisConfig> = OnceLock::new();

/// Initialize the global analysis configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: AnalysisConfig) {
    if ANALYSIS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global analysis configuration.
///
/// Returns built-in defaults when `init()` has not been called.
pub fn get() -> &'static AnalysisConfig {
    static DEFAULTS: OnceLock<AnalysisConfig> = OnceLock::new();
    ANALYSIS_CONFIG
        .get()
        .unwrap_or_else(|| DEFAULTS.get_or_init(AnalysisConfig::default))
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ANALYSIS_CONFIG.get().is_some()
}
