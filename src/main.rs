//! swing-insight - pose smoothing and fault ranking for swing analysis
//!
//! # Usage
//!
//! ```bash
//! # Smooth pose JSON files (writes <stem>.smoothed.json next to each input)
//! swing-insight smooth clip1.json clip2.json
//!
//! # Offline interpolation with a custom alpha
//! swing-insight smooth clip.json --method interpolate --alpha 0.3 -o clip.out.json
//!
//! # Attach ranked faults to a swing report, dropping raw pose frames
//! swing-insight rank report.json --strip-frames
//!
//! # Pose quality check (missing frames, confidence, jitter)
//! swing-insight qc clip.json
//!
//! # Show the effective configuration
//! swing-insight config
//! ```
//!
//! # Environment Variables
//!
//! - `SWING_INSIGHT_CONFIG`: Path to the analysis config TOML
//! - `RUST_LOG`: Logging level (default: info)
//!
//! Logs go to stderr; `--log-json` switches them to one JSON object per line.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{error, info, warn};

use swing_insight::config::{self, AnalysisConfig, SmoothingMethod};
use swing_insight::document::{read_json, strip_frames, write_json, DocumentError};
use swing_insight::qc::pose_qc_document;
use swing_insight::ranking::{
    attach_ranking, build_report_with, fault_tags_from_report, metrics_from_report,
};
use swing_insight::smoothing::{smooth_document, SmoothingParams};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "swing-insight")]
#[command(about = "Pose smoothing and fault ranking for golf swing analysis")]
#[command(version)]
struct CliArgs {
    /// Analysis config TOML (overrides SWING_INSIGHT_CONFIG and ./swing_insight.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Smooth landmark jitter in pose sequence JSON files
    Smooth(SmoothArgs),

    /// Rank the fault tags of a swing report and attach the result
    Rank(RankArgs),

    /// Report missing frames, detector confidence and jitter of a pose file
    Qc(QcArgs),

    /// Print the effective configuration as TOML
    Config {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct SmoothArgs {
    /// Pose JSON files: a frame array, or an object with `frames` / `pose`
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short, long, value_name = "FILE", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Directory for <stem>.smoothed.json outputs (default: next to each input)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Weight of the newest observation, (0, 1]
    #[arg(long)]
    alpha: Option<f64>,

    /// Rejected frames bridged before the filter resets
    #[arg(long)]
    max_gap: Option<usize>,

    /// Minimum landmark visibility
    #[arg(long)]
    min_visibility: Option<f64>,

    /// Minimum landmark presence
    #[arg(long)]
    min_presence: Option<f64>,

    /// Smoothing strategy
    #[arg(long, value_enum)]
    method: Option<SmoothingMethod>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Swing report JSON
    report: PathBuf,

    /// Output file (default: <stem>.ranked.json next to the report)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Remove every nested `frames` array from the output
    #[arg(long)]
    strip_frames: bool,

    /// Fault tags to rank instead of the report's own (comma-separated)
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Number of top faults to list
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args, Debug)]
struct QcArgs {
    /// Pose JSON file
    input: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

// ============================================================================
// Smooth
// ============================================================================

/// `<stem>.<suffix>.json` in `dir`, or next to `input`.
fn derived_path(input: &Path, dir: Option<&Path>, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pose".to_string());
    let name = format!("{stem}.{suffix}.json");
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

fn smooth_file(
    input: &Path,
    output: &Path,
    params: &SmoothingParams,
    method: SmoothingMethod,
) -> Result<(), DocumentError> {
    let doc = read_json(input)?;
    let smoothed = smooth_document(&doc, params, method);
    write_json(output, &smoothed)?;

    let jitter = |doc: &Value| pose_qc_document(doc).and_then(|report| report.jitter);
    info!(
        input = %input.display(),
        output = %output.display(),
        jitter_before = ?jitter(&doc),
        jitter_after = ?jitter(&smoothed),
        "Smoothed pose sequence"
    );
    Ok(())
}

fn run_smooth(args: SmoothArgs) -> Result<()> {
    if args.output.is_some() && args.inputs.len() > 1 {
        bail!("--output takes a single input; use --out-dir for {} inputs", args.inputs.len());
    }

    let mut params = SmoothingParams::current();
    if let Some(alpha) = args.alpha {
        params = params.with_alpha(alpha);
    }
    if let Some(max_gap) = args.max_gap {
        params = params.with_max_gap(max_gap);
    }
    if let Some(min_visibility) = args.min_visibility {
        params = params.with_min_visibility(min_visibility);
    }
    if let Some(min_presence) = args.min_presence {
        params = params.with_min_presence(min_presence);
    }
    let method = args.method.unwrap_or(config::get().smoothing.method);

    if params.effective_alpha() != params.alpha {
        warn!(
            requested = params.alpha,
            effective = params.effective_alpha(),
            "Alpha outside (0, 1], clamping"
        );
    }
    info!(
        files = args.inputs.len(),
        alpha = params.effective_alpha(),
        max_gap = params.max_gap,
        method = ?method,
        "Smoothing pose sequences"
    );

    let jobs: Vec<(PathBuf, PathBuf)> = args
        .inputs
        .iter()
        .map(|input| {
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| derived_path(input, args.out_dir.as_deref(), "smoothed"));
            (input.clone(), output)
        })
        .collect();

    let failed = jobs
        .par_iter()
        .map(|(input, output)| smooth_file(input, output, &params, method))
        .filter_map(Result::err)
        .inspect(|e| error!(error = %e, "Smoothing failed"))
        .count();

    if failed > 0 {
        bail!("{failed} of {} files failed to smooth", jobs.len());
    }
    Ok(())
}

// ============================================================================
// Rank
// ============================================================================

fn run_rank(args: RankArgs) -> Result<()> {
    let doc = read_json(&args.report)?;
    let Value::Object(mut report) = doc else {
        bail!("{} is not a JSON object", args.report.display());
    };

    let mut ranking_config = config::get().ranking.clone();
    if let Some(top) = args.top {
        ranking_config.top_n = top;
    }

    let report_value = Value::Object(report.clone());
    let tags = args
        .tags
        .unwrap_or_else(|| fault_tags_from_report(&report_value));
    let metrics = metrics_from_report(&report_value);
    let ranking = build_report_with(&tags, &metrics, &ranking_config);

    attach_ranking(&mut report, &ranking);
    let meta = report
        .entry("meta")
        .or_insert_with(|| Value::Object(Default::default()));
    if let Value::Object(meta) = meta {
        meta.insert(
            "rankedAt".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }

    let mut out = Value::Object(report);
    if args.strip_frames {
        out = strip_frames(&out);
    }

    let output = args
        .output
        .unwrap_or_else(|| derived_path(&args.report, None, "ranked"));
    write_json(&output, &out)?;

    info!(
        faults = ranking.ranked_faults.len(),
        top = %ranking.top_faults.join(", "),
        output = %output.display(),
        "Ranked swing faults"
    );
    match ranking.ranked_faults.first() {
        Some(priority) => info!(
            key = %priority.key,
            score = priority.score,
            confidence = priority.confidence,
            "Priority fault: {}",
            priority.label
        ),
        None => info!("No fault tags to rank"),
    }
    Ok(())
}

// ============================================================================
// QC
// ============================================================================

fn run_qc(args: QcArgs) -> Result<()> {
    let doc = read_json(&args.input)?;
    let Some(report) = pose_qc_document(&doc) else {
        bail!("QC: could not find a frames list in {}", args.input.display());
    };

    info!(
        input = %args.input.display(),
        frames = report.frames,
        missing = report.missing_frames,
        ok_rate = report.ok_rate(),
        "Pose QC"
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

// ============================================================================
// Config
// ============================================================================

fn run_config(output: Option<PathBuf>) -> Result<()> {
    let toml = config::get().to_toml()?;
    match output {
        Some(path) => {
            std::fs::write(&path, toml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote effective config");
        }
        None => print!("{toml}"),
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn init_logging(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(args.log_json);

    // Load analysis configuration
    let analysis_config = match &args.config {
        Some(path) => AnalysisConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };
    config::init(analysis_config);

    match args.command {
        SubCommand::Smooth(smooth) => run_smooth(smooth),
        SubCommand::Rank(rank) => run_rank(rank),
        SubCommand::Qc(qc) => run_qc(qc),
        SubCommand::Config { output } => run_config(output),
    }
}
