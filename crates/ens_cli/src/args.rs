// crates/ens_cli/src/args.rs
//
// Offline CLI argument surface.
//
// Rules:
// - No networked paths (reject any scheme:// like http/https/file)
// - --data-dir must be an existing directory; --config an existing file
// - Seed override accepts decimal u64 or 0x-hex up to 16 nybbles
// - --validate-only loads and checks inputs without writing artifacts

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ens",
    disable_help_subcommand = true,
    about = "Summarize ensemble forecast trajectories into dashboard-ready JSON"
)]
pub struct Args {
    /// Input directory (locations.csv, target_data.csv, historical_thresholds.csv, trajectories/).
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Output directory for the JSON artifacts.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Engine configuration JSON; any subset of fields overrides the defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Trajectory sampling seed override. Decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    /// Number of runs sampled per (location, reference date).
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Fail on non-monotonic threshold rows instead of warning.
    #[arg(long)]
    pub strict_thresholds: bool,

    /// Load and validate inputs only; write nothing.
    #[arg(long)]
    pub validate_only: bool,

    /// Only log warnings and errors (RUST_LOG still wins).
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation. Messages stay short and stable.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadValue(&'static str),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local (no scheme): {p}"),
            NotFound(p) => write!(f, "not found: {p}"),
            BadValue(s) => write!(f, "invalid value: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

/// Absolute path; falls back to CWD-relative when the path does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

/// Entry point used by main.rs.
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

/// Scheme, existence and value checks, then path normalization.
pub fn validate(mut args: Args) -> Result<Args, CliError> {
    for p in [Some(args.data_dir.as_path()), Some(args.out.as_path()), args.config.as_deref()]
        .into_iter()
        .flatten()
    {
        ensure_local_path(p)?;
    }

    if !args.data_dir.is_dir() {
        return Err(CliError::NotFound(format!("--data-dir {}", args.data_dir.display())));
    }
    if let Some(cfg) = &args.config {
        if !cfg.is_file() {
            return Err(CliError::NotFound(format!("--config {}", cfg.display())));
        }
    }
    if args.sample_size == Some(0) {
        return Err(CliError::BadValue("--sample-size must be at least 1"));
    }

    args.data_dir = normalize_path(&args.data_dir);
    args.out = normalize_path(&args.out);
    args.config = args.config.take().map(|p| normalize_path(&p));
    Ok(args)
}
