// crates/ens_cli/src/main.rs
//
// Exit codes, typed error mapping, config loading, the validate-only
// short-circuit, and the full run path
// (config → load → pipeline → render → write artifacts → run record).

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    /// Bad flags, bad config, malformed tables, failed strict validation.
    pub const VALIDATION: u8 = 2;
    /// Missing inputs, unreadable files, failed writes.
    pub const IO: u8 = 4;
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use log::LevelFilter;

use args::{parse_and_validate as parse_cli, Args};
use ens_core::EngineConfig;
use ens_io::canonical_json::{write_atomic, write_canonical_file};
use ens_io::hasher::sha256_hex;
use ens_io::IoError;
use ens_pipeline::validate::validate;
use ens_pipeline::{
    build_run_record, engine_identifiers, load_data_dir, run_with_ctx, PipelineCtx, PipelineError,
};
use ens_report::{render_artifacts, ReportError};

const RUN_RECORD_FILE: &str = "run_record.json";

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("ens: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };
    init_logger(args.quiet);

    let result = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    match result {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            log::error!("{e}");
            eprintln!("ens: error: {e}");
            ExitCode::from(map_error(&e))
        }
    }
}

/// pretty_env_logger on stderr. `RUST_LOG` overrides the flag-derived default.
fn init_logger(quiet: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if quiet { LevelFilter::Warn } else { LevelFilter::Info });
    builder.parse_env("RUST_LOG");
    builder.try_init().ok();
}

fn map_error(e: &MainError) -> u8 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Csv { path, msg } => MainError::Validation(format!("csv {path}: {msg}")),
        IoError::Json(m) => MainError::Validation(format!("json: {m}")),
        IoError::Layout(m) => MainError::Io(format!("layout: {m}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Hash(m) => MainError::Io(format!("hash: {m}")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Config(m) => MainError::Validation(format!("config: {m}")),
        PipelineError::Validate(m) => MainError::Validation(m),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Io(format!("render: {e}"))
}

/// Defaults, then the `--config` file, then flag overrides; validated last.
fn effective_config(args: &Args) -> Result<EngineConfig, MainError> {
    let mut cfg = match &args.config {
        Some(path) => {
            let bytes = fs::read(path).map_err(|e| MainError::Io(format!("read {}: {e}", path.display())))?;
            serde_json::from_slice::<EngineConfig>(&bytes)
                .map_err(|e| MainError::Validation(format!("config {}: {e}", path.display())))?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        cfg.sample_seed = seed;
    }
    if let Some(n) = args.sample_size {
        cfg.sample_size = n;
    }
    if args.strict_thresholds {
        cfg.strict_thresholds = true;
    }
    cfg.validate().map_err(|e| MainError::Validation(format!("config: {e}")))?;
    Ok(cfg)
}

/// Load and validate only; no artifacts.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let cfg = effective_config(args)?;
    let inputs = load_data_dir(&args.data_dir).map_err(map_pipeline_err)?;
    let report = validate(&inputs, &cfg);
    for w in report.warnings() {
        log::warn!("{} {:?}: {}", w.code, w.where_, w.message);
    }
    if let Some(e) = report.errors().next() {
        return Err(MainError::Validation(format!("{} {:?}: {}", e.code, e.where_, e.message)));
    }
    log::info!(
        "validate-only: inputs OK ({} reference date(s), {} ensemble(s), {} warning(s))",
        inputs.ensembles.reference_dates().len(),
        inputs.ensembles.len(),
        report.warnings().count()
    );
    Ok(())
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let config = effective_config(args)?;
    let inputs = load_data_dir(&args.data_dir).map_err(map_pipeline_err)?;
    let ctx = PipelineCtx { inputs, config, engine_meta: engine_identifiers() };
    let outs = run_with_ctx(&ctx).map_err(map_pipeline_err)?;

    let artifacts = render_artifacts(&outs).map_err(map_report_err)?;
    let outputs = write_artifacts(&args.out, &artifacts)?;

    let record = build_run_record(&ctx.engine_meta, &ctx.config, &outs.input_digests, &outputs, outs.counts)
        .map_err(map_pipeline_err)?;
    write_canonical_file(&args.out.join(RUN_RECORD_FILE), &record).map_err(map_io_err)?;

    log::info!(
        "{} artifact(s) written to {} ({})",
        artifacts.len() + 1,
        args.out.display(),
        record.id
    );
    Ok(())
}

/// Write every artifact atomically; returns rel path → SHA-256 of the bytes written.
fn write_artifacts(
    out_dir: &Path,
    artifacts: &[ens_report::Artifact],
) -> Result<BTreeMap<String, String>, MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    let mut digests = BTreeMap::new();
    for a in artifacts {
        let path = a.rel_path.split('/').fold(out_dir.to_path_buf(), |p, part| p.join(part));
        write_atomic(&path, &a.bytes).map_err(map_io_err)?;
        digests.insert(a.rel_path.clone(), sha256_hex(&a.bytes));
    }
    Ok(digests)
}
