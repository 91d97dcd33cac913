//! ens_pipeline: deterministic pipeline surface (load → validate → classify → aggregate → sample → build).
//! Reading and hashing go through `ens_io`, math through `ens_algo`. Rendering and
//! writing artifacts is left to `ens_report` and the CLI.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use ens_core::entities::Location;
use ens_core::{CoreError, EngineConfig, LocationId};
use ens_io::IoError;

pub mod build_run_record;
pub mod forecast;
pub mod history;
pub mod load;
pub mod reference;
pub mod trajectories;
pub mod validate;

pub use build_run_record::{build_run_record, RunCounts, RunRecordDoc};
pub use forecast::{DashboardData, ForecastRecord};
pub use history::{SeasonHistory, TargetHistory};
pub use load::{load_data_dir, LoadedInputs};
pub use trajectories::TrajectoryBundle;
pub use validate::{Severity, ValidationReport};

/// Engine identifiers recorded in the run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(#[from] IoError),
    #[error("config: {0}")]
    Config(String),
    #[error("validate: {0}")]
    Validate(String),
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        PipelineError::Config(e.to_string())
    }
}

/// Pipeline context: inputs already loaded, configuration fixed for the run.
#[derive(Debug)]
pub struct PipelineCtx {
    pub inputs: LoadedInputs,
    pub config: EngineConfig,
    pub engine_meta: EngineMeta,
}

/// Everything the renderers need; full precision.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub dashboard: DashboardData,
    pub locations: Vec<Location>,
    pub target_history: TargetHistory,
    pub season_history: SeasonHistory,
    pub trajectories: BTreeMap<LocationId, TrajectoryBundle>,
    pub validation: ValidationReport,
    pub counts: RunCounts,
    /// Input path → SHA-256, echoed into the run record.
    pub input_digests: BTreeMap<String, String>,
}

// -------------------------------------- Public API --------------------------------------

/// Orchestrate every stage over a preloaded context.
pub fn run_with_ctx(ctx: &PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    let cfg = &ctx.config;

    // --- VALIDATE ---
    let validation = validate::validate(&ctx.inputs, cfg);
    for w in validation.warnings() {
        log::warn!("{} {:?}: {}", w.code, w.where_, w.message);
    }
    if let Some(e) = validation.errors().next() {
        return Err(match e.code {
            "Config.Domain" => PipelineError::Config(e.message.clone()),
            _ => PipelineError::Validate(format!("{} {:?}: {}", e.code, e.where_, e.message)),
        });
    }

    // --- FORECAST RECORDS ---
    let (dashboard, fc) = forecast::build_dashboard(&ctx.inputs, cfg);

    // --- REFERENCE EXPORTS ---
    let locations: Vec<Location> = ctx
        .inputs
        .registry
        .iter()
        .filter(|l| !cfg.is_excluded(&l.id))
        .cloned()
        .collect();
    let target_history = history::build_target_history(&ctx.inputs.observed, cfg);
    let season_history = history::build_season_history(&ctx.inputs.observed, cfg);

    // --- TRAJECTORIES ---
    let trajectories = trajectories::build_trajectory_bundles(&ctx.inputs, cfg);

    let counts = RunCounts {
        reference_dates: dashboard.reference_dates.len(),
        locations: locations.len(),
        ensembles: ctx.inputs.ensembles.len(),
        forecast_records: fc.records,
        trajectory_files: trajectories.len(),
        skipped_files: ctx.inputs.unreadable_files.len(),
        skipped_no_population: fc.skipped_no_population,
        empty_horizons: fc.empty_horizons,
        dropped_rows: ctx.inputs.dropped_rows,
        validation_warnings: validation.warnings().count(),
    };
    log::info!(
        "{} forecast record(s), {} trajectory bundle(s)",
        counts.forecast_records,
        counts.trajectory_files
    );

    Ok(PipelineOutputs {
        dashboard,
        locations,
        target_history,
        season_history,
        trajectories,
        validation,
        counts,
        input_digests: ctx.inputs.digests.files.clone(),
    })
}

/// Convenience entry: load `data_dir`, then run every stage.
pub fn run_from_data_dir<P: AsRef<Path>>(data_dir: P, config: EngineConfig) -> Result<PipelineOutputs, PipelineError> {
    config.validate()?;
    let inputs = load_data_dir(data_dir.as_ref())?;
    let ctx = PipelineCtx { inputs, config, engine_meta: engine_identifiers() };
    run_with_ctx(&ctx)
}

/// Engine identifiers for the run record.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        name: "ens_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
