// crates/ens_pipeline/src/build_run_record.rs
//
// run_record.json: what ran, with which settings, over which bytes.
//
// - `id` = "RUN:" + SHA-256 of the canonical record without its id.
// - Inputs and outputs are listed by relative path with their SHA-256.
// - No wall-clock timestamp: two runs over the same inputs produce the same
//   record byte for byte.

use std::collections::BTreeMap;

use serde::Serialize;

use ens_core::{EngineConfig, LocationId};
use ens_io::hasher;

use crate::{EngineMeta, PipelineError};

/// Effective settings echoed into the record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigEcho {
    pub sample_seed: u64,
    pub sample_size: usize,
    pub max_horizon: u32,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub baseline_offset_days: i64,
    pub excluded_locations: Vec<LocationId>,
    pub strict_thresholds: bool,
    /// Digest of the full effective configuration.
    pub config_sha256: String,
}

/// Counters for a quick sanity read of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub reference_dates: usize,
    pub locations: usize,
    pub ensembles: usize,
    pub forecast_records: usize,
    pub trajectory_files: usize,
    pub skipped_files: usize,
    pub skipped_no_population: usize,
    pub empty_horizons: usize,
    pub dropped_rows: usize,
    pub validation_warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecordDoc {
    pub id: String,
    pub engine: EngineMeta,
    pub config: ConfigEcho,
    pub inputs: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, String>,
    pub counts: RunCounts,
}

pub fn config_echo(cfg: &EngineConfig) -> Result<ConfigEcho, PipelineError> {
    let config_sha256 = hasher::sha256_canonical(cfg)?;
    Ok(ConfigEcho {
        sample_seed: cfg.sample_seed,
        sample_size: cfg.sample_size,
        max_horizon: cfg.max_horizon,
        lower_percentile: cfg.lower_percentile,
        upper_percentile: cfg.upper_percentile,
        baseline_offset_days: cfg.baseline_offset_days,
        excluded_locations: cfg.excluded_locations.clone(),
        strict_thresholds: cfg.strict_thresholds,
        config_sha256,
    })
}

/// Assemble the record and derive its id.
pub fn build_run_record(
    engine: &EngineMeta,
    cfg: &EngineConfig,
    inputs: &BTreeMap<String, String>,
    outputs: &BTreeMap<String, String>,
    counts: RunCounts,
) -> Result<RunRecordDoc, PipelineError> {
    let config = config_echo(cfg)?;

    #[derive(Serialize)]
    struct RunNoId<'a> {
        engine: &'a EngineMeta,
        config: &'a ConfigEcho,
        inputs: &'a BTreeMap<String, String>,
        outputs: &'a BTreeMap<String, String>,
        counts: &'a RunCounts,
    }
    let hex = hasher::sha256_canonical(&RunNoId {
        engine,
        config: &config,
        inputs,
        outputs,
        counts: &counts,
    })?;

    Ok(RunRecordDoc {
        id: format!("RUN:{hex}"),
        engine: engine.clone(),
        config,
        inputs: inputs.clone(),
        outputs: outputs.clone(),
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn id_is_stable_and_sensitive_to_outputs() {
        let engine = crate::engine_identifiers();
        let cfg = EngineConfig::default();
        let inputs = files(&[("locations.csv", "aa")]);
        let a = build_run_record(&engine, &cfg, &inputs, &files(&[("x.json", "01")]), RunCounts::default()).unwrap();
        let b = build_run_record(&engine, &cfg, &inputs, &files(&[("x.json", "01")]), RunCounts::default()).unwrap();
        let c = build_run_record(&engine, &cfg, &inputs, &files(&[("x.json", "02")]), RunCounts::default()).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert!(a.id.starts_with("RUN:"));
        assert_eq!(a.id.len(), 4 + 64);
    }

    #[test]
    fn config_digest_tracks_seed() {
        let mut cfg = EngineConfig::default();
        let a = config_echo(&cfg).unwrap();
        cfg.sample_seed = 7;
        let b = config_echo(&cfg).unwrap();
        assert_ne!(a.config_sha256, b.config_sha256);
        assert_eq!(b.sample_seed, 7);
    }
}
