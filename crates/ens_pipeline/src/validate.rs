//! crates/ens_pipeline/src/validate.rs
//! Structural & semantic checks before any classification.
//!
//! Findings are collected, not thrown: the orchestrator logs warnings and
//! stops only when the report carries an `Error`. Threshold rows that are
//! not monotonic are warnings unless `strict_thresholds` is set.

use std::cmp::Ordering;

use ens_core::{EngineConfig, LocationId};

use crate::load::LoadedInputs;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityRef {
    Root,
    Config(&'static str),
    Location(LocationId),
    File(String),
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub where_: EntityRef,
}

/// Issue order is stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

/// Top-level entry point.
pub fn validate(inputs: &LoadedInputs, cfg: &EngineConfig) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_config(cfg));
    issues.extend(check_thresholds(inputs, cfg));
    issues.extend(check_ensemble_locations(inputs));
    issues.extend(check_trajectory_files(inputs));
    issues.extend(check_reference_dates(inputs));

    sort_issues_stably(&mut issues);

    ValidationReport { issues }
}

fn check_config(cfg: &EngineConfig) -> Vec<ValidationIssue> {
    match cfg.validate() {
        Ok(()) => Vec::new(),
        Err(e) => vec![ValidationIssue {
            severity: Severity::Error,
            code: "Config.Domain",
            message: e.to_string(),
            where_: EntityRef::Config("engine_config"),
        }],
    }
}

/// p25 ≤ p50 ≤ p75 per location row.
fn check_thresholds(inputs: &LoadedInputs, cfg: &EngineConfig) -> Vec<ValidationIssue> {
    let severity = if cfg.strict_thresholds { Severity::Error } else { Severity::Warning };
    inputs
        .thresholds
        .iter()
        .filter_map(|(id, set)| {
            set.check_monotonic().err().map(|e| ValidationIssue {
                severity,
                code: "Thresholds.NonMonotonic",
                message: e.to_string(),
                where_: EntityRef::Location(id.clone()),
            })
        })
        .collect()
}

/// Ensembles whose location cannot be summarized (unknown or no population).
fn check_ensemble_locations(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for id in inputs.ensembles.locations() {
        match inputs.registry.get(&id) {
            None => issues.push(ValidationIssue {
                severity: Severity::Warning,
                code: "Location.Unknown",
                message: "trajectories present but no location row; skipped".to_string(),
                where_: EntityRef::Location(id),
            }),
            Some(loc) if loc.population == 0 => issues.push(ValidationIssue {
                severity: Severity::Warning,
                code: "Location.NoPopulation",
                message: "population missing or zero; skipped".to_string(),
                where_: EntityRef::Location(id),
            }),
            Some(_) => {}
        }
    }
    issues
}

fn check_trajectory_files(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    inputs
        .unreadable_files
        .iter()
        .map(|path| ValidationIssue {
            severity: Severity::Warning,
            code: "Trajectories.Unreadable",
            message: "trajectory file failed to parse; skipped".to_string(),
            where_: EntityRef::File(path.clone()),
        })
        .collect()
}

fn check_reference_dates(inputs: &LoadedInputs) -> Vec<ValidationIssue> {
    if inputs.ensembles.reference_dates().is_empty() {
        vec![ValidationIssue {
            severity: Severity::Warning,
            code: "Trajectories.Empty",
            message: "no ref_YYYY-MM-DD directories found".to_string(),
            where_: EntityRef::Root,
        }]
    } else {
        Vec::new()
    }
}

/// Deterministic order: code, then where, then message.
fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| match a.code.cmp(b.code) {
        Ordering::Equal => match a.where_.cmp(&b.where_) {
            Ordering::Equal => a.message.cmp(&b.message),
            o => o,
        },
        o => o,
    });
}
