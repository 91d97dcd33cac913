//! LOAD stage: data directory → ens_io readers → deterministic bundle.
//! - Reference tables become read-only stores (`reference`).
//! - Each `loc_*.csv` becomes one ensemble, keyed by (reference date, location).
//!   A file that fails to parse is skipped and reported; the run continues.
//! - Every input file is digested for the run record.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;

use ens_core::entities::Ensemble;
use ens_core::LocationId;
use ens_io::hasher;
use ens_io::layout::{self, DataLayout};
use ens_io::tables;

use crate::reference::{LocationRegistry, ObservedLookup, ThresholdStore};
use crate::PipelineError;

/// SHA-256 of every input file, keyed by path relative to the data directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputDigests {
    pub files: BTreeMap<String, String>,
}

/// All ensembles, grouped by reference date then location.
#[derive(Clone, Debug, Default)]
pub struct EnsembleIndex {
    reference_dates: Vec<NaiveDate>,
    by_reference: BTreeMap<NaiveDate, BTreeMap<LocationId, Ensemble>>,
}

impl EnsembleIndex {
    pub fn new(reference_dates: Vec<NaiveDate>) -> Self {
        let mut dates = reference_dates;
        dates.sort_unstable();
        dates.dedup();
        Self { reference_dates: dates, by_reference: BTreeMap::new() }
    }

    /// Add an ensemble; rows of a second file for the same key are appended.
    pub fn insert(&mut self, ensemble: Ensemble) {
        if let Err(pos) = self.reference_dates.binary_search(&ensemble.reference_date) {
            self.reference_dates.insert(pos, ensemble.reference_date);
        }
        let per_ref = self.by_reference.entry(ensemble.reference_date).or_default();
        match per_ref.get_mut(&ensemble.location) {
            Some(existing) => {
                log::debug!(
                    "merging second trajectory file for {} @ {}",
                    ensemble.location,
                    ensemble.reference_date
                );
                existing.rows.extend(ensemble.rows);
            }
            None => {
                per_ref.insert(ensemble.location.clone(), ensemble);
            }
        }
    }

    /// Every reference date found on disk, ascending (including dates with no ensembles).
    pub fn reference_dates(&self) -> &[NaiveDate] {
        &self.reference_dates
    }

    pub fn at(&self, reference_date: NaiveDate) -> impl Iterator<Item = (&LocationId, &Ensemble)> {
        self.by_reference.get(&reference_date).into_iter().flat_map(|m| m.iter())
    }

    pub fn get(&self, reference_date: NaiveDate, location: &LocationId) -> Option<&Ensemble> {
        self.by_reference.get(&reference_date).and_then(|m| m.get(location))
    }

    /// Every location with an ensemble on any reference date, ascending.
    pub fn locations(&self) -> BTreeSet<LocationId> {
        self.by_reference.values().flat_map(|m| m.keys().cloned()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_reference.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loaded, normalized inputs consumed by the later stages.
#[derive(Clone, Debug)]
pub struct LoadedInputs {
    pub layout: DataLayout,
    pub registry: LocationRegistry,
    pub observed: ObservedLookup,
    pub thresholds: ThresholdStore,
    pub ensembles: EnsembleIndex,
    pub digests: InputDigests,
    /// Trajectory rows discarded for a missing, negative or non-finite value.
    pub dropped_rows: usize,
    /// Trajectory files skipped because they failed to parse, by relative path.
    pub unreadable_files: Vec<String>,
}

fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scan `root`, read every table and trajectory file, and digest the inputs.
pub fn load_data_dir(root: &Path) -> Result<LoadedInputs, PipelineError> {
    let layout = layout::scan_data_dir(root)?;

    let registry = LocationRegistry::from_locations(tables::read_locations(&layout.locations)?);
    let observed = match &layout.target_data {
        Some(p) => ObservedLookup::from_points(tables::read_observed(p)?),
        None => ObservedLookup::default(),
    };
    let thresholds = match &layout.thresholds {
        Some(p) => ThresholdStore::from_rows(tables::read_thresholds(p)?),
        None => ThresholdStore::default(),
    };
    log::info!(
        "loaded {} locations, {} observations, {} threshold rows",
        registry.len(),
        observed.len(),
        thresholds.len()
    );

    let mut ensembles = EnsembleIndex::new(layout.reference_dates());
    let mut dropped_rows = 0usize;
    let mut unreadable_files = Vec::new();
    for dir in &layout.reference_dirs {
        for file in &dir.location_files {
            let table = match tables::read_trajectory_file(file) {
                Ok(t) => t,
                Err(e) => {
                    log::warn!("{}: skipped: {e}", file.display());
                    unreadable_files.push(relative_key(&layout.root, file));
                    continue;
                }
            };
            dropped_rows += table.dropped;
            let Some(location) = table.location else {
                log::debug!("{}: no rows; skipped", file.display());
                continue;
            };
            ensembles.insert(Ensemble {
                location,
                reference_date: dir.reference_date,
                rows: table.rows,
            });
        }
    }
    log::info!(
        "loaded {} ensembles across {} reference date(s)",
        ensembles.len(),
        ensembles.reference_dates().len()
    );

    let mut digests = InputDigests::default();
    for path in layout.input_files() {
        let hex = hasher::sha256_file(path)?;
        digests.files.insert(relative_key(&layout.root, path), hex);
    }

    Ok(LoadedInputs {
        layout,
        registry,
        observed,
        thresholds,
        ensembles,
        digests,
        dropped_rows,
        unreadable_files,
    })
}
