//! Reference and trajectory entities shared by loaders, algorithms and the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{LocationId, RunId};

/// Static location metadata (one row of the location reference table).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub abbreviation: String,
    pub population: u64,
}

/// One observed (non-forecast) week for a location.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservedPoint {
    pub location: LocationId,
    pub date: NaiveDate,
    pub value: Option<f64>,
    /// Value per 100k population.
    pub weekly_rate: Option<f64>,
}

/// Observed count/rate the forecast is compared against.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Baseline {
    pub value: f64,
    pub rate: f64,
}

impl Baseline {
    pub const ZERO: Baseline = Baseline { value: 0.0, rate: 0.0 };
}

/// One (run, horizon) point of a simulated trajectory.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryRow {
    pub run_id: RunId,
    pub horizon: u32,
    pub date: NaiveDate,
    pub value: f64,
}

/// All runs for one (location, reference date).
#[derive(Clone, Debug, PartialEq)]
pub struct Ensemble {
    pub location: LocationId,
    pub reference_date: NaiveDate,
    /// Rows in source order; the first row's run is the representative run.
    pub rows: Vec<TrajectoryRow>,
}

impl Ensemble {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of every run at `horizon` (source order).
    pub fn values_at(&self, horizon: u32) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.horizon == horizon)
            .map(|r| r.value)
            .collect()
    }

    /// Unique run ids, ascending.
    pub fn run_ids(&self) -> Vec<RunId> {
        let set: BTreeSet<RunId> = self.rows.iter().map(|r| r.run_id).collect();
        set.into_iter().collect()
    }

    /// Rows of one run, ordered by horizon.
    pub fn run(&self, id: RunId) -> Vec<&TrajectoryRow> {
        let mut rows: Vec<&TrajectoryRow> = self.rows.iter().filter(|r| r.run_id == id).collect();
        rows.sort_by_key(|r| r.horizon);
        rows
    }

    /// Horizon → calendar date, read from the representative run.
    pub fn horizon_dates(&self) -> BTreeMap<u32, NaiveDate> {
        let Some(first) = self.rows.first() else {
            return BTreeMap::new();
        };
        self.run(first.run_id)
            .into_iter()
            .map(|r| (r.horizon, r.date))
            .collect()
    }
}
