//! crates/ens_pipeline/src/reference.rs
//! Read-only reference stores built once per run.
//!
//! Every lookup returns `Option`; fallbacks (zero baseline, default
//! thresholds, skipping a location) are decided by the orchestrator.

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use chrono::{Days, NaiveDate};

use ens_core::entities::{Baseline, Location, ObservedPoint};
use ens_core::{LocationId, ThresholdSet};

// ---- Locations ----

/// Location metadata keyed by id; iteration keeps the source row order.
#[derive(Clone, Debug, Default)]
pub struct LocationRegistry {
    rows: Vec<Location>,
    index: BTreeMap<LocationId, usize>,
}

impl LocationRegistry {
    /// First row wins on duplicate ids.
    pub fn from_locations(locations: Vec<Location>) -> Self {
        let mut rows = Vec::with_capacity(locations.len());
        let mut index = BTreeMap::new();
        for loc in locations {
            if index.contains_key(&loc.id) {
                log::warn!("duplicate location row for {}; keeping the first", loc.id);
                continue;
            }
            index.insert(loc.id.clone(), rows.len());
            rows.push(loc);
        }
        Self { rows, index }
    }

    pub fn get(&self, id: &LocationId) -> Option<&Location> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    /// Population if known and non-zero.
    pub fn population(&self, id: &LocationId) -> Option<NonZeroU64> {
        self.get(id).and_then(|l| NonZeroU64::new(l.population))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---- Observations ----

/// Observed points keyed by (location, date).
#[derive(Clone, Debug, Default)]
pub struct ObservedLookup {
    by_location: BTreeMap<LocationId, BTreeMap<NaiveDate, ObservedPoint>>,
}

impl ObservedLookup {
    /// Later rows replace earlier rows for the same (location, date).
    pub fn from_points(points: Vec<ObservedPoint>) -> Self {
        let mut by_location: BTreeMap<LocationId, BTreeMap<NaiveDate, ObservedPoint>> = BTreeMap::new();
        for p in points {
            by_location.entry(p.location.clone()).or_default().insert(p.date, p);
        }
        Self { by_location }
    }

    pub fn get(&self, id: &LocationId, date: NaiveDate) -> Option<&ObservedPoint> {
        self.by_location.get(id).and_then(|m| m.get(&date))
    }

    /// Observation `offset_days` before `reference_date`. A missing value or
    /// rate inside an existing observation reads as 0.
    pub fn baseline(&self, id: &LocationId, reference_date: NaiveDate, offset_days: i64) -> Option<Baseline> {
        let date = shift_days(reference_date, -offset_days)?;
        self.get(id, date).map(|p| Baseline {
            value: p.value.unwrap_or(0.0),
            rate: p.weekly_rate.unwrap_or(0.0),
        })
    }

    /// Date-ordered series for one location.
    pub fn series(&self, id: &LocationId) -> impl Iterator<Item = &ObservedPoint> {
        self.by_location.get(id).into_iter().flat_map(|m| m.values())
    }

    /// Locations with at least one observation, ascending.
    pub fn locations(&self) -> impl Iterator<Item = &LocationId> {
        self.by_location.keys()
    }

    pub fn len(&self) -> usize {
        self.by_location.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

/// `date + days`, `None` on calendar overflow.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

// ---- Activity thresholds ----

#[derive(Clone, Debug, Default)]
pub struct ThresholdStore {
    by_location: BTreeMap<LocationId, ThresholdSet>,
}

impl ThresholdStore {
    /// Later rows replace earlier rows for the same location.
    pub fn from_rows(rows: Vec<(LocationId, ThresholdSet)>) -> Self {
        Self { by_location: rows.into_iter().collect() }
    }

    pub fn get(&self, id: &LocationId) -> Option<ThresholdSet> {
        self.by_location.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocationId, &ThresholdSet)> {
        self.by_location.iter()
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}
