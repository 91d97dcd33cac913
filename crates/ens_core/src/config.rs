//! Immutable engine configuration.
//!
//! Everything the classifiers and the orchestrator need (trend threshold table,
//! count floor, fallback activity thresholds, sampling parameters, season
//! windows) is carried by value in `EngineConfig`. Nothing here is process-wide
//! state; callers build one config and pass references down.
//!
//! `EngineConfig::default()` reproduces the reference constants. A JSON config
//! may override any subset of fields (`#[serde(default)]`).

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::LocationId;

/// Rate-change thresholds (per 100k) for one horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrendBand {
    /// `|rate_change|` strictly below this is `stable`.
    pub stable: f64,
    /// `rate_change` at or beyond ±this is a large change.
    pub large: f64,
}

/// Horizon-indexed trend thresholds plus the absolute-count floor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrendThresholds {
    /// Index = horizon. Horizons past the end use the last band.
    pub bands: Vec<TrendBand>,
    /// `|count_change|` strictly below this is `stable`.
    pub count_stable: f64,
}

impl TrendThresholds {
    /// Band for `horizon`, clamped to the last defined index.
    ///
    /// An empty table degrades to a zero band (everything outside the count
    /// floor classifies by sign); `EngineConfig::validate` rejects that shape.
    pub fn band(&self, horizon: u32) -> TrendBand {
        let ix = (horizon as usize).min(self.bands.len().saturating_sub(1));
        self.bands
            .get(ix)
            .copied()
            .unwrap_or(TrendBand { stable: 0.0, large: 0.0 })
    }

    /// Highest horizon index with its own band.
    pub fn max_defined_horizon(&self) -> u32 {
        self.bands.len().saturating_sub(1) as u32
    }
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            bands: vec![
                TrendBand { stable: 0.3, large: 1.7 },
                TrendBand { stable: 0.5, large: 3.0 },
                TrendBand { stable: 0.7, large: 4.0 },
                TrendBand { stable: 1.0, large: 5.0 },
                TrendBand { stable: 1.0, large: 5.0 },
            ],
            count_stable: 10.0,
        }
    }
}

/// Historical rate percentiles used as activity cut points.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdSet {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl ThresholdSet {
    pub const FALLBACK: ThresholdSet = ThresholdSet { p25: 0.5, p50: 1.0, p75: 2.0 };

    /// `p25 ≤ p50 ≤ p75` (NaN fails).
    pub fn is_monotonic(&self) -> bool {
        self.p25 <= self.p50 && self.p50 <= self.p75
    }

    pub fn check_monotonic(&self) -> Result<(), CoreError> {
        if self.is_monotonic() {
            Ok(())
        } else {
            Err(CoreError::NonMonotonicThresholds { p25: self.p25, p50: self.p50, p75: self.p75 })
        }
    }
}

impl Default for ThresholdSet {
    fn default() -> Self { Self::FALLBACK }
}

/// Named inclusive date window used by the historical-season export.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeasonWindow {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeasonWindow {
    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start <= d && d <= self.end
    }
}

/// Full engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub trend: TrendThresholds,
    /// Substituted when a location has no historical threshold row.
    pub fallback_thresholds: ThresholdSet,
    /// Horizons `0..=max_horizon` get a forecast record.
    pub max_horizon: u32,
    /// Baseline is the observation this many days before the reference date.
    pub baseline_offset_days: i64,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub sample_size: usize,
    pub sample_seed: u64,
    /// Locations left out of the locations, history and trajectory exports.
    /// They still get dashboard records.
    pub excluded_locations: Vec<LocationId>,
    pub seasons: Vec<SeasonWindow>,
    /// Fail the run on non-monotonic threshold rows instead of warning.
    pub strict_thresholds: bool,
}

/// October 1 through September 30 for each season start year.
fn default_seasons() -> Vec<SeasonWindow> {
    (2022..=2024)
        .filter_map(|y| {
            Some(SeasonWindow {
                name: format!("{}-{:02}", y, (y + 1) % 100),
                start: NaiveDate::from_ymd_opt(y, 10, 1)?,
                end: NaiveDate::from_ymd_opt(y + 1, 9, 30)?,
            })
        })
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend: TrendThresholds::default(),
            fallback_thresholds: ThresholdSet::FALLBACK,
            max_horizon: 4,
            baseline_offset_days: 7,
            lower_percentile: 0.10,
            upper_percentile: 0.90,
            sample_size: 200,
            sample_seed: 42,
            excluded_locations: vec![LocationId::from_static("72")],
            seasons: default_seasons(),
            strict_thresholds: false,
        }
    }
}

impl EngineConfig {
    /// Domain checks on the configuration itself (not on input data).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.trend.bands.is_empty() {
            return Err(CoreError::EmptyThresholdTable);
        }
        for b in &self.trend.bands {
            if !(b.stable >= 0.0 && b.large >= b.stable) {
                return Err(CoreError::DomainOutOfRange("trend.bands (0 <= stable <= large)"));
            }
        }
        if !(self.trend.count_stable >= 0.0) {
            return Err(CoreError::DomainOutOfRange("trend.count_stable"));
        }
        self.fallback_thresholds.check_monotonic()?;
        let p_ok = |p: f64| (0.0..=1.0).contains(&p);
        if !p_ok(self.lower_percentile) || !p_ok(self.upper_percentile) {
            return Err(CoreError::DomainOutOfRange("lower_percentile/upper_percentile in [0,1]"));
        }
        if self.lower_percentile > self.upper_percentile {
            return Err(CoreError::DomainOutOfRange("lower_percentile <= upper_percentile"));
        }
        if self.baseline_offset_days < 0 {
            return Err(CoreError::DomainOutOfRange("baseline_offset_days"));
        }
        for s in &self.seasons {
            if s.start > s.end {
                return Err(CoreError::DomainOutOfRange("seasons (start <= end)"));
            }
        }
        Ok(())
    }

    pub fn is_excluded(&self, id: &LocationId) -> bool {
        self.excluded_locations.iter().any(|x| x == id)
    }
}
