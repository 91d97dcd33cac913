//! crates/ens_pipeline/src/forecast.rs
//! Per (reference date, location, horizon) summaries.
//!
//! Skip rules:
//! - locations without a population get no record;
//! - a horizon with no runs gets no record;
//! - a location with no records is left out of that reference date.
//! Every reference date keeps an entry, possibly empty.

use std::collections::BTreeMap;
use std::num::NonZeroU64;

use chrono::NaiveDate;

use ens_algo::{
    classify_activity, classify_run_trend, forecast_rate, median, Bands, Distribution, TrendInput,
};
use ens_core::entities::{Baseline, Ensemble};
use ens_core::{ActivityCategory, EngineConfig, LocationId, ThresholdSet, TrendCategory};

use crate::load::LoadedInputs;
use crate::reference::shift_days;

/// Ensemble summary for one horizon. Full precision; rounding happens at render time.
#[derive(Clone, Debug, PartialEq)]
pub struct ForecastRecord {
    pub trend: Distribution<TrendCategory>,
    pub activity: Distribution<ActivityCategory>,
    pub trend_most_likely: TrendCategory,
    pub trend_bands: Bands<TrendCategory>,
    pub activity_most_likely: ActivityCategory,
    pub activity_bands: Bands<ActivityCategory>,
    pub forecast_date: NaiveDate,
    pub median_value: f64,
    pub median_rate: f64,
}

/// Horizon → record for one location.
pub type LocationForecasts = BTreeMap<u32, ForecastRecord>;

/// All records of a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardData {
    pub reference_dates: Vec<NaiveDate>,
    pub data: BTreeMap<NaiveDate, BTreeMap<LocationId, LocationForecasts>>,
}

impl DashboardData {
    pub fn most_recent_reference_date(&self) -> Option<NaiveDate> {
        self.reference_dates.last().copied()
    }

    pub fn record(&self, reference_date: NaiveDate, location: &LocationId, horizon: u32) -> Option<&ForecastRecord> {
        self.data.get(&reference_date)?.get(location)?.get(&horizon)
    }
}

/// Skip counters reported in the run record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForecastCounts {
    pub records: usize,
    pub skipped_no_population: usize,
    pub empty_horizons: usize,
}

/// Everything one location contributes to one reference date.
#[derive(Clone, Copy, Debug)]
pub struct LocationContext {
    pub population: NonZeroU64,
    pub baseline: Baseline,
    pub thresholds: ThresholdSet,
}

/// Summarize one horizon of one ensemble. `None` when the horizon has no runs.
pub fn summarize_horizon(
    ensemble: &Ensemble,
    horizon: u32,
    loc: &LocationContext,
    cfg: &EngineConfig,
) -> Option<ForecastRecord> {
    let values = ensemble.values_at(horizon);
    let median_value = median(&values)?;

    let mut trend_labels = Vec::with_capacity(values.len());
    let mut activity_labels = Vec::with_capacity(values.len());
    for &v in &values {
        let input = TrendInput {
            forecast_value: v,
            population: loc.population,
            baseline: loc.baseline,
            horizon,
        };
        trend_labels.push(classify_run_trend(&input, &cfg.trend));
        activity_labels.push(classify_activity(forecast_rate(v, loc.population), &loc.thresholds));
    }

    let trend = Distribution::from_labels(trend_labels);
    let activity = Distribution::from_labels(activity_labels);
    let forecast_date = shift_days(ensemble.reference_date, 7 * i64::from(horizon))?;

    Some(ForecastRecord {
        trend_most_likely: trend.most_likely(),
        trend_bands: Bands::of(&trend, cfg.lower_percentile, cfg.upper_percentile),
        activity_most_likely: activity.most_likely(),
        activity_bands: Bands::of(&activity, cfg.lower_percentile, cfg.upper_percentile),
        trend,
        activity,
        forecast_date,
        median_value,
        median_rate: forecast_rate(median_value, loc.population),
    })
}

/// Resolve population, baseline and thresholds; `None` means skip the location.
pub fn location_context(
    inputs: &LoadedInputs,
    cfg: &EngineConfig,
    location: &LocationId,
    reference_date: NaiveDate,
) -> Option<LocationContext> {
    let population = inputs.registry.population(location)?;
    let baseline = inputs
        .observed
        .baseline(location, reference_date, cfg.baseline_offset_days)
        .unwrap_or(Baseline::ZERO);
    let thresholds = inputs.thresholds.get(location).unwrap_or(cfg.fallback_thresholds);
    Some(LocationContext { population, baseline, thresholds })
}

/// Build every record for every reference date.
pub fn build_dashboard(inputs: &LoadedInputs, cfg: &EngineConfig) -> (DashboardData, ForecastCounts) {
    let mut counts = ForecastCounts::default();
    let mut out = DashboardData {
        reference_dates: inputs.ensembles.reference_dates().to_vec(),
        data: BTreeMap::new(),
    };

    for &reference_date in inputs.ensembles.reference_dates() {
        let mut per_location = BTreeMap::new();
        for (location, ensemble) in inputs.ensembles.at(reference_date) {
            let Some(ctx) = location_context(inputs, cfg, location, reference_date) else {
                log::debug!("{location} @ {reference_date}: no population; skipped");
                counts.skipped_no_population += 1;
                continue;
            };

            let mut horizons = LocationForecasts::new();
            for h in 0..=cfg.max_horizon {
                match summarize_horizon(ensemble, h, &ctx, cfg) {
                    Some(rec) => {
                        horizons.insert(h, rec);
                    }
                    None => counts.empty_horizons += 1,
                }
            }
            if horizons.is_empty() {
                log::debug!("{location} @ {reference_date}: no horizons with runs");
                continue;
            }
            counts.records += horizons.len();
            per_location.insert(location.clone(), horizons);
        }
        log::info!("{reference_date}: {} location(s) summarized", per_location.len());
        out.data.insert(reference_date, per_location);
    }

    (out, counts)
}
