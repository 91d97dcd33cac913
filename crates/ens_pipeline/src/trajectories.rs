//! crates/ens_pipeline/src/trajectories.rs
//! Per-location bundles of sampled runs, each tagged with its trend at every
//! summarized horizon.
//!
//! The sampler is re-seeded for every (location, reference date), so a
//! bundle does not depend on which other locations were processed.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use ens_algo::{classify_run_trend, TrajectorySampler, TrendInput};
use ens_core::entities::Ensemble;
use ens_core::{EngineConfig, LocationId, RunId, TrendCategory};

use crate::forecast::{location_context, LocationContext};
use crate::load::LoadedInputs;

/// One sampled run: values for every horizon it covers, trends for horizons ≤ max.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledRun {
    pub run_id: RunId,
    pub values: Vec<f64>,
    pub trends: BTreeMap<u32, TrendCategory>,
}

/// Sampled runs of one ensemble plus the calendar date of each horizon.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceTrajectories {
    /// `dates[h]`; `None` where the representative run skips horizon `h`.
    pub dates: Vec<Option<NaiveDate>>,
    pub runs: Vec<SampledRun>,
}

/// Everything exported for one location.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryBundle {
    pub location: LocationId,
    /// All reference dates of the run, including those without data here.
    pub reference_dates: Vec<NaiveDate>,
    pub data: BTreeMap<NaiveDate, ReferenceTrajectories>,
}

/// Dates indexed by horizon, from the representative run.
fn horizon_date_slots(ensemble: &Ensemble) -> Vec<Option<NaiveDate>> {
    let by_h = ensemble.horizon_dates();
    let Some((&max_h, _)) = by_h.iter().next_back() else {
        return Vec::new();
    };
    (0..=max_h).map(|h| by_h.get(&h).copied()).collect()
}

/// Sample and tag one ensemble.
pub fn sample_ensemble(
    ensemble: &Ensemble,
    loc: &LocationContext,
    sampler: &TrajectorySampler,
    cfg: &EngineConfig,
) -> ReferenceTrajectories {
    let runs = sampler
        .sample(&ensemble.run_ids())
        .into_iter()
        .map(|run_id| {
            let rows = ensemble.run(run_id);
            let values = rows.iter().map(|r| r.value).collect();
            let trends = rows
                .iter()
                .filter(|r| r.horizon <= cfg.max_horizon)
                .map(|r| {
                    let input = TrendInput {
                        forecast_value: r.value,
                        population: loc.population,
                        baseline: loc.baseline,
                        horizon: r.horizon,
                    };
                    (r.horizon, classify_run_trend(&input, &cfg.trend))
                })
                .collect();
            SampledRun { run_id, values, trends }
        })
        .collect();

    ReferenceTrajectories { dates: horizon_date_slots(ensemble), runs }
}

/// One bundle per location with trajectories, skipping excluded and
/// population-less locations.
pub fn build_trajectory_bundles(
    inputs: &LoadedInputs,
    cfg: &EngineConfig,
) -> BTreeMap<LocationId, TrajectoryBundle> {
    let sampler = TrajectorySampler::new(cfg.sample_size, cfg.sample_seed);
    let reference_dates = inputs.ensembles.reference_dates().to_vec();
    let mut out = BTreeMap::new();

    for location in inputs.ensembles.locations() {
        if cfg.is_excluded(&location) || inputs.registry.population(&location).is_none() {
            continue;
        }
        let mut data = BTreeMap::new();
        for &reference_date in &reference_dates {
            let Some(ensemble) = inputs.ensembles.get(reference_date, &location) else {
                continue;
            };
            let Some(ctx) = location_context(inputs, cfg, &location, reference_date) else {
                continue;
            };
            data.insert(reference_date, sample_ensemble(ensemble, &ctx, &sampler, cfg));
        }
        out.insert(
            location.clone(),
            TrajectoryBundle { location, reference_dates: reference_dates.clone(), data },
        );
    }

    log::info!("built {} trajectory bundle(s)", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU64;

    use ens_core::entities::{Baseline, TrajectoryRow};
    use ens_core::ThresholdSet;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(run: i64, h: u32, date: &str, v: f64) -> TrajectoryRow {
        TrajectoryRow { run_id: RunId(run), horizon: h, date: d(date), value: v }
    }

    fn ctx() -> LocationContext {
        LocationContext {
            population: NonZeroU64::new(1_000_000).unwrap(),
            baseline: Baseline { value: 100.0, rate: 10.0 },
            thresholds: ThresholdSet::FALLBACK,
        }
    }

    #[test]
    fn dates_have_gaps_where_the_first_run_skips_a_horizon() {
        let e = Ensemble {
            location: "01".parse().unwrap(),
            reference_date: d("2025-01-04"),
            rows: vec![
                row(5, 0, "2025-01-04", 100.0),
                row(5, 2, "2025-01-18", 100.0),
                row(6, 1, "2025-01-11", 100.0),
            ],
        };
        assert_eq!(
            horizon_date_slots(&e),
            vec![Some(d("2025-01-04")), None, Some(d("2025-01-18"))]
        );
    }

    #[test]
    fn values_cover_all_horizons_trends_stop_at_max() {
        let mut rows = Vec::new();
        for h in 0..7u32 {
            rows.push(row(1, h, "2025-01-04", 100.0 + 50.0 * f64::from(h)));
        }
        let e = Ensemble { location: "01".parse().unwrap(), reference_date: d("2025-01-04"), rows };
        let cfg = EngineConfig::default();
        let out = sample_ensemble(&e, &ctx(), &TrajectorySampler::new(200, 42), &cfg);

        assert_eq!(out.runs.len(), 1);
        let run = &out.runs[0];
        assert_eq!(run.values.len(), 7);
        assert_eq!(run.trends.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(run.trends[&0], TrendCategory::Stable);
        // h1: +50 cases, +5 per 100k against a large threshold of 3.0.
        assert_eq!(run.trends[&1], TrendCategory::LargeIncrease);
        assert_eq!(out.dates.len(), 7);
    }

    #[test]
    fn sampling_caps_run_count_and_is_sorted() {
        let rows: Vec<TrajectoryRow> = (0..500).map(|r| row(r, 0, "2025-01-04", 1.0)).collect();
        let e = Ensemble { location: "01".parse().unwrap(), reference_date: d("2025-01-04"), rows };
        let cfg = EngineConfig::default();
        let sampler = TrajectorySampler::new(cfg.sample_size, cfg.sample_seed);
        let a = sample_ensemble(&e, &ctx(), &sampler, &cfg);
        let b = sample_ensemble(&e, &ctx(), &sampler, &cfg);
        assert_eq!(a.runs.len(), 200);
        assert!(a.runs.windows(2).all(|w| w[0].run_id < w[1].run_id));
        assert_eq!(a, b);
    }
}
