#![forbid(unsafe_code)]

use core::num::NonZeroU64;

use ens_algo::{
    category_at_percentile, classify_run_trend, classify_trend, Distribution, TrajectorySampler,
    TrendInput,
};
use ens_core::config::TrendThresholds;
use ens_core::entities::Baseline;
use ens_core::{ActivityCategory, Axis, RunId, TrendCategory};
use proptest::prelude::*;

const SUM_TOL: f64 = 1e-9;

fn trend_label() -> impl Strategy<Value = TrendCategory> {
    (0..TrendCategory::ORDER.len()).prop_map(|i| TrendCategory::ORDER[i])
}

fn activity_label() -> impl Strategy<Value = ActivityCategory> {
    (0..ActivityCategory::ORDER.len()).prop_map(|i| ActivityCategory::ORDER[i])
}

proptest! {
    #[test]
    fn inside_stable_zone_is_stable_regardless_of_sign(
        horizon in 0u32..10,
        frac in 0.0f64..0.999,
        negative in any::<bool>(),
        count_change in -1.0e6f64..1.0e6,
    ) {
        let t = TrendThresholds::default();
        let mag = t.band(horizon).stable * frac;
        let rate_change = if negative { -mag } else { mag };
        prop_assert_eq!(classify_trend(rate_change, count_change, horizon, &t), TrendCategory::Stable);
    }

    #[test]
    fn below_count_floor_is_stable_regardless_of_rate(
        horizon in 0u32..10,
        rate_change in -1.0e3f64..1.0e3,
        count_change in -9.999f64..9.999,
    ) {
        let t = TrendThresholds::default();
        prop_assert_eq!(classify_trend(rate_change, count_change, horizon, &t), TrendCategory::Stable);
    }

    #[test]
    fn zero_change_is_stable_at_every_horizon(
        horizon in 0u32..20,
        value in 0.0f64..1.0e6,
        population in 1u64..400_000_000,
    ) {
        let pop = NonZeroU64::new(population).unwrap();
        let rate = value / population as f64 * 100_000.0;
        let input = TrendInput {
            forecast_value: value,
            population: pop,
            baseline: Baseline { value, rate },
            horizon,
        };
        prop_assert_eq!(classify_run_trend(&input, &TrendThresholds::default()), TrendCategory::Stable);
    }

    #[test]
    fn trend_distribution_sums_to_one(labels in prop::collection::vec(trend_label(), 1..500)) {
        let d = Distribution::from_labels(labels.iter().copied());
        prop_assert!((d.sum() - 1.0).abs() <= SUM_TOL);
        prop_assert!(d.iter().all(|(_, p)| p >= 0.0));
        prop_assert_eq!(d.iter().count(), TrendCategory::ORDER.len());
        prop_assert_eq!(d.total(), labels.len());
    }

    #[test]
    fn activity_distribution_sums_to_one(labels in prop::collection::vec(activity_label(), 1..500)) {
        let d = Distribution::from_labels(labels);
        prop_assert!((d.sum() - 1.0).abs() <= SUM_TOL);
        prop_assert!(d.iter().all(|(_, p)| p >= 0.0));
    }

    #[test]
    fn most_likely_has_maximal_mass(labels in prop::collection::vec(trend_label(), 1..200)) {
        let d = Distribution::from_labels(labels);
        let best = d.get(d.most_likely());
        prop_assert!(d.iter().all(|(_, p)| p <= best));
    }

    #[test]
    fn percentile_walk_is_monotonic(
        labels in prop::collection::vec(trend_label(), 1..300),
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let d = Distribution::from_labels(labels);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let c_lo = category_at_percentile(&d, lo);
        let c_hi = category_at_percentile(&d, hi);
        prop_assert!(c_lo.index() <= c_hi.index());
    }

    #[test]
    fn sampler_is_idempotent_under_fixed_seed(
        raw in prop::collection::vec(-10_000i64..10_000, 0..600),
        size in 0usize..250,
        seed in any::<u64>(),
    ) {
        let ids: Vec<RunId> = raw.into_iter().map(RunId).collect();
        let s = TrajectorySampler::new(size, seed);
        let first = s.sample(&ids);
        let second = s.sample(&ids);
        prop_assert_eq!(&first, &second);

        let mut unique = ids.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(first.len(), size.min(unique.len()));
        prop_assert!(first.iter().all(|id| unique.binary_search(id).is_ok()));
    }
}
