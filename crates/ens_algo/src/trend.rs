// crates/ens_algo/src/trend.rs
//
// Trend classifier: one run's forecast at one horizon → one of 5 categories.
//
// Decision ladder (first match wins):
//   1. |rate_change| < stable(h)  OR  |count_change| < count_floor  → stable
//   2. rate_change ≥  large(h)                                     → large_increase
//   3. rate_change >  0                                            → increase
//   4. rate_change ≤ −large(h)                                     → large_decrease
//   5. otherwise                                                   → decrease
//
// `h` is clamped to the last band of the threshold table. Total function: a
// NaN change falls through every comparison and lands on `decrease`.

use core::num::NonZeroU64;

use ens_core::config::TrendThresholds;
use ens_core::entities::Baseline;
use ens_core::TrendCategory;

/// Cases per 100,000 population.
pub const PER_100K: f64 = 100_000.0;

/// `value / population * 100000`.
#[inline]
pub fn forecast_rate(value: f64, population: NonZeroU64) -> f64 {
    value / population.get() as f64 * PER_100K
}

/// Classify from precomputed changes.
pub fn classify_trend(
    rate_change: f64,
    count_change: f64,
    horizon: u32,
    thresholds: &TrendThresholds,
) -> TrendCategory {
    let band = thresholds.band(horizon);
    if rate_change.abs() < band.stable || count_change.abs() < thresholds.count_stable {
        TrendCategory::Stable
    } else if rate_change >= band.large {
        TrendCategory::LargeIncrease
    } else if rate_change > 0.0 {
        TrendCategory::Increase
    } else if rate_change <= -band.large {
        TrendCategory::LargeDecrease
    } else {
        TrendCategory::Decrease
    }
}

/// Everything needed to classify one run at one horizon.
#[derive(Clone, Copy, Debug)]
pub struct TrendInput {
    pub forecast_value: f64,
    pub population: NonZeroU64,
    pub baseline: Baseline,
    pub horizon: u32,
}

/// Classify one run: derives rate and count changes against the baseline.
pub fn classify_run_trend(input: &TrendInput, thresholds: &TrendThresholds) -> TrendCategory {
    let rate = forecast_rate(input.forecast_value, input.population);
    let rate_change = rate - input.baseline.rate;
    let count_change = input.forecast_value - input.baseline.value;
    classify_trend(rate_change, count_change, input.horizon, thresholds)
}
