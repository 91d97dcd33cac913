// crates/ens_algo/src/activity.rs
//
// Activity classifier: forecast rate vs. the location's historical
// 25th/50th/75th rate percentiles. Inclusive upper bounds.
// Thresholds are taken as given; monotonicity is checked at load time.

use ens_core::config::ThresholdSet;
use ens_core::ActivityCategory;

pub fn classify_activity(rate: f64, t: &ThresholdSet) -> ActivityCategory {
    if rate <= t.p25 {
        ActivityCategory::Low
    } else if rate <= t.p50 {
        ActivityCategory::Moderate
    } else if rate <= t.p75 {
        ActivityCategory::High
    } else {
        ActivityCategory::VeryHigh
    }
}
