// crates/ens_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure per-run and per-ensemble algorithms. No I/O, no logging, no globals:
//! every threshold arrives through an `ens_core::config` value.

// ----------------------------- Per-run classification -----------------------------

pub mod trend;
pub mod activity;

pub use trend::{classify_run_trend, classify_trend, forecast_rate, TrendInput};
pub use activity::classify_activity;

// ----------------------------- Ensemble aggregation --------------------------------

pub mod distribution;
pub mod percentile;
pub mod stats;

pub use distribution::Distribution;
pub use percentile::{category_at_percentile, Bands};
pub use stats::median;

// ----------------------------- Sampling --------------------------------------------

pub mod sampler;

pub use sampler::TrajectorySampler;
