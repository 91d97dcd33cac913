//! ens_core: Core types, category axes, configuration, rounding, and seeded RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`ens_algo`, `ens_io`, `ens_pipeline`, `ens_report`, `ens_cli`).
//!
//! - Registry tokens: `LocationId`, run identifiers: `RunId`
//! - Ordered category axes: `TrendCategory` (5), `ActivityCategory` (4)
//! - Immutable `EngineConfig` (trend thresholds, fallback activity thresholds,
//!   sampling parameters) passed explicitly into every component
//! - Output-only rounding helpers
//! - Seedable RNG (ChaCha20) for trajectory sampling
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, PartialEq)]
    pub enum CoreError {
        InvalidToken(String),
        UnknownCategory(String),
        NonMonotonicThresholds { p25: f64, p50: f64, p75: f64 },
        DomainOutOfRange(&'static str),
        EmptyThresholdTable,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken(s) => write!(f, "invalid token: {s:?}"),
                CoreError::UnknownCategory(s) => write!(f, "unknown category: {s:?}"),
                CoreError::NonMonotonicThresholds { p25, p50, p75 } => {
                    write!(f, "thresholds not monotonic: p25={p25} p50={p50} p75={p75}")
                }
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::EmptyThresholdTable => write!(f, "trend threshold table is empty"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod category;
pub mod config;
pub mod entities;
pub mod ids;
pub mod rng;
pub mod rounding;

pub use category::{ActivityCategory, Axis, TrendCategory};
pub use config::{EngineConfig, SeasonWindow, ThresholdSet, TrendBand, TrendThresholds};
pub use errors::CoreError;
pub use ids::{LocationId, RunId};
