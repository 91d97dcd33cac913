//! Ordered category axes.
//!
//! The declaration order of each axis **is** its semantic order
//! (`large_decrease < decrease < stable < increase < large_increase`,
//! `low < moderate < high < very_high`). Percentile walks and most-likely
//! tie-breaks depend on it; `Axis::ORDER` is the single source of truth.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A fixed, ordered set of category labels.
pub trait Axis: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Every category, in semantic order.
    const ORDER: &'static [Self];

    /// Wire token (snake_case).
    fn as_str(self) -> &'static str;

    /// Position of `self` in `ORDER`.
    fn index(self) -> usize {
        Self::ORDER
            .iter()
            .position(|c| *c == self)
            .unwrap_or(Self::ORDER.len() - 1)
    }

    /// Axis tokens as an ordered list (exported so consumers render axes consistently).
    fn labels() -> Vec<&'static str> {
        Self::ORDER.iter().map(|c| c.as_str()).collect()
    }
}

/// Week-over-week change category (5 levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrendCategory {
    LargeDecrease,
    Decrease,
    Stable,
    Increase,
    LargeIncrease,
}

impl Axis for TrendCategory {
    const ORDER: &'static [Self] = &[
        TrendCategory::LargeDecrease,
        TrendCategory::Decrease,
        TrendCategory::Stable,
        TrendCategory::Increase,
        TrendCategory::LargeIncrease,
    ];

    fn as_str(self) -> &'static str {
        match self {
            TrendCategory::LargeDecrease => "large_decrease",
            TrendCategory::Decrease => "decrease",
            TrendCategory::Stable => "stable",
            TrendCategory::Increase => "increase",
            TrendCategory::LargeIncrease => "large_increase",
        }
    }
}

/// Absolute activity level relative to historical percentiles (4 levels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivityCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Axis for ActivityCategory {
    const ORDER: &'static [Self] = &[
        ActivityCategory::Low,
        ActivityCategory::Moderate,
        ActivityCategory::High,
        ActivityCategory::VeryHigh,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ActivityCategory::Low => "low",
            ActivityCategory::Moderate => "moderate",
            ActivityCategory::High => "high",
            ActivityCategory::VeryHigh => "very_high",
        }
    }
}

macro_rules! axis_display_fromstr {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as Axis>::ORDER
                    .iter()
                    .copied()
                    .find(|c| c.as_str() == s)
                    .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
            }
        }
    };
}

axis_display_fromstr!(TrendCategory);
axis_display_fromstr!(ActivityCategory);
