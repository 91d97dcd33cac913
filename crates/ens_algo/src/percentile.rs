// crates/ens_algo/src/percentile.rs
//
// Percentile-category walker: accumulate mass in axis order and return the
// first category whose cumulative mass reaches `p`. If floating-point slack
// keeps the total below `p`, the last category is returned.

use ens_core::Axis;

use crate::distribution::Distribution;

pub fn category_at_percentile<C: Axis>(dist: &Distribution<C>, p: f64) -> C {
    let mut cumulative = 0.0;
    for (c, prob) in dist.iter() {
        cumulative += prob;
        if cumulative >= p {
            return c;
        }
    }
    C::ORDER[C::ORDER.len() - 1]
}

/// Lower/upper band categories of a distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bands<C: Axis> {
    pub lower: C,
    pub upper: C,
}

impl<C: Axis> Bands<C> {
    pub fn of(dist: &Distribution<C>, lower_p: f64, upper_p: f64) -> Self {
        Self {
            lower: category_at_percentile(dist, lower_p),
            upper: category_at_percentile(dist, upper_p),
        }
    }
}
