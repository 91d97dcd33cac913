// crates/ens_algo/src/distribution.rs
//
// Probability aggregator: multiset of per-run labels → fraction per axis
// category. Every axis category has an entry (zeros included), stored in axis
// order. With N > 0 the entries sum to 1.0; with N = 0 all are 0.0.

use core::marker::PhantomData;

use ens_core::Axis;

/// Normalized distribution over the ordered axis `C`.
#[derive(Clone, Debug, PartialEq)]
pub struct Distribution<C: Axis> {
    probs: Vec<f64>,
    total: usize,
    _axis: PhantomData<C>,
}

impl<C: Axis> Distribution<C> {
    /// Count labels and normalize by the number of labels.
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let mut counts = vec![0usize; C::ORDER.len()];
        for c in labels {
            counts[c.index()] += 1;
        }
        Self::from_counts(&counts)
    }

    /// `counts[i]` is the count for `C::ORDER[i]`. Missing trailing entries count as 0.
    pub fn from_counts(counts: &[usize]) -> Self {
        let k = C::ORDER.len();
        let total: usize = counts.iter().take(k).sum();
        let probs = (0..k)
            .map(|i| {
                let n = counts.get(i).copied().unwrap_or(0);
                if total == 0 { 0.0 } else { n as f64 / total as f64 }
            })
            .collect();
        Self { probs, total, _axis: PhantomData }
    }

    /// Number of labels aggregated (N).
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_degenerate(&self) -> bool {
        self.total == 0
    }

    pub fn get(&self, c: C) -> f64 {
        self.probs[c.index()]
    }

    /// `(category, probability)` in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (C, f64)> + '_ {
        C::ORDER.iter().copied().zip(self.probs.iter().copied())
    }

    pub fn sum(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// Category with the largest fraction; ties go to the first in axis order.
    ///
    /// For a degenerate (N = 0) distribution this is the first axis category,
    /// which carries no information; callers skip empty ensembles instead.
    pub fn most_likely(&self) -> C {
        let mut best = 0usize;
        for (i, &p) in self.probs.iter().enumerate() {
            if p > self.probs[best] {
                best = i;
            }
        }
        C::ORDER[best]
    }
}
