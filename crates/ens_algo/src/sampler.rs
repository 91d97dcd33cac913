// crates/ens_algo/src/sampler.rs
//
// Trajectory sampler: reproducible selection of at most `size` run ids.
//
// Contract:
// - Candidates are deduplicated and sorted ascending before drawing, so the
//   selection depends only on the *set* of ids, never on row order.
// - A fresh `SampleRng` is seeded for every call; two calls over the same id
//   set return the same selection.
// - Output is sorted ascending.

use ens_core::rng::SampleRng;
use ens_core::RunId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrajectorySampler {
    pub size: usize,
    pub seed: u64,
}

impl TrajectorySampler {
    pub fn new(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }

    pub fn sample(&self, run_ids: &[RunId]) -> Vec<RunId> {
        let mut pool = run_ids.to_vec();
        pool.sort_unstable();
        pool.dedup();

        let mut rng = SampleRng::from_seed_u64(self.seed);
        let mut picked: Vec<RunId> = rng
            .sample_indices(pool.len(), self.size)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        picked.sort_unstable();
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: i64) -> Vec<RunId> {
        (0..n).map(RunId).collect()
    }

    #[test]
    fn bounded_by_size_and_population() {
        let s = TrajectorySampler::new(200, 42);
        assert_eq!(s.sample(&ids(1000)).len(), 200);
        assert_eq!(s.sample(&ids(50)), ids(50));
        assert!(s.sample(&[]).is_empty());
    }

    #[test]
    fn sorted_and_distinct() {
        let out = TrajectorySampler::new(100, 42).sample(&ids(300));
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn independent_of_input_order_and_duplicates() {
        let s = TrajectorySampler::new(10, 42);
        let mut shuffled = ids(64);
        shuffled.reverse();
        shuffled.extend(ids(64));
        assert_eq!(s.sample(&ids(64)), s.sample(&shuffled));
    }

    #[test]
    fn seed_changes_selection() {
        let a = TrajectorySampler::new(10, 42).sample(&ids(500));
        let b = TrajectorySampler::new(10, 7).sample(&ids(500));
        assert_ne!(a, b);
    }
}
