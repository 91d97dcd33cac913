// crates/ens_core/src/rng.rs
//
// Deterministic, integer-only RNG utilities for trajectory sampling.
// Focus: unbiased range generation, stable seeding, reproducible selections.
//
// • The sample seed is the only source of randomness in the engine.
// • Integer-only RNG: no floating point. Unbiased ranges via rejection sampling.
// • Cross-platform determinism: explicit seeding.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Deterministic RNG for sampling, seeded from a 64-bit value.
///
/// Internally uses ChaCha20 with an explicit 32-byte seed derived from the
/// 64-bit seed (little-endian bytes in the first 8 positions; the rest 0).
/// This avoids endianness ambiguity and keeps the stream stable across
/// platforms. (Pinning crate versions at Cargo level keeps it stable across builds.)
#[derive(Debug, Clone)]
pub struct SampleRng {
    rng: ChaCha20Rng,
}

impl SampleRng {
    /// Construct from a 64-bit seed: `seed.to_le_bytes()` into the first
    /// 8 bytes of the ChaCha20 seed; the remaining 24 bytes are zero.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32) }
    }

    /// Unbiased integer in [0, n) using rejection sampling with the standard
    /// PCG "threshold" trick. Returns `None` if `n == 0`.
    ///
    /// Let `threshold = 2^64 mod n` (computed via `wrapping_neg() % n`).
    /// Accept `x` if `x >= threshold`; then `x % n` is uniformly distributed.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.rng.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Pick `k` distinct indices from `0..n` without replacement
    /// (partial Fisher–Yates). `k` is clamped to `n`. The returned order is
    /// the draw order; callers sort when they need a canonical order.
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        let k = k.min(n);
        let mut pool: Vec<usize> = (0..n).collect();
        for i in 0..k {
            let span = (n - i) as u64;
            let off = self.gen_range(span).unwrap_or(0) as usize;
            pool.swap(i, i + off);
        }
        pool.truncate(k);
        pool
    }
}
