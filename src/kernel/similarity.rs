//! Similarity metrics for hypervector comparison.
//!
//! Hamming distance (XOR then popcount) is the one metric the system relies
//! on. It is a true metric: symmetric, zero only for identical vectors, and
//! it satisfies the triangle inequality.

use super::vector::{Hypervector, VECTOR_BITS};

/// Similarity computation for hypervectors.
pub struct Similarity;

impl Similarity {
    /// Number of differing bits, in `0..=VECTOR_BITS`.
    pub fn hamming(a: &Hypervector, b: &Hypervector) -> u32 {
        a.as_bytes()
            .iter()
            .zip(b.as_bytes().iter())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum()
    }

    /// Hamming distance scaled to `[0, 1]`.
    pub fn normalized_hamming(a: &Hypervector, b: &Hypervector) -> f64 {
        Self::hamming(a, b) as f64 / VECTOR_BITS as f64
    }

    /// Agreement rate: `1 - normalized_hamming`.
    pub fn agreement(a: &Hypervector, b: &Hypervector) -> f64 {
        1.0 - Self::normalized_hamming(a, b)
    }

    /// Linear scan for the `k` closest vectors.
    ///
    /// Returns `(index, distance)` pairs sorted by ascending distance. The
    /// sort is stable, so ties keep the lowest index first.
    pub fn k_nearest(query: &Hypervector, bank: &[Hypervector], k: usize) -> Vec<(usize, u32)> {
        let mut scored: Vec<(usize, u32)> = bank
            .iter()
            .enumerate()
            .map(|(i, v)| (i, Self::hamming(query, v)))
            .collect();

        scored.sort_by_key(|&(_, d)| d);
        scored.truncate(k);
        scored
    }

    /// Index and distance of the single closest vector, lowest index on ties.
    pub fn nearest(query: &Hypervector, bank: &[Hypervector]) -> Option<(usize, u32)> {
        bank.iter()
            .enumerate()
            .map(|(i, v)| (i, Self::hamming(query, v)))
            .min_by_key(|&(_, d)| d)
    }
}
