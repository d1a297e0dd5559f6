//! Primitives: bitwise and stochastic hypervector operations.
//!
//! - **or_blend**: activate both inputs (superset of their set bits)
//! - **bind**: XOR association, self-inverse
//! - **perturb**: flip a handful of random bits
//! - **stochastic_blend**: per-bit coin flip toward a target
//! - **drift**: sparse random flips modelling wandering state
//!
//! Randomized operations take the RNG as an argument and return a new
//! vector, so callers decide where randomness comes from and tests can seed
//! it.

use super::vector::{Hypervector, VECTOR_BITS};
use rand::seq::index::sample;
use rand::Rng;

/// Collection of hypervector primitive operations.
pub struct Primitives;

impl Primitives {
    /// Bitwise OR of two vectors ("activate both").
    pub fn or_blend(a: &Hypervector, b: &Hypervector) -> Hypervector {
        *a | *b
    }

    /// Bitwise XOR of two vectors.
    ///
    /// `bind(bind(a, b), b) == a`.
    pub fn bind(a: &Hypervector, b: &Hypervector) -> Hypervector {
        *a ^ *b
    }

    /// Invert the listed bit positions.
    pub fn flip_bits(vec: &Hypervector, positions: &[usize]) -> Hypervector {
        positions
            .iter()
            .fold(*vec, |v, &i| v.with_toggled(i % VECTOR_BITS))
    }

    /// Flip `flips` distinct random bits.
    ///
    /// The result is exactly `flips` bits away from the input (capped at the
    /// vector width).
    pub fn perturb<R: Rng + ?Sized>(vec: &Hypervector, flips: usize, rng: &mut R) -> Hypervector {
        let positions = sample(rng, VECTOR_BITS, flips.min(VECTOR_BITS)).into_vec();
        Self::flip_bits(vec, &positions)
    }

    /// Blend `from` toward `to` one bit at a time.
    ///
    /// Each bit is taken from `to` with probability `weight` and from `from`
    /// otherwise. `weight = 0.0` returns `from`, `weight = 1.0` returns `to`.
    pub fn stochastic_blend<R: Rng + ?Sized>(
        from: &Hypervector,
        to: &Hypervector,
        weight: f64,
        rng: &mut R,
    ) -> Hypervector {
        let weight = weight.clamp(0.0, 1.0);
        (0..VECTOR_BITS).fold(*from, |v, i| {
            let source = if rng.gen::<f64>() < weight { to } else { from };
            v.with_bit(i, source.bit(i))
        })
    }

    /// Random drift: each byte, with probability `rate`, has one random bit
    /// inverted.
    pub fn drift<R: Rng + ?Sized>(vec: &Hypervector, rate: f64, rng: &mut R) -> Hypervector {
        let rate = rate.clamp(0.0, 1.0);
        let mut out = *vec;
        for byte in 0..VECTOR_BITS / 8 {
            if rng.gen::<f64>() < rate {
                out = out.with_toggled(byte * 8 + rng.gen_range(0..8));
            }
        }
        out
    }
}
