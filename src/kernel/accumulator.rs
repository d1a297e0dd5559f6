//! Accumulator: bipolar superposition of hashed features.
//!
//! Every feature signature votes on every bit position: a set bit adds `+1`,
//! a clear bit adds `-1`. Thresholding the running sums recovers a binary
//! hypervector whose bit is set iff a strict majority of signatures agreed.
//!
//! # Key Insight
//!
//! The majority vote is what makes the encoding robust: one edited trigram
//! out of twenty only shifts each sum by at most 2, so few bits flip.
//! Ties resolve to `0`.

use super::vector::{Hypervector, VECTOR_BITS};

/// A running bipolar vote over [`VECTOR_BITS`] positions.
#[derive(Clone, Debug)]
pub struct Accumulator {
    /// Running sum per bit position (not thresholded)
    sums: [i32; VECTOR_BITS],
    /// Number of signatures accumulated
    count: usize,
}

impl Accumulator {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self {
            sums: [0; VECTOR_BITS],
            count: 0,
        }
    }

    /// Get the number of accumulated signatures.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Check whether nothing has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Add one signature: `+1` for each set bit, `-1` for each clear bit.
    pub fn add(&mut self, signature: &Hypervector) {
        for (sum, bit) in self.sums.iter_mut().zip(signature.bits()) {
            *sum += if bit { 1 } else { -1 };
        }
        self.count += 1;
    }

    /// Get the raw sums (for inspection and tests).
    pub fn raw_sums(&self) -> &[i32] {
        &self.sums
    }

    /// Threshold the sums: bit = 1 iff sum > 0.
    pub fn threshold(&self) -> Hypervector {
        self.sums
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > 0)
            .fold(Hypervector::zeros(), |v, (i, _)| v.with_bit(i, true))
    }

    /// Merge another accumulator into this one.
    pub fn merge(&mut self, other: &Accumulator) {
        for (a, b) in self.sums.iter_mut().zip(other.sums.iter()) {
            *a += b;
        }
        self.count += other.count;
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones_at(indices: &[usize]) -> Hypervector {
        indices
            .iter()
            .fold(Hypervector::zeros(), |v, &i| v.with_bit(i, true))
    }

    #[test]
    fn test_accumulator_basic() {
        let mut acc = Accumulator::new();
        assert!(acc.is_empty());

        acc.add(&ones_at(&[0, 2]));

        assert_eq!(acc.count(), 1);
        assert_eq!(&acc.raw_sums()[..4], &[1, -1, 1, -1]);
    }

    #[test]
    fn test_threshold_majority() {
        let mut acc = Accumulator::new();
        acc.add(&ones_at(&[0, 1]));
        acc.add(&ones_at(&[0, 2]));
        acc.add(&ones_at(&[0, 1]));

        // Sums: bit0 = 3, bit1 = 1, bit2 = -1
        let v = acc.threshold();
        assert!(v.bit(0));
        assert!(v.bit(1));
        assert!(!v.bit(2));
    }

    #[test]
    fn test_ties_go_to_zero() {
        let mut acc = Accumulator::new();
        acc.add(&ones_at(&[5]));
        acc.add(&ones_at(&[6]));

        // bit5 and bit6 both sum to 0
        let v = acc.threshold();
        assert!(!v.bit(5));
        assert!(!v.bit(6));
        assert_eq!(v.count_ones(), 0);
    }

    #[test]
    fn test_merge() {
        let mut acc1 = Accumulator::new();
        let mut acc2 = Accumulator::new();

        acc1.add(&ones_at(&[0]));
        acc2.add(&ones_at(&[1]));

        acc1.merge(&acc2);

        assert_eq!(acc1.count(), 2);
        assert_eq!(&acc1.raw_sums()[..3], &[0, 0, -2]);
    }
}
