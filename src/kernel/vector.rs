//! Hypervector type for Sentra.
//!
//! Sentra uses dense binary vectors of a fixed width ([`VECTOR_BITS`]).
//! Bits are stored MSB-first inside each byte, so bit `0` is the high bit of
//! byte `0`. This is the same layout the prototype blob uses on disk.

use crate::error::{Result, SentraError};
use std::fmt;
use std::ops::{BitOr, BitXor};

/// Width of every hypervector in the system, in bits.
pub const VECTOR_BITS: usize = 256;

/// Width of every hypervector in the system, in bytes.
pub const VECTOR_BYTES: usize = VECTOR_BITS / 8;

/// A fixed-width binary hypervector.
///
/// Immutable value type: equality is exact byte equality and similarity is
/// Hamming distance (see [`Similarity`](super::similarity::Similarity)).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hypervector {
    bytes: [u8; VECTOR_BYTES],
}

impl Hypervector {
    /// The all-zero vector.
    pub const fn zeros() -> Self {
        Self {
            bytes: [0; VECTOR_BYTES],
        }
    }

    /// Create a vector from raw bytes.
    pub const fn from_bytes(bytes: [u8; VECTOR_BYTES]) -> Self {
        Self { bytes }
    }

    /// Create a vector from a slice, rejecting any other width.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; VECTOR_BYTES] =
            data.try_into().map_err(|_| SentraError::DimensionMismatch {
                expected: VECTOR_BYTES,
                got: data.len(),
            })?;
        Ok(Self { bytes })
    }

    /// Parse a lowercase or uppercase hex string (64 characters).
    pub fn from_hex(text: &str) -> Result<Self> {
        let data = hex::decode(text.trim())?;
        Self::from_slice(&data)
    }

    /// Hex encoding, as used by the functional-prototype map.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; VECTOR_BYTES] {
        &self.bytes
    }

    /// Read bit `index` (MSB-first).
    pub fn bit(&self, index: usize) -> bool {
        (self.bytes[index / 8] >> (7 - index % 8)) & 1 == 1
    }

    /// Return a copy with bit `index` set to `value`.
    pub fn with_bit(mut self, index: usize, value: bool) -> Self {
        let mask = 1u8 << (7 - index % 8);
        if value {
            self.bytes[index / 8] |= mask;
        } else {
            self.bytes[index / 8] &= !mask;
        }
        self
    }

    /// Return a copy with bit `index` inverted.
    pub fn with_toggled(mut self, index: usize) -> Self {
        self.bytes[index / 8] ^= 1u8 << (7 - index % 8);
        self
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    /// Iterate over the bits in order, as booleans.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..VECTOR_BITS).map(move |i| self.bit(i))
    }
}

impl Default for Hypervector {
    fn default() -> Self {
        Self::zeros()
    }
}

impl BitOr for Hypervector {
    type Output = Hypervector;

    fn bitor(mut self, rhs: Self) -> Self::Output {
        for (a, b) in self.bytes.iter_mut().zip(rhs.bytes.iter()) {
            *a |= b;
        }
        self
    }
}

impl BitXor for Hypervector {
    type Output = Hypervector;

    fn bitxor(mut self, rhs: Self) -> Self::Output {
        for (a, b) in self.bytes.iter_mut().zip(rhs.bytes.iter()) {
            *a ^= b;
        }
        self
    }
}

impl fmt::Debug for Hypervector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hypervector({})", self.to_hex())
    }
}

impl fmt::Display for Hypervector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
