//! Prototype bank: the fixed set of reference hypervectors.
//!
//! The bank is loaded once from a binary blob and never mutated. Prototype
//! indices are stable identifiers: the indices of the prototypes nearest to
//! an input ("activated prototypes") are the sparse state handed to the
//! reward oracle.
//!
//! # Blob format
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SVEC"
//! 4       4     prototype count, big-endian u32 (must be PROTOTYPE_COUNT)
//! 8       4     bit width, big-endian u32 (must be VECTOR_BITS)
//! 12      ...   count * width/8 bytes of vector data, sequential
//! ```

use super::similarity::Similarity;
use super::vector::{Hypervector, VECTOR_BITS, VECTOR_BYTES};
use crate::error::{Result, SentraError};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::info;

/// Number of prototypes in every bank.
pub const PROTOTYPE_COUNT: usize = 1024;

/// Magic bytes at the start of a prototype blob.
pub const MAGIC: &[u8; 4] = b"SVEC";

/// Size of the blob header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Default number of prototypes activated per input.
pub const ACTIVATION_K: usize = 5;

/// Immutable bank of [`PROTOTYPE_COUNT`] reference vectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrototypeBank {
    prototypes: Vec<Hypervector>,
}

impl PrototypeBank {
    /// Build a bank from exactly [`PROTOTYPE_COUNT`] vectors.
    pub fn from_vectors(prototypes: Vec<Hypervector>) -> Result<Self> {
        if prototypes.len() != PROTOTYPE_COUNT {
            return Err(SentraError::DimensionMismatch {
                expected: PROTOTYPE_COUNT,
                got: prototypes.len(),
            });
        }
        Ok(Self { prototypes })
    }

    /// Generate a random bank deterministically from `seed`.
    ///
    /// Same seed, same bank, on every machine.
    pub fn random(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prototypes = (0..PROTOTYPE_COUNT)
            .map(|_| {
                let mut bytes = [0u8; VECTOR_BYTES];
                rng.fill_bytes(&mut bytes);
                Hypervector::from_bytes(bytes)
            })
            .collect();
        Self { prototypes }
    }

    /// Parse and validate a prototype blob.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SentraError::Truncated {
                expected: HEADER_SIZE,
                got: data.len(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&data[0..4]);
        if &magic != MAGIC {
            return Err(SentraError::InvalidMagic { found: magic });
        }

        let count = read_u32_be(&data[4..8]);
        let width = read_u32_be(&data[8..12]);
        if count as usize != PROTOTYPE_COUNT || width as usize != VECTOR_BITS {
            return Err(SentraError::HeaderMismatch {
                count,
                width,
                expected_count: PROTOTYPE_COUNT as u32,
                expected_width: VECTOR_BITS as u32,
            });
        }

        let expected = HEADER_SIZE + PROTOTYPE_COUNT * VECTOR_BYTES;
        if data.len() < expected {
            return Err(SentraError::Truncated {
                expected,
                got: data.len(),
            });
        }

        let prototypes = data[HEADER_SIZE..expected]
            .chunks_exact(VECTOR_BYTES)
            .map(Hypervector::from_slice)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { prototypes })
    }

    /// Load a prototype blob from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let bank = Self::from_bytes(&data)?;
        info!(
            path = %path.as_ref().display(),
            prototypes = bank.len(),
            "loaded prototype bank"
        );
        Ok(bank)
    }

    /// Serialize to the blob format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.prototypes.len() * VECTOR_BYTES);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(self.prototypes.len() as u32).to_be_bytes());
        out.extend_from_slice(&(VECTOR_BITS as u32).to_be_bytes());
        for p in &self.prototypes {
            out.extend_from_slice(p.as_bytes());
        }
        out
    }

    /// Write the blob to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Hypervector> {
        self.prototypes.get(index)
    }

    pub fn prototypes(&self) -> &[Hypervector] {
        &self.prototypes
    }

    /// The `k` nearest prototypes as `(index, distance)`, lowest index on ties.
    pub fn k_nearest(&self, query: &Hypervector, k: usize) -> Vec<(usize, u32)> {
        Similarity::k_nearest(query, &self.prototypes, k)
    }

    /// Indices of the `k` nearest prototypes, nearest first.
    pub fn activate(&self, query: &Hypervector, k: usize) -> Vec<usize> {
        self.k_nearest(query, k).into_iter().map(|(i, _)| i).collect()
    }
}

fn read_u32_be(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_is_deterministic() {
        assert_eq!(PrototypeBank::random(42), PrototypeBank::random(42));
        assert_ne!(PrototypeBank::random(42), PrototypeBank::random(43));
        assert_eq!(PrototypeBank::random(1).len(), PROTOTYPE_COUNT);
    }

    #[test]
    fn test_blob_round_trip() {
        let bank = PrototypeBank::random(7);
        let blob = bank.to_bytes();
        assert_eq!(blob.len(), HEADER_SIZE + PROTOTYPE_COUNT * VECTOR_BYTES);
        assert_eq!(&blob[0..4], b"SVEC");
        assert_eq!(&blob[4..8], &[0, 0, 4, 0]);
        assert_eq!(&blob[8..12], &[0, 0, 1, 0]);

        let parsed = PrototypeBank::from_bytes(&blob).expect("valid blob");
        assert_eq!(parsed, bank);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut blob = PrototypeBank::random(1).to_bytes();
        blob[0] = b'X';
        assert!(matches!(
            PrototypeBank::from_bytes(&blob),
            Err(SentraError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_rejects_mismatched_header() {
        let mut blob = PrototypeBank::random(1).to_bytes();
        blob[4..8].copy_from_slice(&512u32.to_be_bytes());
        assert!(matches!(
            PrototypeBank::from_bytes(&blob),
            Err(SentraError::HeaderMismatch { count: 512, .. })
        ));

        let mut blob = PrototypeBank::random(1).to_bytes();
        blob[8..12].copy_from_slice(&128u32.to_be_bytes());
        assert!(matches!(
            PrototypeBank::from_bytes(&blob),
            Err(SentraError::HeaderMismatch { width: 128, .. })
        ));
    }

    #[test]
    fn test_rejects_truncated() {
        let blob = PrototypeBank::random(1).to_bytes();
        assert!(matches!(
            PrototypeBank::from_bytes(&blob[..blob.len() - 1]),
            Err(SentraError::Truncated { .. })
        ));
        assert!(matches!(
            PrototypeBank::from_bytes(&blob[..5]),
            Err(SentraError::Truncated { .. })
        ));
    }

    #[test]
    fn test_from_vectors_requires_full_bank() {
        assert!(PrototypeBank::from_vectors(vec![Hypervector::zeros(); 3]).is_err());
        let full = PrototypeBank::random(3).prototypes().to_vec();
        assert!(PrototypeBank::from_vectors(full).is_ok());
    }

    #[test]
    fn test_activate_finds_self_first() {
        let bank = PrototypeBank::random(5);
        let query = *bank.get(100).expect("in range");
        let active = bank.activate(&query, ACTIVATION_K);
        assert_eq!(active.len(), ACTIVATION_K);
        assert_eq!(active[0], 100);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(matches!(
            PrototypeBank::load("/nonexistent/vectors.bin"),
            Err(SentraError::Io(_))
        ));
    }
}
