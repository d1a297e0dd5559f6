//! Kernel layer: foundational hypervector primitives.
//!
//! The kernel provides the minimal, stable foundation for everything else:
//! - The fixed-width binary [`Hypervector`] value type
//! - Bipolar superposition ([`Accumulator`])
//! - Deterministic multi-modal encoding ([`HyperEncoder`])
//! - Hamming distance and k-nearest search ([`Similarity`])
//! - Bitwise and stochastic operations ([`Primitives`])
//! - The immutable [`PrototypeBank`] and its blob codec
//!
//! This layer has no dependencies on [`memory`](crate::memory),
//! [`intent`](crate::intent) or [`highlevel`](crate::highlevel).
//!
//! # Example
//!
//! ```rust
//! use sentra::kernel::{HyperEncoder, PrototypeBank, Similarity};
//!
//! let enc = HyperEncoder::new();
//! let bank = PrototypeBank::random(42);
//!
//! let v = enc.encode_text("good morning");
//! let active = bank.activate(&v, 5);
//! assert_eq!(active.len(), 5);
//!
//! let d = Similarity::hamming(&v, &enc.encode_text("good mornin"));
//! assert!(d < 128);
//! ```

pub mod accumulator;
pub mod encoder;
pub mod primitives;
pub mod prototype;
pub mod similarity;
pub mod vector;

pub use accumulator::Accumulator;
pub use encoder::{signature, HyperEncoder, Modality};
pub use primitives::Primitives;
pub use prototype::{PrototypeBank, ACTIVATION_K, PROTOTYPE_COUNT};
pub use similarity::Similarity;
pub use vector::{Hypervector, VECTOR_BITS, VECTOR_BYTES};
