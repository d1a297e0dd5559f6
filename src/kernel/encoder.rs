//! Encoder: arbitrary modalities to hypervectors.
//!
//! The encoder projects text, raw bytes, and structured state into the same
//! latent space. Every modality follows one pattern:
//!
//! 1. Break the input into features (trigrams, byte chunks, `path=value` pairs).
//! 2. Hash each feature to a [`VECTOR_BITS`](super::vector::VECTOR_BITS)-bit
//!    signature with SHA-256.
//! 3. Superimpose the signatures in an [`Accumulator`] and threshold.
//!
//! # Determinism
//!
//! There is no seed, clock, or cache involved: the same bytes in always give
//! the same vector out, across calls and across processes.
//!
//! ```rust
//! use sentra::kernel::{HyperEncoder, Similarity};
//!
//! let enc = HyperEncoder::new();
//! let a = enc.encode_text("hello world");
//! let b = enc.encode_text("hello world!");
//! assert!(Similarity::hamming(&a, &b) < 100);
//! ```

use super::accumulator::Accumulator;
use super::vector::Hypervector;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Size of one byte chunk when encoding binary blobs.
pub const BYTE_CHUNK: usize = 16;

/// Trigram window width for text.
const NGRAM: usize = 3;

/// Hash arbitrary bytes to a 256-bit signature.
///
/// Equal inputs give equal signatures, different inputs give effectively
/// uncorrelated ones.
pub fn signature(data: &[u8]) -> Hypervector {
    let digest = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Hypervector::from_bytes(bytes)
}

/// One input to encode.
#[derive(Clone, Copy, Debug)]
pub enum Modality<'a> {
    /// Free text, encoded via character trigrams
    Text(&'a str),
    /// Opaque binary data, encoded in 16-byte chunks
    Bytes(&'a [u8]),
    /// Structured key/value state, encoded as named features
    State(&'a Value),
}

/// Deterministic SimHash-style encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperEncoder;

impl HyperEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self
    }

    /// Encode any supported modality.
    pub fn encode(&self, input: Modality<'_>) -> Hypervector {
        match input {
            Modality::Text(text) => self.encode_text(text),
            Modality::Bytes(data) => self.encode_bytes(data),
            Modality::State(value) => self.encode_state(value),
        }
    }

    /// Encode text via bipolar superposition of trigram signatures.
    ///
    /// Whitespace runs collapse to one space and the text is padded with a
    /// single leading and trailing space, so word edges form their own
    /// trigrams. Text too short to hold one trigram is hashed directly.
    pub fn encode_text(&self, text: &str) -> Hypervector {
        let padded: Vec<char> = std::iter::once(' ')
            .chain(collapse_whitespace(text).chars())
            .chain(std::iter::once(' '))
            .collect();

        if padded.len() < NGRAM {
            return signature(text.as_bytes());
        }

        let mut acc = Accumulator::new();
        let mut buf = String::with_capacity(NGRAM * 4);
        for window in padded.windows(NGRAM) {
            buf.clear();
            buf.extend(window);
            acc.add(&signature(buf.as_bytes()));
        }
        acc.threshold()
    }

    /// Encode a binary blob by hashing fixed-size chunks.
    ///
    /// Chunks are hashed through their hex spelling so that a chunk and the
    /// equivalent hex text feature land on the same signature.
    pub fn encode_bytes(&self, data: &[u8]) -> Hypervector {
        let mut acc = Accumulator::new();
        for chunk in data.chunks(BYTE_CHUNK) {
            acc.add(&signature(hex::encode(chunk).as_bytes()));
        }
        acc.threshold()
    }

    /// Encode structured state as a superposition of `path=value` features.
    ///
    /// Objects contribute one feature per leaf, keyed by dotted path, and
    /// arrays key their elements by position. Two states sharing most leaves
    /// therefore share most features.
    pub fn encode_state(&self, value: &Value) -> Hypervector {
        let mut features = Vec::new();
        collect_features(value, None, &mut features);
        self.encode_features(features.iter().map(String::as_str))
    }

    /// Encode an explicit set of named features.
    pub fn encode_features<'a, I>(&self, features: I) -> Hypervector
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut acc = Accumulator::new();
        for feature in features {
            acc.add(&signature(feature.as_bytes()));
        }
        acc.threshold()
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn make_path(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(p) => format!("{}.{}", p, key),
        None => key.to_string(),
    }
}

fn collect_features(value: &Value, prefix: Option<&str>, out: &mut Vec<String>) {
    match value {
        Value::Object(obj) if obj.is_empty() => out.push(make_path(prefix, "{}")),
        Value::Object(obj) => {
            for (key, child) in obj {
                let path = make_path(prefix, key);
                collect_features(child, Some(&path), out);
            }
        }
        Value::Array(arr) if arr.is_empty() => out.push(make_path(prefix, "[]")),
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                let path = make_path(prefix, &format!("[{}]", i));
                collect_features(child, Some(&path), out);
            }
        }
        Value::String(s) => out.push(format!("{}={}", prefix.unwrap_or(""), s)),
        other => out.push(format!("{}={}", prefix.unwrap_or(""), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::similarity::Similarity;
    use crate::kernel::vector::VECTOR_BITS;
    use serde_json::json;

    #[test]
    fn test_deterministic() {
        let enc = HyperEncoder::new();
        assert_eq!(enc.encode_text("status report"), enc.encode_text("status report"));
        assert_eq!(
            HyperEncoder::new().encode_text("status report"),
            enc.encode_text("status report")
        );
    }

    #[test]
    fn test_signature_is_sha256() {
        // SHA-256("abc") starts with ba7816bf
        let sig = signature(b"abc");
        assert_eq!(&sig.to_hex()[..8], "ba7816bf");
    }

    #[test]
    fn test_empty_text_falls_back_to_raw_hash() {
        let enc = HyperEncoder::new();
        assert_eq!(enc.encode_text(""), signature(b""));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let enc = HyperEncoder::new();
        assert_eq!(enc.encode_text("hello   world"), enc.encode_text("hello world"));
        assert_eq!(enc.encode_text("hello\t\nworld"), enc.encode_text("hello world"));
        assert_ne!(enc.encode_text("helloworld"), enc.encode_text("hello world"));
    }

    #[test]
    fn test_near_duplicate_stability() {
        let enc = HyperEncoder::new();
        let a = enc.encode_text("hello world");
        let b = enc.encode_text("hello world!");
        let d = Similarity::hamming(&a, &b) as f64;
        assert!(
            d < 0.4 * VECTOR_BITS as f64,
            "One-character edit moved {} bits",
            d
        );
    }

    #[test]
    fn test_unrelated_texts_are_far_apart() {
        let enc = HyperEncoder::new();
        let pairs = [
            ("quantum chromodynamics", "buy milk tomorrow"),
            ("xylophone", "the weather is nice today"),
            ("zebra crossing", "compile the kernel"),
        ];
        let mean: f64 = pairs
            .iter()
            .map(|(a, b)| Similarity::hamming(&enc.encode_text(a), &enc.encode_text(b)) as f64)
            .sum::<f64>()
            / pairs.len() as f64;
        let half = VECTOR_BITS as f64 / 2.0;
        assert!(
            (mean - half).abs() < 0.25 * half,
            "Unrelated texts should sit near {} bits apart, got {}",
            half,
            mean
        );
    }

    #[test]
    fn test_bytes_chunks() {
        let enc = HyperEncoder::new();
        let data: Vec<u8> = (0..64).collect();
        let mut edited = data.clone();
        edited[63] ^= 0xFF;

        let a = enc.encode(Modality::Bytes(&data));
        let b = enc.encode(Modality::Bytes(&edited));
        assert_eq!(a, enc.encode_bytes(&data));
        assert!(Similarity::hamming(&a, &b) < Similarity::hamming(&a, &enc.encode_text("x")));
        assert_eq!(enc.encode_bytes(&[]), Hypervector::zeros());
    }

    #[test]
    fn test_state_shares_features() {
        let enc = HyperEncoder::new();
        let base = json!({"energy": 80, "topic": "biology", "mood": "curious", "tags": ["a", "b"]});
        let close = json!({"energy": 80, "topic": "biology", "mood": "tired", "tags": ["a", "b"]});
        let far = json!({"cpu": 3, "disk": "full"});

        let v_base = enc.encode(Modality::State(&base));
        let d_close = Similarity::hamming(&v_base, &enc.encode_state(&close));
        let d_far = Similarity::hamming(&v_base, &enc.encode_state(&far));
        assert!(d_close < d_far, "close={} far={}", d_close, d_far);
    }

    #[test]
    fn test_state_features_are_path_keyed() {
        let mut features = Vec::new();
        collect_features(&json!({"a": {"b": 1}, "c": [true], "d": {}}), None, &mut features);
        assert_eq!(features, vec!["a.b=1", "c.[0]=true", "d.{}"]);
    }
}
