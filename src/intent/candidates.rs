//! CandidateGenerator: alternative readings of one input.
//!
//! An ambiguous input is expanded into several latent vectors, produced in a
//! fixed priority order:
//!
//! 1. the input's own encoding
//! 2. deterministic text variants, re-encoded
//! 3. OR-blends of the base vector with each of its nearest prototypes
//! 4. pairwise OR-blends of those prototypes
//! 5. random bit-flip perturbations of the base vector
//!
//! Everything before step 5 is deterministic, so the head of the list is
//! stable across runs and only the tail depends on the RNG. Candidates are
//! unique by vector.

use crate::config::CandidateConfig;
use crate::kernel::{HyperEncoder, Hypervector, Primitives, PrototypeBank};
use rand::Rng;
use tracing::debug;

/// Words dropped by [`TextTransform::RemoveStopWords`].
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "be", "to", "of", "and", "or", "in", "on", "at", "for",
    "with", "it", "this", "that", "please", "can", "you", "could", "would", "me", "my", "i", "do",
    "just", "so",
];

/// Deterministic rewrite of the raw input text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextTransform {
    RemoveStopWords,
    FirstTwoWords,
    LastTwoWords,
    StripPunctuation,
}

impl TextTransform {
    /// All transforms, in generation order.
    pub const ALL: [TextTransform; 4] = [
        TextTransform::RemoveStopWords,
        TextTransform::FirstTwoWords,
        TextTransform::LastTwoWords,
        TextTransform::StripPunctuation,
    ];

    pub fn apply(self, text: &str) -> String {
        let words: Vec<&str> = text.split_whitespace().collect();
        match self {
            TextTransform::RemoveStopWords => words
                .iter()
                .filter(|w| {
                    let bare = w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
                    !STOP_WORDS.contains(&bare.as_str())
                })
                .copied()
                .collect::<Vec<_>>()
                .join(" "),
            TextTransform::FirstTwoWords => words.iter().take(2).copied().collect::<Vec<_>>().join(" "),
            TextTransform::LastTwoWords => {
                let skip = words.len().saturating_sub(2);
                words[skip..].join(" ")
            }
            TextTransform::StripPunctuation => text
                .chars()
                .filter(|c| c.is_alphanumeric() || c.is_whitespace())
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// How a candidate was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    Original,
    TextVariant(TextTransform),
    /// Base vector OR one nearby prototype
    PrototypeBlend { prototype: usize },
    /// Two nearby prototypes OR'd together
    PairBlend { first: usize, second: usize },
    RandomPerturbation { flips: usize },
}

impl Provenance {
    pub fn is_random(&self) -> bool {
        matches!(self, Provenance::RandomPerturbation { .. })
    }
}

/// One interpretation of the input.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    pub vector: Hypervector,
    pub provenance: Provenance,
    /// Rewritten text, for text variants
    pub text: Option<String>,
}

impl Candidate {
    fn new(vector: Hypervector, provenance: Provenance) -> Self {
        Self {
            vector,
            provenance,
            text: None,
        }
    }
}

/// Expands inputs into candidate vectors against a prototype bank.
#[derive(Clone, Copy, Debug)]
pub struct CandidateGenerator<'a> {
    encoder: HyperEncoder,
    bank: &'a PrototypeBank,
    config: CandidateConfig,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(encoder: HyperEncoder, bank: &'a PrototypeBank, config: CandidateConfig) -> Self {
        Self {
            encoder,
            bank,
            config,
        }
    }

    /// Produce at most `n` distinct candidates for `input`.
    pub fn generate<R: Rng + ?Sized>(&self, input: &str, n: usize, rng: &mut R) -> Vec<Candidate> {
        let mut out = Candidates::with_limit(n);
        let base = self.encoder.encode_text(input);
        out.push(Candidate::new(base, Provenance::Original));

        let original = input.trim();
        for transform in TextTransform::ALL {
            if out.is_full() {
                break;
            }
            let variant = transform.apply(original);
            if variant.is_empty() || variant == original {
                continue;
            }
            let vector = self.encoder.encode_text(&variant);
            out.push(Candidate {
                vector,
                provenance: Provenance::TextVariant(transform),
                text: Some(variant),
            });
        }

        let nearest: Vec<usize> = self
            .bank
            .k_nearest(&base, self.config.nearest_prototypes)
            .into_iter()
            .map(|(i, _)| i)
            .collect();

        for &p in &nearest {
            if out.is_full() {
                break;
            }
            if let Some(proto) = self.bank.get(p) {
                out.push(Candidate::new(
                    Primitives::or_blend(&base, proto),
                    Provenance::PrototypeBlend { prototype: p },
                ));
            }
        }

        'pairs: for (i, &first) in nearest.iter().enumerate() {
            for &second in &nearest[i + 1..] {
                if out.is_full() {
                    break 'pairs;
                }
                if let (Some(a), Some(b)) = (self.bank.get(first), self.bank.get(second)) {
                    out.push(Candidate::new(
                        Primitives::or_blend(a, b),
                        Provenance::PairBlend { first, second },
                    ));
                }
            }
        }

        let lo = self.config.min_flips.min(self.config.max_flips).max(1);
        let hi = self.config.max_flips.max(lo);
        let mut attempts = 0;
        while !out.is_full() && attempts < self.config.max_random_attempts {
            attempts += 1;
            let flips = rng.gen_range(lo..=hi);
            out.push(Candidate::new(
                Primitives::perturb(&base, flips, rng),
                Provenance::RandomPerturbation { flips },
            ));
        }

        debug!(input, candidates = out.items.len(), "generated candidates");
        out.items
    }
}

/// Bounded list unique by vector.
struct Candidates {
    items: Vec<Candidate>,
    limit: usize,
}

impl Candidates {
    fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit),
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.limit
    }

    fn push(&mut self, candidate: Candidate) -> bool {
        if self.is_full() || self.items.iter().any(|c| c.vector == candidate.vector) {
            return false;
        }
        self.items.push(candidate);
        true
    }
}
