//! BiasModulator: an attractor that pulls retrieval toward the current focus.
//!
//! The modulator tracks one attractor vector, seeded from an identity text.
//! Its bias for a trigger vector is
//!
//! ```text
//! bias(v) = (0.25 - hamming(attractor, v) / 512) * scale
//! ```
//!
//! which is positive for triggers near the attractor and negative for
//! triggers far from it. The skill index subtracts it from raw distances, so
//! nearby triggers look closer. Unrelated vectors sit about 128 bits away,
//! where the bias is zero.
//!
//! Focus shifts and drift are random. The RNG is always passed in, so tests
//! can seed it or skip both and keep the attractor fixed.

use crate::config::BiasConfig;
use crate::kernel::{HyperEncoder, Hypervector, Primitives, Similarity};
use crate::memory::DistanceBias;
use rand::Rng;
use tracing::debug;

/// Normalizer turning a Hamming distance into the bias value.
const DISTANCE_NORM: f64 = 512.0;

/// Bias value at which the adjustment crosses zero.
const NEUTRAL: f64 = 0.25;

#[derive(Clone, Debug, PartialEq)]
pub struct BiasModulator {
    identity: Hypervector,
    attractor: Hypervector,
    scale: f64,
    drift_rate: f64,
}

impl BiasModulator {
    pub fn new(attractor: Hypervector, scale: f64, drift_rate: f64) -> Self {
        Self {
            identity: attractor,
            attractor,
            scale,
            drift_rate,
        }
    }

    /// Seed the attractor from the configured identity text.
    pub fn from_config(config: &BiasConfig, encoder: &HyperEncoder) -> Self {
        Self::new(
            encoder.encode_text(&config.identity),
            config.scale,
            config.drift_rate,
        )
    }

    pub fn attractor(&self) -> &Hypervector {
        &self.attractor
    }

    /// Signed distance adjustment for `vector`.
    pub fn bias(&self, vector: &Hypervector) -> f64 {
        let value = Similarity::hamming(&self.attractor, vector) as f64 / DISTANCE_NORM;
        (NEUTRAL - value) * self.scale
    }

    /// Move the attractor toward `target`, taking each bit from it with
    /// probability `weight`.
    pub fn set_focus<R: Rng + ?Sized>(&mut self, target: &Hypervector, weight: f64, rng: &mut R) {
        self.attractor = Primitives::stochastic_blend(&self.attractor, target, weight, rng);
        debug!(
            distance = Similarity::hamming(&self.attractor, target),
            "attractor refocused"
        );
    }

    /// Randomly flip a few attractor bits.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.attractor = Primitives::drift(&self.attractor, self.drift_rate, rng);
    }

    /// Return to the identity vector.
    pub fn reset(&mut self) {
        self.attractor = self.identity;
    }
}

impl DistanceBias for BiasModulator {
    fn bias(&self, trigger: &Hypervector) -> f64 {
        BiasModulator::bias(self, trigger)
    }
}
