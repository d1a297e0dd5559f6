//! Configuration values.
//!
//! All cutoffs in this crate are empirically tuned and meant to be adjusted
//! per deployment. Every struct deserializes from JSON with per-field
//! defaults, so a config file only needs the values it overrides:
//!
//! ```rust
//! use sentra::EngineConfig;
//!
//! let cfg = EngineConfig::from_json(r#"{"thresholds": {"library_threshold": 90}}"#).unwrap();
//! assert_eq!(cfg.thresholds.library_threshold, 90);
//! assert_eq!(cfg.thresholds.habit_threshold, 40);
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fuzzy-match cutoffs per skill class, in Hamming bits (inclusive).
///
/// Curated skills get the loose `library_threshold`; learned and automated
/// skills must clear the tight `habit_threshold`. The library default admits
/// a one-letter typo on a five-letter trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub library_threshold: u32,
    pub habit_threshold: u32,
}

impl ThresholdConfig {
    pub fn new(library_threshold: u32, habit_threshold: u32) -> Self {
        Self {
            library_threshold,
            habit_threshold,
        }
    }

    /// True when habits are no stricter than curated skills.
    ///
    /// Retrieval still works, but stops favouring curated behaviour.
    pub fn is_inverted(&self) -> bool {
        self.habit_threshold >= self.library_threshold
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(80, 40)
    }
}

/// Intent ranking knobs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Distance at which relevance decays to zero
    pub max_distance: f64,
    /// Candidates below this relevance score zero
    pub min_relevance: f64,
    /// Best score must exceed this to be accepted
    pub min_score: f64,
    /// Rollout steps passed to the oracle; 0 means a single `predict`
    pub rollout_horizon: usize,
    /// Per-step discount for rollouts
    pub discount: f64,
    /// Penalty for repeating the most recent skill; older repeats get less
    pub repetition_penalty: f64,
    /// Length of the recent-skill history
    pub history_len: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_distance: 200.0,
            min_relevance: 0.25,
            min_score: 0.1,
            rollout_horizon: 3,
            discount: 0.9,
            repetition_penalty: 0.3,
            history_len: 5,
        }
    }
}

/// Candidate generation knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub max_candidates: usize,
    /// Prototypes used for blends
    pub nearest_prototypes: usize,
    pub min_flips: usize,
    pub max_flips: usize,
    /// Give up on random perturbations after this many tries
    pub max_random_attempts: usize,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            max_candidates: 7,
            nearest_prototypes: 8,
            min_flips: 4,
            max_flips: 8,
            max_random_attempts: 64,
        }
    }
}

/// Attractor bias knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    pub enabled: bool,
    /// Maximum shift in Hamming bits
    pub scale: f64,
    /// Per-byte chance of a random flip on each drift step
    pub drift_rate: f64,
    /// How far a focus shift moves the attractor toward its target
    pub focus_weight: f64,
    /// Text whose encoding seeds the attractor
    pub identity: String,
}

impl Default for BiasConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 20.0,
            drift_rate: 0.05,
            focus_weight: 0.8,
            identity: "Sentra".to_string(),
        }
    }
}

/// Top-level configuration for an [`Engine`](crate::highlevel::Engine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: ThresholdConfig,
    pub ranker: RankerConfig,
    pub candidates: CandidateConfig,
    pub bias: BiasConfig,
    /// Skill returned when nothing clears its threshold
    pub fallback_skill: String,
    /// Prototypes activated per input
    pub activation_k: usize,
    /// Seed for the engine's random source
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            ranker: RankerConfig::default(),
            candidates: CandidateConfig::default(),
            bias: BiasConfig::default(),
            fallback_skill: "meta_unknown".to_string(),
            activation_k: crate::kernel::ACTIVATION_K,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Parse from a JSON string; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
