//! Convenience facade that owns the encoder, prototype bank, skill index,
//! attention state and random source, and delegates to the kernel, memory
//! and intent layers.
//!
//! For full control, import from [`kernel`](crate::kernel),
//! [`memory`](crate::memory) and [`intent`](crate::intent) directly.

use crate::config::{EngineConfig, ThresholdConfig};
use crate::error::Result;
use crate::intent::{
    BiasModulator, CandidateGenerator, IntentRanker, RankedIntent, RecentSkills, RewardOracle,
};
use crate::kernel::{HyperEncoder, Hypervector, Modality, PrototypeBank};
use crate::memory::{
    store, DistanceBias, FunctionalMatcher, Skill, SkillIndex, SkillMatch, DEMOTE_MIN_USES,
    DEMOTE_REWARD_FLOOR, PRUNE_MIN_USES, PRUNE_REWARD_FLOOR,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::{info, warn};

/// How [`Engine::resolve`] reached its answer.
#[derive(Clone, Copy, Debug)]
pub enum Resolution<'a> {
    /// Best of the candidate interpretations
    Ranked(RankedIntent<'a>),
    /// Plain tiered retrieval, after ranking found nothing acceptable
    Retrieved(SkillMatch<'a>),
}

impl<'a> Resolution<'a> {
    pub fn skill(&self) -> &'a Skill {
        match self {
            Resolution::Ranked(r) => r.skill,
            Resolution::Retrieved(m) => m.skill,
        }
    }
}

/// Agent core wiring perception, skill memory and intent resolution.
///
/// The engine is *ready* once a prototype bank is installed. Until then it
/// degrades to exact trigger matching: fuzzy retrieval, fallback and
/// candidate ranking all need the bank.
///
/// # Example
///
/// ```rust
/// use sentra::highlevel::Engine;
/// use sentra::kernel::PrototypeBank;
/// use sentra::memory::{Skill, SkillClass};
/// use sentra::EngineConfig;
///
/// let mut engine = Engine::new(EngineConfig::default()).with_prototype_bank(PrototypeBank::random(42));
/// let skill = Skill::new("skill_greet", SkillClass::Library, vec!["hello".into()], engine.encoder());
/// engine.register_skill(skill).unwrap();
///
/// assert_eq!(engine.retrieve("hello").map(|s| s.id()), Some("skill_greet"));
/// ```
pub struct Engine {
    config: EngineConfig,
    encoder: HyperEncoder,
    bank: Option<PrototypeBank>,
    index: SkillIndex,
    bias: Option<BiasModulator>,
    functional: Option<FunctionalMatcher>,
    recent: RecentSkills,
    rng: ChaCha8Rng,
}

impl Engine {
    /// Create an engine with no prototypes and no skills.
    pub fn new(config: EngineConfig) -> Self {
        let encoder = HyperEncoder::new();
        let bias = config
            .bias
            .enabled
            .then(|| BiasModulator::from_config(&config.bias, &encoder));
        if config.thresholds.is_inverted() {
            warn_inverted(config.thresholds);
        }
        Self {
            index: SkillIndex::new().with_fallback(fallback_id(&config)),
            recent: RecentSkills::new(config.ranker.history_len),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            encoder,
            bank: None,
            bias,
            functional: None,
            config,
        }
    }

    pub fn with_prototype_bank(mut self, bank: PrototypeBank) -> Self {
        self.bank = Some(bank);
        self
    }

    pub fn with_skills(mut self, index: SkillIndex) -> Self {
        self.index = index.with_fallback(fallback_id(&self.config));
        self
    }

    pub fn with_functional(mut self, matcher: FunctionalMatcher) -> Self {
        self.functional = Some(matcher);
        self
    }

    /// Load the prototype blob. On failure the engine is left not ready and
    /// the error is returned for the caller to report.
    pub fn load_prototypes<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        match PrototypeBank::load(path) {
            Ok(bank) => {
                self.bank = Some(bank);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "prototype bank unavailable, exact matching only");
                self.bank = None;
                Err(e)
            }
        }
    }

    /// Replace the skill index with the curated and learned stores.
    ///
    /// Returns the number of skills indexed.
    pub fn load_skills<P, Q>(&mut self, curated: P, learned: Q) -> Result<usize>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let curated = store::load_curated(curated)?;
        let learned = store::load_learned(learned)?;
        self.index = SkillIndex::from_records(curated, learned, &self.encoder)
            .with_fallback(fallback_id(&self.config));
        Ok(self.index.len())
    }

    /// Write every learned and automated skill to the learned store.
    pub fn save_learned<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        store::save_learned(path, &self.index.learned_records())
    }

    pub fn load_functional<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.functional = Some(FunctionalMatcher::load(path)?);
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.bank.is_some()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn encoder(&self) -> &HyperEncoder {
        &self.encoder
    }

    pub fn prototype_bank(&self) -> Option<&PrototypeBank> {
        self.bank.as_ref()
    }

    pub fn skills(&self) -> &SkillIndex {
        &self.index
    }

    pub fn recent(&self) -> &RecentSkills {
        &self.recent
    }

    pub fn bias(&self) -> Option<&BiasModulator> {
        self.bias.as_ref()
    }

    pub fn register_skill(&mut self, skill: Skill) -> Result<()> {
        self.index.register(skill)
    }

    // =========================================================================
    // Perception
    // =========================================================================

    pub fn encode(&self, input: Modality<'_>) -> Hypervector {
        self.encoder.encode(input)
    }

    /// Indices of the prototypes nearest to the input. Empty when not ready.
    pub fn activate(&self, input: Modality<'_>) -> Vec<usize> {
        match &self.bank {
            Some(bank) => bank.activate(&self.encoder.encode(input), self.config.activation_k),
            None => Vec::new(),
        }
    }

    /// Nearest functional category of a text, within the library threshold.
    pub fn classify(&self, input: &str) -> Option<(&str, u32)> {
        self.functional.as_ref()?.classify(
            &self.encoder.encode_text(input),
            self.config.thresholds.library_threshold,
        )
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    pub fn retrieve(&self, input: &str) -> Option<&Skill> {
        self.retrieve_match(input).map(|m| m.skill)
    }

    pub fn retrieve_match(&self, input: &str) -> Option<SkillMatch<'_>> {
        let encoder = self.bank.as_ref().map(|_| &self.encoder);
        let bias = self.bias.as_ref().map(|b| b as &dyn DistanceBias);
        self.index
            .retrieve_match(input, encoder, self.config.thresholds, bias)
    }

    /// Resolve an input through candidate ranking, falling back to plain
    /// retrieval when no candidate scores high enough.
    pub fn resolve<O>(&mut self, input: &str, oracle: &O) -> Option<Resolution<'_>>
    where
        O: RewardOracle + ?Sized,
    {
        let ranked = match &self.bank {
            Some(bank) => {
                let candidates = CandidateGenerator::new(self.encoder, bank, self.config.candidates)
                    .generate(input, self.config.candidates.max_candidates, &mut self.rng);
                IntentRanker::new(self.config.ranker, self.config.activation_k).rank(
                    &candidates,
                    &self.index,
                    bank,
                    oracle,
                    &self.recent,
                )
            }
            None => None,
        };
        match ranked {
            Some(r) => Some(Resolution::Ranked(r)),
            None => self.retrieve_match(input).map(Resolution::Retrieved),
        }
    }

    /// Change the fuzzy thresholds. An inverted pair is accepted with a
    /// warning.
    pub fn set_thresholds(&mut self, thresholds: ThresholdConfig) {
        if thresholds.is_inverted() {
            warn_inverted(thresholds);
        }
        self.config.thresholds = thresholds;
    }

    // =========================================================================
    // Learning & feedback
    // =========================================================================

    /// Note that a skill ran: it enters the recency list and its usage count
    /// grows.
    pub fn record_execution(&mut self, id: &str) -> Result<()> {
        self.index.record_usage(id)?;
        self.recent.push(id);
        Ok(())
    }

    /// Fold a reward into a skill's average. Returns the new average.
    pub fn reward(&mut self, id: &str, reward: f64) -> Result<f64> {
        self.index.record_reward(id, reward)
    }

    pub fn learn(&mut self, trigger: &str, response: &str) -> Result<String> {
        self.index.learn_skill(trigger, response, &self.encoder)
    }

    /// Forget learned skills that keep earning low rewards, then demote
    /// habits that are merely underperforming. Returns the pruned ids.
    pub fn prune(&mut self) -> Vec<String> {
        let pruned = self
            .index
            .prune_underperforming(PRUNE_MIN_USES, PRUNE_REWARD_FLOOR);
        let demoted = self
            .index
            .demote_underperforming(DEMOTE_MIN_USES, DEMOTE_REWARD_FLOOR);
        if !pruned.is_empty() || !demoted.is_empty() {
            info!(pruned = pruned.len(), demoted = demoted.len(), "procedural pruning");
        }
        pruned
    }

    // =========================================================================
    // Attention
    // =========================================================================

    /// Pull the attractor toward a topic. No-op when bias is disabled.
    pub fn focus(&mut self, topic: &str) {
        let target = self.encoder.encode_text(topic);
        if let Some(bias) = self.bias.as_mut() {
            bias.set_focus(&target, self.config.bias.focus_weight, &mut self.rng);
        }
    }

    /// Let the attractor wander one step. No-op when bias is disabled.
    pub fn drift(&mut self) {
        if let Some(bias) = self.bias.as_mut() {
            bias.drift(&mut self.rng);
        }
    }
}

fn fallback_id(config: &EngineConfig) -> Option<String> {
    Some(config.fallback_skill.clone()).filter(|s| !s.is_empty())
}

fn warn_inverted(thresholds: ThresholdConfig) {
    warn!(
        library = thresholds.library_threshold,
        habit = thresholds.habit_threshold,
        "habit threshold is not stricter than library threshold; matching is class-blind"
    );
}
