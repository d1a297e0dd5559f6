//! IntentRanker: pick the best skill across candidate interpretations.
//!
//! Each candidate is scored as
//!
//! ```text
//! relevance = max(0, 1 - distance / max_distance)
//! score     = reward * relevance - repetition_penalty(skill)
//! ```
//!
//! where `distance` is the Hamming distance to the candidate's nearest skill
//! trigger and `reward` comes from the oracle. The product is what keeps a
//! high-reward but irrelevant skill from winning. Candidates below
//! `min_relevance` score zero without consulting the oracle at all.

use super::candidates::{Candidate, Provenance};
use super::oracle::RewardOracle;
use crate::config::RankerConfig;
use crate::kernel::PrototypeBank;
use crate::memory::{Skill, SkillIndex};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Bounded most-recent-first list of executed skill ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentSkills {
    ids: VecDeque<String>,
    capacity: usize,
}

impl RecentSkills {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an execution. A repeated id moves to the front.
    pub fn push(&mut self, id: &str) {
        if self.capacity == 0 {
            return;
        }
        self.ids.retain(|s| s != id);
        self.ids.push_front(id.to_string());
        self.ids.truncate(self.capacity);
    }

    /// 0 for the most recent skill.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|s| s == id)
    }

    /// Recency weight in `(0, 1]`: 1 for the most recent, decaying linearly,
    /// 0 for skills not in the list.
    pub fn recency(&self, id: &str) -> f64 {
        match self.position(id) {
            Some(pos) => (self.capacity - pos) as f64 / self.capacity as f64,
            None => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// The winning interpretation.
#[derive(Clone, Copy, Debug)]
pub struct RankedIntent<'a> {
    pub skill: &'a Skill,
    pub score: f64,
    pub raw_reward: f64,
    pub relevance: f64,
    /// Hamming distance from the candidate to the skill's nearest trigger
    pub distance: u32,
    /// Position of the winning candidate in the input slice
    pub candidate: usize,
    pub provenance: Provenance,
}

#[derive(Clone, Copy, Debug)]
pub struct IntentRanker {
    config: RankerConfig,
    activation_k: usize,
}

impl IntentRanker {
    pub fn new(config: RankerConfig, activation_k: usize) -> Self {
        Self {
            config,
            activation_k,
        }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Map a distance to relevance in `[0, 1]`.
    pub fn relevance(&self, distance: u32) -> f64 {
        if self.config.max_distance <= 0.0 {
            return if distance == 0 { 1.0 } else { 0.0 };
        }
        (1.0 - distance as f64 / self.config.max_distance).max(0.0)
    }

    /// Best skill over all candidates, or `None` if no score exceeds
    /// `min_score`. Ties keep the earlier candidate.
    pub fn rank<'s, O>(
        &self,
        candidates: &[Candidate],
        index: &'s SkillIndex,
        bank: &PrototypeBank,
        oracle: &O,
        recent: &RecentSkills,
    ) -> Option<RankedIntent<'s>>
    where
        O: RewardOracle + ?Sized,
    {
        let mut best: Option<RankedIntent<'s>> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            let Some((skill, distance)) = index.nearest_skill(&candidate.vector) else {
                continue;
            };
            let relevance = self.relevance(distance);

            let (raw_reward, score) = if relevance < self.config.min_relevance {
                (0.0, 0.0)
            } else {
                let activated = bank.activate(&candidate.vector, self.activation_k);
                let reward = self.consult(oracle, &activated, skill);
                let penalty = self.config.repetition_penalty * recent.recency(skill.id());
                (reward, (reward * relevance - penalty).max(0.0))
            };

            debug!(
                candidate = i,
                skill = skill.id(),
                distance,
                relevance,
                raw_reward,
                score,
                "scored candidate"
            );

            if best.map_or(true, |b| score > b.score) {
                best = Some(RankedIntent {
                    skill,
                    score,
                    raw_reward,
                    relevance,
                    distance,
                    candidate: i,
                    provenance: candidate.provenance,
                });
            }
        }

        best.filter(|b| b.score > self.config.min_score)
    }

    /// Oracle reward, with failures and non-finite values read as zero.
    fn consult<O>(&self, oracle: &O, activated: &[usize], skill: &Skill) -> f64
    where
        O: RewardOracle + ?Sized,
    {
        let result = if self.config.rollout_horizon == 0 {
            oracle.predict(activated)
        } else {
            oracle.simulate_rollout(
                activated,
                self.config.rollout_horizon,
                self.config.discount,
                Some(skill),
            )
        };
        match result {
            Ok(r) if r.is_finite() => r,
            Ok(r) => {
                warn!(skill = skill.id(), reward = r, "oracle returned non-finite reward");
                0.0
            }
            Err(e) => {
                warn!(skill = skill.id(), error = %e, "oracle failed, using neutral reward");
                0.0
            }
        }
    }
}
