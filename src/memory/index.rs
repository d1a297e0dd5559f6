//! SkillIndex: tiered skill retrieval.
//!
//! Retrieval runs three tiers and stops at the first that produces a skill:
//!
//! 1. **Exact, curated**: case-insensitive trigger match over library skills.
//! 2. **Exact, habit**: the same pass over learned and automated skills.
//! 3. **Fuzzy**: encode the input once and take, per class, the skill whose
//!    nearest trigger vector is closest. Library skills must fall within
//!    `library_threshold`, learned and automated skills within the much
//!    tighter `habit_threshold`.
//!
//! If nothing clears its threshold the designated fallback skill is returned
//! when registered. Skills are scanned in registration order everywhere, so
//! ties always resolve to the earlier skill.
//!
//! # Mutation
//!
//! The index is only mutated between retrieval calls: retrieval borrows it
//! shared and hands out `&Skill`, while every mutation needs `&mut self`.
//! Callers that share an index across threads must keep that discipline.

use super::skill::{ProgramStep, Skill, SkillClass};
use super::store::{SkillRecord, StoreKind, LEARNED_PREFIX};
use crate::config::ThresholdConfig;
use crate::error::{Result, SentraError};
use crate::kernel::{HyperEncoder, Hypervector, Similarity};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Id of the skill returned when nothing matches.
pub const DEFAULT_FALLBACK: &str = "meta_unknown";

/// Uses before a skill's reward average is trusted for pruning.
pub const PRUNE_MIN_USES: u64 = 3;

/// Average reward below which a trusted skill is pruned.
pub const PRUNE_REWARD_FLOOR: f64 = 0.3;

/// Uses before a habit's reward average is trusted for demotion.
pub const DEMOTE_MIN_USES: u64 = 2;

/// Average reward below which a trusted habit loses its habit status.
pub const DEMOTE_REWARD_FLOOR: f64 = 0.5;

/// A signed shift applied to fuzzy distances.
///
/// Positive values pull a trigger closer to the input: the adjusted distance
/// is `raw - bias(trigger)`.
pub trait DistanceBias {
    fn bias(&self, trigger: &Hypervector) -> f64;
}

impl<F> DistanceBias for F
where
    F: Fn(&Hypervector) -> f64,
{
    fn bias(&self, trigger: &Hypervector) -> f64 {
        self(trigger)
    }
}

/// Which tier produced a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchTier {
    ExactLibrary,
    ExactHabit,
    Fuzzy,
    Fallback,
}

/// A retrieval result with its provenance.
#[derive(Clone, Copy, Debug)]
pub struct SkillMatch<'a> {
    pub skill: &'a Skill,
    pub tier: MatchTier,
    /// Adjusted distance for fuzzy matches
    pub distance: Option<f64>,
}

/// Ordered, id-addressable collection of skills.
#[derive(Debug)]
pub struct SkillIndex {
    skills: Vec<Skill>,
    by_id: HashMap<String, usize>,
    fallback: Option<String>,
}

impl Default for SkillIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillIndex {
    /// Create an empty index using [`DEFAULT_FALLBACK`] as fallback id.
    pub fn new() -> Self {
        Self {
            skills: Vec::new(),
            by_id: HashMap::new(),
            fallback: Some(DEFAULT_FALLBACK.to_string()),
        }
    }

    /// Build an index from both stores: curated records first, then learned.
    ///
    /// A learned record reusing a curated id is dropped so the curated
    /// definition stays authoritative.
    pub fn from_records(
        curated: Vec<SkillRecord>,
        learned: Vec<SkillRecord>,
        encoder: &HyperEncoder,
    ) -> Self {
        let mut index = Self::new();
        let stores = curated
            .into_iter()
            .map(|r| (r, StoreKind::Curated))
            .chain(learned.into_iter().map(|r| (r, StoreKind::Learned)));
        for (record, kind) in stores {
            let id = record.skill_id.clone();
            if let Err(e) = index.register(record.into_skill(kind, encoder)) {
                warn!(skill = %id, error = %e, "skipping skill");
            }
        }
        info!(skills = index.len(), "skill index built");
        index
    }

    /// Use a different fallback id, or none.
    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Append a skill. Ids are unique.
    pub fn register(&mut self, skill: Skill) -> Result<()> {
        if self.by_id.contains_key(skill.id()) {
            return Err(SentraError::DuplicateSkill(skill.id().to_string()));
        }
        self.by_id.insert(skill.id().to_string(), self.skills.len());
        self.skills.push(skill);
        Ok(())
    }

    /// Remove a skill. Returns it if it existed.
    pub fn forget(&mut self, id: &str) -> Option<Skill> {
        let pos = self.by_id.remove(id)?;
        let skill = self.skills.remove(pos);
        for slot in self.by_id.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(skill)
    }

    pub fn get(&self, id: &str) -> Option<&Skill> {
        self.by_id.get(id).map(|&i| &self.skills[i])
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Skill> {
        match self.by_id.get(id) {
            Some(&i) => Ok(&mut self.skills[i]),
            None => Err(SentraError::UnknownSkill(id.to_string())),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skills in registration order.
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn fallback(&self) -> Option<&Skill> {
        self.fallback.as_deref().and_then(|id| self.get(id))
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// Resolve an input to a skill.
    ///
    /// Without an encoder only the exact tiers run and there is no fallback,
    /// so an unready perception stack degrades to exact matching.
    pub fn retrieve(
        &self,
        input: &str,
        encoder: Option<&HyperEncoder>,
        thresholds: ThresholdConfig,
        bias: Option<&dyn DistanceBias>,
    ) -> Option<&Skill> {
        self.retrieve_match(input, encoder, thresholds, bias)
            .map(|m| m.skill)
    }

    /// [`retrieve`](Self::retrieve), reporting which tier matched.
    pub fn retrieve_match(
        &self,
        input: &str,
        encoder: Option<&HyperEncoder>,
        thresholds: ThresholdConfig,
        bias: Option<&dyn DistanceBias>,
    ) -> Option<SkillMatch<'_>> {
        let normalized = input.trim().to_lowercase();

        if let Some(skill) = self.exact_match(&normalized, |c| c.is_curated()) {
            debug!(skill = skill.id(), "exact library match");
            return Some(SkillMatch {
                skill,
                tier: MatchTier::ExactLibrary,
                distance: None,
            });
        }
        if let Some(skill) = self.exact_match(&normalized, |c| !c.is_curated()) {
            debug!(skill = skill.id(), "exact habit match");
            return Some(SkillMatch {
                skill,
                tier: MatchTier::ExactHabit,
                distance: None,
            });
        }

        let encoder = encoder?;
        let query = encoder.encode_text(input);
        if let Some((skill, distance)) = self.fuzzy_match(&query, thresholds, bias) {
            debug!(skill = skill.id(), distance, "fuzzy match");
            return Some(SkillMatch {
                skill,
                tier: MatchTier::Fuzzy,
                distance: Some(distance),
            });
        }

        let fallback = self.fallback()?;
        debug!(skill = fallback.id(), "no confident match, using fallback");
        Some(SkillMatch {
            skill: fallback,
            tier: MatchTier::Fallback,
            distance: None,
        })
    }

    /// First skill (in registration order) of the selected classes with a
    /// trigger matching `normalized`.
    fn exact_match<F>(&self, normalized: &str, class_filter: F) -> Option<&Skill>
    where
        F: Fn(SkillClass) -> bool,
    {
        if normalized.is_empty() {
            return None;
        }
        self.skills
            .iter()
            .filter(|s| class_filter(s.class()))
            .find(|s| {
                s.trigger_phrases()
                    .iter()
                    .any(|t| trigger_matches(normalized, &t.trim().to_lowercase()))
            })
    }

    /// Closest skill per class under its class threshold; the lower adjusted
    /// distance wins, library on ties.
    fn fuzzy_match(
        &self,
        query: &Hypervector,
        thresholds: ThresholdConfig,
        bias: Option<&dyn DistanceBias>,
    ) -> Option<(&Skill, f64)> {
        let mut best_library: Option<(&Skill, f64)> = None;
        let mut best_habit: Option<(&Skill, f64)> = None;

        for skill in &self.skills {
            let (limit, best) = if skill.class().is_curated() {
                (thresholds.library_threshold, &mut best_library)
            } else {
                (thresholds.habit_threshold, &mut best_habit)
            };

            for trigger in skill.trigger_vectors() {
                let raw = Similarity::hamming(query, trigger) as f64;
                let adjusted = match bias {
                    Some(b) => raw - b.bias(trigger),
                    None => raw,
                };
                if adjusted > limit as f64 {
                    continue;
                }
                if best.map_or(true, |(_, d)| adjusted < d) {
                    *best = Some((skill, adjusted));
                }
            }
        }

        match (best_library, best_habit) {
            (Some(lib), Some(habit)) if habit.1 < lib.1 => Some(habit),
            (Some(lib), _) => Some(lib),
            (None, habit) => habit,
        }
    }

    /// Skill with the single closest trigger vector over the whole index.
    ///
    /// Returns the skill and its raw Hamming distance; earlier skills win ties.
    pub fn nearest_skill(&self, query: &Hypervector) -> Option<(&Skill, u32)> {
        let mut best: Option<(&Skill, u32)> = None;
        for skill in &self.skills {
            if let Some((_, d)) = skill.closest_trigger(query) {
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((skill, d));
                }
            }
        }
        best
    }

    // =========================================================================
    // Learning & performance
    // =========================================================================

    /// Learn to answer `trigger` with `response`.
    ///
    /// If a learned skill already answers with exactly `response`, the
    /// trigger is added to it. If a curated skill does, a learned alias is
    /// created instead, leaving the curated skill untouched, unless the
    /// curated skill already carries the trigger. Otherwise a new
    /// learned skill is created. Returns the id of the skill now holding the
    /// trigger.
    pub fn learn_skill(
        &mut self,
        trigger: &str,
        response: &str,
        encoder: &HyperEncoder,
    ) -> Result<String> {
        let trigger = trigger.trim().to_lowercase();
        if trigger.is_empty() {
            return Err(SentraError::EmptyInput("trigger".to_string()));
        }
        if response.trim().is_empty() {
            return Err(SentraError::EmptyInput("response".to_string()));
        }

        // A learned responder takes precedence over a curated one
        let skills = &self.skills;
        let responders =
            move || skills.iter().filter(move |s| s.response_message() == Some(response));
        let existing = responders()
            .find(|s| !s.class().is_curated())
            .or_else(|| responders().next())
            .map(|s| {
                let known = s.trigger_phrases().contains(&trigger);
                (s.id().to_string(), s.class(), known)
            });

        match existing {
            Some((id, class, known)) if !class.is_curated() => {
                let skill = self.get_mut(&id)?;
                if !known {
                    let mut phrases = skill.trigger_phrases().to_vec();
                    phrases.push(trigger.clone());
                    skill.set_trigger_phrases(phrases, encoder);
                    info!(skill = %id, trigger = %trigger, "merged trigger into existing skill");
                }
                Ok(id)
            }
            Some((id, _, true)) => {
                debug!(skill = %id, trigger = %trigger, "curated skill already knows trigger");
                Ok(id)
            }
            Some((id, _, false)) => {
                let alias = self.create_learned(&trigger, response, encoder)?;
                info!(skill = %alias, aliases = %id, "learned alias for curated skill");
                Ok(alias)
            }
            None => {
                let id = self.create_learned(&trigger, response, encoder)?;
                info!(skill = %id, trigger = %trigger, "learned new skill");
                Ok(id)
            }
        }
    }

    fn create_learned(
        &mut self,
        trigger: &str,
        response: &str,
        encoder: &HyperEncoder,
    ) -> Result<String> {
        let id = self.next_learned_id();
        let skill = Skill::new(id.clone(), SkillClass::Learned, vec![trigger.to_string()], encoder)
            .with_description(format!("Learned response to: \"{}\"", trigger))
            .with_steps(vec![ProgramStep::say(response)]);
        self.register(skill)?;
        Ok(id)
    }

    fn next_learned_id(&self) -> String {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let base = format!("{}{}", LEARNED_PREFIX, stamp);
        if !self.contains(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{}_{}", base, n))
            .find(|id| !self.contains(id))
            .unwrap_or(base)
    }

    /// Replace a skill's triggers, regenerating its whole vector cache.
    pub fn set_triggers(
        &mut self,
        id: &str,
        phrases: Vec<String>,
        encoder: &HyperEncoder,
    ) -> Result<()> {
        self.get_mut(id)?.set_trigger_phrases(phrases, encoder);
        Ok(())
    }

    /// Count one execution of a skill.
    pub fn record_usage(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.performance_mut().usage_count += 1;
        Ok(())
    }

    /// Fold a reward into the skill's moving average. Returns the new average.
    pub fn record_reward(&mut self, id: &str, reward: f64) -> Result<f64> {
        let perf = self.get_mut(id)?.performance_mut();
        perf.record_reward(reward);
        Ok(perf.reward_average)
    }

    /// Forget learned and automated skills used at least `min_uses` times
    /// whose average reward is below `floor`. Returns the removed ids.
    pub fn prune_underperforming(&mut self, min_uses: u64, floor: f64) -> Vec<String> {
        let doomed: Vec<String> = self
            .skills
            .iter()
            .filter(|s| !s.class().is_curated())
            .filter(|s| {
                let p = s.performance();
                p.usage_count >= min_uses && p.reward_average < floor
            })
            .map(|s| s.id().to_string())
            .collect();
        for id in &doomed {
            self.forget(id);
            info!(skill = %id, "pruned underperforming skill");
        }
        doomed
    }

    /// Turn habits used at least `min_uses` times whose average reward is
    /// below `floor` back into plain learned skills. Returns the demoted ids.
    pub fn demote_underperforming(&mut self, min_uses: u64, floor: f64) -> Vec<String> {
        let mut demoted = Vec::new();
        for skill in self.skills.iter_mut() {
            let p = skill.performance();
            if skill.class() == SkillClass::Habit
                && p.usage_count >= min_uses
                && p.reward_average < floor
            {
                skill.set_class(SkillClass::Learned);
                info!(skill = %skill.id(), "demoted underperforming habit");
                demoted.push(skill.id().to_string());
            }
        }
        demoted
    }

    /// Records for every non-curated skill, for the learned store.
    pub fn learned_records(&self) -> Vec<SkillRecord> {
        self.skills
            .iter()
            .filter(|s| !s.class().is_curated())
            .map(SkillRecord::from_skill)
            .collect()
    }
}

/// Word-boundary trigger matching on lower-cased text.
///
/// A multi-word trigger matches anywhere in the input. A single-word trigger
/// must sit on token boundaries, so "hi" matches "oh hi there" but not
/// "this".
pub fn trigger_matches(input: &str, trigger: &str) -> bool {
    if trigger.is_empty() {
        return false;
    }
    if input == trigger {
        return true;
    }
    if trigger.contains(char::is_whitespace) {
        return input.contains(trigger);
    }

    let starts_word = trigger.chars().next().map_or(false, is_word_char);
    let ends_word = trigger.chars().last().map_or(false, is_word_char);
    input.match_indices(trigger).any(|(start, _)| {
        let end = start + trigger.len();
        let before_ok = !starts_word || !input[..start].chars().last().map_or(false, is_word_char);
        let after_ok = !ends_word || !input[end..].chars().next().map_or(false, is_word_char);
        before_ok && after_ok
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
