//! Skill: a named, triggerable program of steps.
//!
//! A skill pairs trigger phrases with their cached hypervectors. The vectors
//! are derived data: they are computed from the phrases at construction and
//! regenerated as a whole set whenever the phrases change, so
//! `trigger_vectors().len() == trigger_phrases().len()` always holds.

use crate::kernel::{HyperEncoder, Hypervector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weight of the previous average in reward propagation.
const REWARD_RETENTION: f64 = 0.8;

/// Where a skill came from, which decides its fuzzy-match threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkillClass {
    /// Curated, author-provided
    Library,
    /// Automated sequence promoted from observed behaviour
    Habit,
    /// Acquired at runtime from the user
    Learned,
}

impl SkillClass {
    /// Curated skills use the loose library threshold and win exact ties.
    pub fn is_curated(self) -> bool {
        matches!(self, SkillClass::Library)
    }
}

/// Usage statistics, persisted with the skill record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default = "neutral_reward")]
    pub reward_average: f64,
}

fn neutral_reward() -> f64 {
    0.5
}

impl Default for Performance {
    fn default() -> Self {
        Self {
            usage_count: 0,
            reward_average: neutral_reward(),
        }
    }
}

impl Performance {
    /// Exponential moving average: `0.8 * avg + 0.2 * reward`.
    pub fn record_reward(&mut self, reward: f64) {
        self.reward_average =
            self.reward_average * REWARD_RETENTION + reward * (1.0 - REWARD_RETENTION);
    }
}

/// Closed set of primitive actions a step can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    LogOutput,
    Wait,
    ReportStatus,
    ExtractFact,
    RecallFact,
    SetTopic,
    SetFocus,
    RecallFocus,
    LearnConcept,
    LearnFact,
    ExplainConcept,
    AdjustReward,
    CheckEnvironment,
    SummarizeText,
    CompareConcepts,
    CritiqueResult,
}

/// One step of a skill program.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgramStep {
    /// Run a primitive action with JSON parameters
    Primitive {
        action: Primitive,
        #[serde(default)]
        params: Value,
    },
    /// Call another skill by id
    Skill { name: String },
}

impl ProgramStep {
    /// A `log_output` step printing `message`.
    pub fn say(message: &str) -> Self {
        ProgramStep::Primitive {
            action: Primitive::LogOutput,
            params: serde_json::json!({ "message": message }),
        }
    }

    /// The message of a `log_output` step, if this is one.
    pub fn output_message(&self) -> Option<&str> {
        match self {
            ProgramStep::Primitive {
                action: Primitive::LogOutput,
                params,
            } => params.get("message").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// A registered skill with cached trigger vectors.
#[derive(Clone, Debug)]
pub struct Skill {
    id: String,
    class: SkillClass,
    description: String,
    trigger_phrases: Vec<String>,
    trigger_vectors: Vec<Hypervector>,
    steps: Vec<ProgramStep>,
    parameters: Option<Value>,
    performance: Performance,
}

impl Skill {
    /// Create a skill and encode its triggers.
    pub fn new<S: Into<String>>(
        id: S,
        class: SkillClass,
        trigger_phrases: Vec<String>,
        encoder: &HyperEncoder,
    ) -> Self {
        let trigger_vectors = encode_all(&trigger_phrases, encoder);
        Self {
            id: id.into(),
            class,
            description: String::new(),
            trigger_phrases,
            trigger_vectors,
            steps: Vec::new(),
            parameters: None,
            performance: Performance::default(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_steps(mut self, steps: Vec<ProgramStep>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_parameters(mut self, parameters: Option<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_performance(mut self, performance: Performance) -> Self {
        self.performance = performance;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn class(&self) -> SkillClass {
        self.class
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn trigger_phrases(&self) -> &[String] {
        &self.trigger_phrases
    }

    pub fn trigger_vectors(&self) -> &[Hypervector] {
        &self.trigger_vectors
    }

    pub fn steps(&self) -> &[ProgramStep] {
        &self.steps
    }

    pub fn parameters(&self) -> Option<&Value> {
        self.parameters.as_ref()
    }

    pub fn performance(&self) -> &Performance {
        &self.performance
    }

    pub(crate) fn performance_mut(&mut self) -> &mut Performance {
        &mut self.performance
    }

    pub(crate) fn set_class(&mut self, class: SkillClass) {
        self.class = class;
    }

    /// Replace every trigger phrase and regenerate the whole vector cache.
    pub fn set_trigger_phrases(&mut self, phrases: Vec<String>, encoder: &HyperEncoder) {
        self.trigger_vectors = encode_all(&phrases, encoder);
        self.trigger_phrases = phrases;
    }

    /// Smallest Hamming distance from `query` to any trigger vector, with
    /// the index of that trigger.
    pub fn closest_trigger(&self, query: &Hypervector) -> Option<(usize, u32)> {
        crate::kernel::Similarity::nearest(query, &self.trigger_vectors)
    }

    /// First `log_output` message, used to detect skills that answer alike.
    pub fn response_message(&self) -> Option<&str> {
        self.steps.first().and_then(ProgramStep::output_message)
    }
}

fn encode_all(phrases: &[String], encoder: &HyperEncoder) -> Vec<Hypervector> {
    phrases.iter().map(|p| encoder.encode_text(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vectors_follow_phrases() {
        let enc = HyperEncoder::new();
        let mut skill = Skill::new(
            "skill_greet",
            SkillClass::Library,
            vec!["hello".into(), "hi there".into()],
            &enc,
        );
        assert_eq!(skill.trigger_vectors().len(), 2);
        assert_eq!(skill.trigger_vectors()[0], enc.encode_text("hello"));

        skill.set_trigger_phrases(vec!["good morning".into()], &enc);
        assert_eq!(skill.trigger_phrases().len(), 1);
        assert_eq!(skill.trigger_vectors(), &[enc.encode_text("good morning")]);
    }

    #[test]
    fn test_closest_trigger() {
        let enc = HyperEncoder::new();
        let skill = Skill::new(
            "s",
            SkillClass::Library,
            vec!["weather report".into(), "hello".into()],
            &enc,
        );
        let (idx, dist) = skill
            .closest_trigger(&enc.encode_text("hello"))
            .expect("has triggers");
        assert_eq!((idx, dist), (1, 0));

        let empty = Skill::new("e", SkillClass::Learned, vec![], &enc);
        assert!(empty.closest_trigger(&enc.encode_text("hello")).is_none());
    }

    #[test]
    fn test_reward_moving_average() {
        let mut perf = Performance::default();
        assert_eq!(perf.reward_average, 0.5);
        perf.record_reward(1.0);
        assert!((perf.reward_average - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_step_serde_shape() {
        let step: ProgramStep = serde_json::from_value(json!({
            "type": "primitive",
            "action": "log_output",
            "params": {"message": "Hello!"}
        }))
        .expect("valid step");
        assert_eq!(step.output_message(), Some("Hello!"));
        assert_eq!(step, ProgramStep::say("Hello!"));

        let call: ProgramStep =
            serde_json::from_value(json!({"type": "skill", "name": "skill_greet"}))
                .expect("valid step");
        assert_eq!(
            call,
            ProgramStep::Skill {
                name: "skill_greet".into()
            }
        );
        assert!(call.output_message().is_none());
    }

    #[test]
    fn test_unknown_primitive_is_rejected() {
        let res: Result<ProgramStep, _> = serde_json::from_value(json!({
            "type": "primitive",
            "action": "launch_rockets",
            "params": {}
        }));
        assert!(res.is_err());
    }
}
