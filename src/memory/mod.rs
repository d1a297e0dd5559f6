//! Memory layer: skills, their stores, and retrieval.
//!
//! This module provides:
//!
//! - [`Skill`]: a triggerable program of steps with cached trigger vectors
//!   and running performance statistics.
//!
//! - [`store`]: the JSON codec for the curated and learned skill stores.
//!
//! - [`SkillIndex`]: tiered retrieval (exact library → exact habit → fuzzy
//!   with per-class thresholds → fallback), runtime learning, reward
//!   propagation and pruning.
//!
//! - [`FunctionalMatcher`]: nearest-neighbour classification of utterance
//!   type over labelled exemplar vectors.
//!
//! # Usage
//!
//! ```rust
//! use sentra::config::ThresholdConfig;
//! use sentra::kernel::HyperEncoder;
//! use sentra::memory::{Skill, SkillClass, SkillIndex};
//!
//! let enc = HyperEncoder::new();
//! let mut index = SkillIndex::new();
//! index
//!     .register(Skill::new("skill_greet", SkillClass::Library, vec!["good morning".into()], &enc))
//!     .unwrap();
//!
//! // Exact, then fuzzy
//! let hit = index.retrieve("good morning!", Some(&enc), ThresholdConfig::default(), None);
//! assert_eq!(hit.map(Skill::id), Some("skill_greet"));
//! let typo = index.retrieve("good mornin", Some(&enc), ThresholdConfig::default(), None);
//! assert_eq!(typo.map(Skill::id), Some("skill_greet"));
//! ```

pub mod functional;
pub mod index;
pub mod skill;
pub mod store;

pub use functional::FunctionalMatcher;
pub use index::{
    trigger_matches, DistanceBias, MatchTier, SkillIndex, SkillMatch, DEFAULT_FALLBACK,
    DEMOTE_MIN_USES, DEMOTE_REWARD_FLOOR, PRUNE_MIN_USES, PRUNE_REWARD_FLOOR,
};
pub use skill::{Performance, Primitive, ProgramStep, Skill, SkillClass};
pub use store::{SkillRecord, StoreKind};
