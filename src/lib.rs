//! # Sentra: a hyperdimensional agent core
//!
//! Sentra maps free-form input to named skills using 256-bit binary
//! hypervectors. Text is encoded deterministically with hashed trigrams,
//! compared by Hamming distance, and resolved to a skill through exact,
//! fuzzy and reward-ranked matching.
//!
//! ## Quick Start
//!
//! ```rust
//! use sentra::highlevel::Engine;
//! use sentra::intent::ConstantOracle;
//! use sentra::kernel::PrototypeBank;
//! use sentra::memory::{ProgramStep, Skill, SkillClass};
//! use sentra::EngineConfig;
//!
//! let mut engine = Engine::new(EngineConfig::default())
//!     .with_prototype_bank(PrototypeBank::random(42));
//!
//! let greet = Skill::new("skill_greet", SkillClass::Library, vec!["good morning".into()], engine.encoder())
//!     .with_steps(vec![ProgramStep::say("Morning!")]);
//! engine.register_skill(greet).unwrap();
//!
//! // Exact and fuzzy retrieval
//! assert_eq!(engine.retrieve("good morning").map(|s| s.id()), Some("skill_greet"));
//! assert_eq!(engine.retrieve("good mornin").map(|s| s.id()), Some("skill_greet"));
//!
//! // Candidate ranking against a reward oracle
//! let resolved = engine.resolve("good morning", &ConstantOracle(0.5)).unwrap();
//! assert_eq!(resolved.skill().id(), "skill_greet");
//! ```
//!
//! ## Layers
//!
//! - [`kernel`]: hypervectors, encoding, similarity, prototype bank
//! - [`memory`]: skills, skill stores, tiered retrieval
//! - [`intent`]: candidate generation, reward-weighted ranking, a learned
//!   world model, attention bias
//! - [`highlevel`]: the [`Engine`](highlevel::Engine) facade
//!
//! ## Core Concepts
//!
//! - **Hypervector**: 256 bits, compared by Hamming distance
//! - **Prototype**: one of 1024 fixed reference vectors; the nearest few form
//!   an input's sparse activation
//! - **Library vs. habit**: curated skills match fuzzily within a loose
//!   threshold, learned ones only within a tight one
//! - **Relevance × reward**: ranked intents need both similarity and payoff

pub mod config;
pub mod error;
pub mod highlevel;
pub mod intent;
pub mod kernel;
pub mod memory;

// Re-exports for convenience
pub use config::EngineConfig;
pub use error::{Result, SentraError};
pub use highlevel::Engine;
pub use kernel::{HyperEncoder, Hypervector, PrototypeBank, Similarity};
pub use memory::{Skill, SkillIndex};
