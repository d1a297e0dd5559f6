//! Intent layer: resolving ambiguous input.
//!
//! When plain retrieval is not enough, an input is expanded into several
//! [`Candidate`] vectors, each mapped to its nearest skill and scored by
//! relevance times predicted reward:
//!
//! - [`CandidateGenerator`]: deterministic variants first, random tail last
//! - [`RewardOracle`]: the narrow interface to an external reward predictor
//! - [`WorldModel`]: a small perceptron that learns rewards online
//! - [`IntentRanker`]: relevance-weighted scoring with a repetition penalty
//! - [`BiasModulator`]: the attention attractor that shifts fuzzy distances
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use sentra::config::{CandidateConfig, RankerConfig};
//! use sentra::intent::{CandidateGenerator, ConstantOracle, IntentRanker, RecentSkills};
//! use sentra::kernel::{HyperEncoder, PrototypeBank};
//! use sentra::memory::{Skill, SkillClass, SkillIndex};
//!
//! let enc = HyperEncoder::new();
//! let bank = PrototypeBank::random(42);
//! let mut index = SkillIndex::new();
//! index
//!     .register(Skill::new("skill_status", SkillClass::Library, vec!["status report".into()], &enc))
//!     .unwrap();
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//! let candidates = CandidateGenerator::new(enc, &bank, CandidateConfig::default())
//!     .generate("status report please", 7, &mut rng);
//!
//! let ranker = IntentRanker::new(RankerConfig::default(), 5);
//! let best = ranker.rank(&candidates, &index, &bank, &ConstantOracle(0.5), &RecentSkills::new(5));
//! assert_eq!(best.map(|b| b.skill.id()), Some("skill_status"));
//! ```

pub mod bias;
pub mod candidates;
pub mod oracle;
pub mod ranker;
pub mod world_model;

pub use bias::BiasModulator;
pub use candidates::{Candidate, CandidateGenerator, Provenance, TextTransform};
pub use oracle::{ConstantOracle, OracleError, RewardOracle};
pub use ranker::{IntentRanker, RankedIntent, RecentSkills};
pub use world_model::WorldModel;
