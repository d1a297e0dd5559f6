use sentra::config::{RankerConfig, ThresholdConfig};
use sentra::highlevel::{Engine, Resolution};
use sentra::intent::{
    Candidate, ConstantOracle, IntentRanker, OracleError, Provenance, RecentSkills, WorldModel,
};
use sentra::kernel::{Hypervector, Modality, PrototypeBank, Similarity, PROTOTYPE_COUNT};
use sentra::memory::{store, MatchTier, ProgramStep, Skill, SkillClass, SkillIndex};
use sentra::{EngineConfig, HyperEncoder};

const CURATED: &str = r#"{"skills": [
    {"skillID": "skill_greet", "description": "Greets the user", "trigger_intent": ["hello", "good morning"],
     "steps": [{"type": "primitive", "action": "log_output", "params": {"message": "Hello!"}}]},
    {"skillID": "skill_status", "trigger_intent": ["status report"],
     "steps": [{"type": "primitive", "action": "report_status"}]},
    {"skillID": "meta_unknown", "trigger_intent": [],
     "steps": [{"type": "primitive", "action": "log_output", "params": {"message": "I don't know that yet."}}]},
    {"skillID": "skill_broken", "trigger_intent": ["x"], "steps": [{"type": "teleport"}]}
]}"#;

fn unbiased() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.bias.enabled = false;
    config
}

fn greet_only(fallback: bool) -> Engine {
    let mut engine =
        Engine::new(EngineConfig::default()).with_prototype_bank(PrototypeBank::random(2024));
    let enc = *engine.encoder();
    engine
        .register_skill(Skill::new("skill_greet", SkillClass::Library, vec!["hello".into()], &enc))
        .unwrap();
    if fallback {
        engine
            .register_skill(Skill::new("meta_unknown", SkillClass::Library, vec![], &enc))
            .unwrap();
    }
    engine
}

#[test]
fn greet_scenario() {
    let engine = greet_only(false);
    assert_eq!(engine.prototype_bank().map(|b| b.len()), Some(PROTOTYPE_COUNT));

    let exact = engine.retrieve_match("hello").expect("exact");
    assert_eq!((exact.skill.id(), exact.tier), ("skill_greet", MatchTier::ExactLibrary));

    // A one-letter typo lands inside the default library cutoff
    let enc = HyperEncoder::new();
    let typo = Similarity::hamming(&enc.encode_text("hello"), &enc.encode_text("hellp"));
    assert!(typo <= ThresholdConfig::default().library_threshold);
    let fuzzy = engine.retrieve_match("hellp").expect("fuzzy");
    assert_eq!((fuzzy.skill.id(), fuzzy.tier), ("skill_greet", MatchTier::Fuzzy));

    // Tighter than the typo by more than the largest attractor pull
    let mut strict = greet_only(false);
    strict.set_thresholds(ThresholdConfig::new(typo - 6, 40));
    assert!(strict.retrieve("hellp").is_none());

    // Unrelated text: nothing, or the fallback when one is registered
    assert!(engine.retrieve("the weather is nice today").is_none());
    let with_fallback = greet_only(true);
    assert_eq!(
        with_fallback.retrieve("the weather is nice today").map(|s| s.id()),
        Some("meta_unknown")
    );
}

#[test]
fn curated_store_drives_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    let curated = dir.path().join("skills.json");
    let learned = dir.path().join("learned_skills.json");
    std::fs::write(&curated, CURATED).unwrap();

    let mut engine = Engine::new(unbiased()).with_prototype_bank(PrototypeBank::random(1));
    let count = engine.load_skills(&curated, &learned).unwrap();
    assert_eq!(count, 3, "the malformed record is skipped");

    assert_eq!(engine.retrieve("Good morning, Sentra").map(|s| s.id()), Some("skill_greet"));
    assert_eq!(engine.retrieve("good mornin").map(|s| s.id()), Some("skill_greet"));
    assert_eq!(engine.retrieve("quantum chromodynamics").map(|s| s.id()), Some("meta_unknown"));
}

#[test]
fn curated_wins_exact_ties_over_habits() {
    let enc = HyperEncoder::new();
    let mut index = SkillIndex::new();
    index
        .register(Skill::new("learned_status", SkillClass::Learned, vec!["status".into()], &enc))
        .unwrap();
    index
        .register(Skill::new("skill_status", SkillClass::Library, vec!["status".into()], &enc))
        .unwrap();

    let got = index.retrieve("status please", Some(&enc), ThresholdConfig::default(), None);
    assert_eq!(got.map(|s| s.id()), Some("skill_status"));
}

#[test]
fn habits_need_a_closer_fuzzy_match() {
    let enc = HyperEncoder::new();
    let distance = Similarity::hamming(
        &enc.encode_text("good morning"),
        &enc.encode_text("good mornin"),
    );
    let thresholds = ThresholdConfig::new(distance, distance - 1);

    let mut index = SkillIndex::new();
    index
        .register(Skill::new("learned_gm", SkillClass::Learned, vec!["good morning".into()], &enc))
        .unwrap();
    assert!(index.retrieve("good mornin", Some(&enc), thresholds, None).is_none());

    index
        .register(Skill::new("skill_gm", SkillClass::Library, vec!["good morning".into()], &enc))
        .unwrap();
    let got = index.retrieve("good mornin", Some(&enc), thresholds, None);
    assert_eq!(got.map(|s| s.id()), Some("skill_gm"));
}

#[test]
fn irrelevant_reward_cannot_win() {
    let enc = HyperEncoder::new();
    let bank = PrototypeBank::random(5);
    let mut index = SkillIndex::new();
    index
        .register(Skill::new("skill_greet", SkillClass::Library, vec!["hello".into()], &enc))
        .unwrap();

    let trigger = enc.encode_text("hello");
    let far = Candidate {
        vector: Hypervector::from_bytes(trigger.as_bytes().map(|b| !b)),
        provenance: Provenance::Original,
        text: None,
    };
    let near = Candidate {
        vector: trigger,
        ..far.clone()
    };
    let ranker = IntentRanker::new(RankerConfig::default(), 5);
    let generous = |_: &[usize]| -> Result<f64, OracleError> { Ok(1.0e6) };

    let hacked = ranker.rank(&[far.clone()], &index, &bank, &generous, &RecentSkills::new(5));
    assert!(hacked.is_none());

    let best = ranker
        .rank(&[far, near], &index, &bank, &ConstantOracle(0.5), &RecentSkills::new(5))
        .expect("relevant candidate");
    assert_eq!(best.candidate, 1);
    assert_eq!(best.relevance, 1.0);

    let mut engine = greet_only(false);
    let got = engine.resolve("hello", &ConstantOracle(0.5)).expect("resolved");
    assert!(matches!(got, Resolution::Ranked(_)));
    assert_eq!(got.skill().id(), "skill_greet");
}

#[test]
fn world_model_drives_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world_model.json");
    let mut engine = greet_only(true);
    let mut model = WorldModel::load(&path, 31).unwrap();

    let activated = engine.activate(Modality::Text("hello"));
    assert_eq!(activated.len(), 5);
    let before = model.train(&activated, 1.0);
    for _ in 0..50 {
        model.train(&activated, 1.0);
    }
    assert!(model.train(&activated, 1.0) < before);
    model.save(&path).unwrap();

    let reloaded = WorldModel::load(&path, 0).unwrap();
    assert_eq!(reloaded, model);
    let got = engine.resolve("hello", &reloaded).expect("resolved");
    assert_eq!(got.skill().id(), "skill_greet");
}

#[test]
fn learned_skills_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let curated = dir.path().join("skills.json");
    let learned = dir.path().join("learned_skills.json");
    std::fs::write(&curated, CURATED).unwrap();

    let mut engine = Engine::new(unbiased());
    engine.load_skills(&curated, &learned).unwrap();
    let alias = engine.learn("Howdy", "Hello!").unwrap();
    let fresh = engine.learn("what is a quark", "A kind of particle.").unwrap();
    engine.record_execution(&fresh).unwrap();
    engine.reward(&fresh, 1.0).unwrap();
    engine.save_learned(&learned).unwrap();

    let records = store::load_learned(&learned).unwrap();
    assert_eq!(records.len(), 2);

    let mut restarted = Engine::new(unbiased());
    assert_eq!(restarted.load_skills(&curated, &learned).unwrap(), 5);
    assert_eq!(restarted.retrieve("howdy").map(|s| s.id()), Some(alias.as_str()));

    let quark = restarted.skills().get(&fresh).unwrap();
    assert_eq!(quark.class(), SkillClass::Learned);
    assert_eq!(quark.performance().usage_count, 1);
    assert!((quark.performance().reward_average - 0.6).abs() < 1e-12);
    assert_eq!(quark.steps(), &[ProgramStep::say("A kind of particle.")]);
}

#[test]
fn missing_prototypes_degrade_to_exact_matching() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = Engine::new(unbiased());
    assert!(engine.load_prototypes(dir.path().join("vectors.bin")).is_err());
    assert!(!engine.is_ready());

    let enc = *engine.encoder();
    engine
        .register_skill(Skill::new("skill_greet", SkillClass::Library, vec!["hello".into()], &enc))
        .unwrap();
    engine
        .register_skill(Skill::new("meta_unknown", SkillClass::Library, vec![], &enc))
        .unwrap();

    assert_eq!(engine.retrieve("hello there").map(|s| s.id()), Some("skill_greet"));
    assert!(engine.retrieve("hellp").is_none());
    let resolved = engine.resolve("hello", &ConstantOracle(1.0)).expect("exact");
    assert!(matches!(resolved, Resolution::Retrieved(_)));
}

#[test]
fn prototype_blob_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vectors.bin");
    let bank = PrototypeBank::random(77);
    bank.save(&path).unwrap();

    let mut engine = Engine::new(unbiased());
    engine.load_prototypes(&path).unwrap();
    assert!(engine.is_ready());
    assert_eq!(engine.prototype_bank().unwrap().prototypes(), bank.prototypes());

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] = b'X';
    std::fs::write(&path, &bytes).unwrap();
    assert!(engine.load_prototypes(&path).is_err());
    assert!(!engine.is_ready());
}
