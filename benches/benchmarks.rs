//! Benchmarks for Sentra operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sentra::config::{CandidateConfig, RankerConfig, ThresholdConfig};
use sentra::intent::{CandidateGenerator, ConstantOracle, IntentRanker, RecentSkills};
use sentra::kernel::{HyperEncoder, Modality, PrototypeBank, Similarity};
use sentra::memory::{Skill, SkillClass, SkillIndex};
use serde_json::json;

// =============================================================================
// Skill library for benchmarking
// =============================================================================

const TRIGGERS: &[&str] = &[
    "hello",
    "good morning",
    "status report",
    "what time is it",
    "tell me a joke",
    "remember this fact",
    "what do you know about",
    "set a reminder",
    "how are you feeling",
    "explain that again",
];

fn bench_index(enc: &HyperEncoder) -> SkillIndex {
    let mut index = SkillIndex::new();
    for (i, trigger) in TRIGGERS.iter().enumerate() {
        let class = if i % 3 == 0 {
            SkillClass::Learned
        } else {
            SkillClass::Library
        };
        index
            .register(Skill::new(format!("skill_{}", i), class, vec![trigger.to_string()], enc))
            .expect("unique ids");
    }
    index
}

fn benchmark_encode_text(c: &mut Criterion) {
    let enc = HyperEncoder::new();

    c.bench_function("encode_text", |b| {
        b.iter(|| enc.encode_text(black_box("could you give me a short status report")))
    });
}

fn benchmark_encode_state(c: &mut Criterion) {
    let enc = HyperEncoder::new();
    let state = json!({"mood": "curious", "energy": 0.7, "topic": {"name": "weather", "turns": 3}});

    c.bench_function("encode_state", |b| {
        b.iter(|| enc.encode(Modality::State(black_box(&state))))
    });
}

fn benchmark_hamming(c: &mut Criterion) {
    let enc = HyperEncoder::new();
    let a = enc.encode_text("hello world");
    let b_vec = enc.encode_text("hello there");

    c.bench_function("hamming", |b| {
        b.iter(|| Similarity::hamming(black_box(&a), black_box(&b_vec)))
    });
}

fn benchmark_k_nearest(c: &mut Criterion) {
    let enc = HyperEncoder::new();
    let bank = PrototypeBank::random(42);
    let query = enc.encode_text("good morning");

    c.bench_function("k_nearest_1024", |b| {
        b.iter(|| bank.activate(black_box(&query), 5))
    });
}

fn benchmark_fuzzy_retrieve(c: &mut Criterion) {
    let enc = HyperEncoder::new();
    let index = bench_index(&enc);

    c.bench_function("retrieve_fuzzy", |b| {
        b.iter(|| {
            index.retrieve(
                black_box("how r you feeling"),
                Some(&enc),
                ThresholdConfig::default(),
                None,
            )
        })
    });
}

fn benchmark_generate_and_rank(c: &mut Criterion) {
    let enc = HyperEncoder::new();
    let bank = PrototypeBank::random(42);
    let index = bench_index(&enc);
    let generator = CandidateGenerator::new(enc, &bank, CandidateConfig::default());
    let ranker = IntentRanker::new(RankerConfig::default(), 5);
    let recent = RecentSkills::new(5);
    let oracle = ConstantOracle(0.5);

    c.bench_function("generate_candidates", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        b.iter(|| generator.generate(black_box("can you tell me the status"), 7, &mut rng))
    });

    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let candidates = generator.generate("can you tell me the status", 7, &mut rng);
    c.bench_function("rank_candidates", |b| {
        b.iter(|| ranker.rank(black_box(&candidates), &index, &bank, &oracle, &recent))
    });
}

criterion_group!(
    benches,
    benchmark_encode_text,
    benchmark_encode_state,
    benchmark_hamming,
    benchmark_k_nearest,
    benchmark_fuzzy_retrieve,
    benchmark_generate_and_rank,
);

criterion_main!(benches);
