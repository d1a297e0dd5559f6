//! Skill store: JSON records for curated and learned skills.
//!
//! Two stores exist. The curated library is an object with a `skills` array
//! and is only read; the learned store is a bare array and is rewritten when
//! skills are learned, rewarded or pruned.
//!
//! ```json
//! {"skills": [{
//!     "skillID": "skill_greet",
//!     "description": "Greets the user",
//!     "trigger_intent": ["hello", "hi"],
//!     "steps": [{"type": "primitive", "action": "log_output", "params": {"message": "Hello!"}}]
//! }]}
//! ```
//!
//! Loading is entry-tolerant: a malformed record is logged and skipped, and
//! the rest of the store still loads.

use super::skill::{Performance, ProgramStep, Skill, SkillClass};
use crate::error::Result;
use crate::kernel::HyperEncoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Id prefix of skills acquired at runtime.
pub const LEARNED_PREFIX: &str = "learned_";

/// Which store a record came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Curated,
    Learned,
}

/// One persisted skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    #[serde(rename = "skillID")]
    pub skill_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_intent: Vec<String>,
    #[serde(default)]
    pub steps: Vec<ProgramStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_automated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
}

impl SkillRecord {
    /// Class implied by the record and the store it was read from.
    pub fn class(&self, kind: StoreKind) -> SkillClass {
        if self.is_automated {
            SkillClass::Habit
        } else if kind == StoreKind::Learned || self.skill_id.starts_with(LEARNED_PREFIX) {
            SkillClass::Learned
        } else {
            SkillClass::Library
        }
    }

    /// Build the in-memory skill, encoding its triggers.
    pub fn into_skill(self, kind: StoreKind, encoder: &HyperEncoder) -> Skill {
        let class = self.class(kind);
        Skill::new(self.skill_id, class, self.trigger_intent, encoder)
            .with_description(self.description)
            .with_steps(self.steps)
            .with_parameters(self.parameters)
            .with_performance(self.performance.unwrap_or_default())
    }

    /// Snapshot a skill for persistence. Cached vectors are never written.
    pub fn from_skill(skill: &Skill) -> Self {
        Self {
            skill_id: skill.id().to_string(),
            description: skill.description().to_string(),
            trigger_intent: skill.trigger_phrases().to_vec(),
            steps: skill.steps().to_vec(),
            parameters: skill.parameters().cloned(),
            is_automated: skill.class() == SkillClass::Habit,
            performance: Some(*skill.performance()),
        }
    }
}

/// Parse the curated store: `{"skills": [...]}`.
pub fn parse_curated(json: &str) -> Result<Vec<SkillRecord>> {
    let root: Value = serde_json::from_str(json)?;
    let entries = match root {
        Value::Object(mut obj) => match obj.remove("skills") {
            Some(Value::Array(entries)) => entries,
            _ => {
                warn!("curated skill store has no `skills` array");
                Vec::new()
            }
        },
        Value::Array(entries) => entries,
        _ => {
            warn!("curated skill store is neither an object nor an array");
            Vec::new()
        }
    };
    Ok(parse_entries(entries))
}

/// Parse the learned store: a bare array of records.
pub fn parse_learned(json: &str) -> Result<Vec<SkillRecord>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(entries) => Ok(parse_entries(entries)),
        _ => {
            warn!("learned skill store is not an array");
            Ok(Vec::new())
        }
    }
}

fn parse_entries(entries: Vec<Value>) -> Vec<SkillRecord> {
    let total = entries.len();
    let records: Vec<SkillRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value::<SkillRecord>(entry) {
            Ok(record) if record.skill_id.trim().is_empty() => {
                warn!(entry = i, "skipping skill record with empty id");
                None
            }
            Ok(record) => Some(record),
            Err(e) => {
                warn!(entry = i, error = %e, "skipping malformed skill record");
                None
            }
        })
        .collect();
    if records.len() < total {
        info!(loaded = records.len(), skipped = total - records.len(), "parsed skill store");
    }
    records
}

/// Read the curated store from disk.
pub fn load_curated<P: AsRef<Path>>(path: P) -> Result<Vec<SkillRecord>> {
    parse_curated(&std::fs::read_to_string(path)?)
}

/// Read the learned store from disk. A missing file is an empty store.
pub fn load_learned<P: AsRef<Path>>(path: P) -> Result<Vec<SkillRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    parse_learned(&std::fs::read_to_string(path)?)
}

/// Write learned records as a pretty-printed array.
pub fn save_learned<P: AsRef<Path>>(path: P, records: &[SkillRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}
