//! FunctionalMatcher: classify an utterance by what it does.
//!
//! A small nearest-neighbour matcher over labelled exemplar vectors
//! (`greeting`, `question`, `confirmation`, ...). Persisted as a JSON map of
//! category to hex-encoded vectors:
//!
//! ```json
//! {"greeting": ["a1b2...", "..."], "question": ["..."]}
//! ```

use crate::error::Result;
use crate::kernel::{HyperEncoder, Hypervector, Similarity};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Labelled exemplar vectors, scanned in category order.
#[derive(Clone, Debug, Default)]
pub struct FunctionalMatcher {
    categories: Vec<(String, Vec<Hypervector>)>,
}

impl FunctionalMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the hex map. Undecodable vectors are skipped with a warning.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut matcher = Self::new();
        for (category, encoded) in raw {
            let vectors = encoded
                .iter()
                .filter_map(|hex| match Hypervector::from_hex(hex) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(category = %category, error = %e, "skipping functional prototype");
                        None
                    }
                })
                .collect();
            matcher.insert(&category, vectors);
        }
        Ok(matcher)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Build from category → example phrases.
    pub fn from_terms<'a, I, T>(terms: I, encoder: &HyperEncoder) -> Self
    where
        I: IntoIterator<Item = (&'a str, T)>,
        T: IntoIterator<Item = &'a str>,
    {
        let mut matcher = Self::new();
        for (category, phrases) in terms {
            matcher.add_examples(category, phrases, encoder);
        }
        matcher
    }

    /// Encode phrases into a category, creating it if needed. Vectors already
    /// present are not added twice.
    pub fn add_examples<'a, T>(&mut self, category: &str, phrases: T, encoder: &HyperEncoder)
    where
        T: IntoIterator<Item = &'a str>,
    {
        let vectors = phrases.into_iter().map(|p| encoder.encode_text(p)).collect();
        self.insert(category, vectors);
    }

    fn insert(&mut self, category: &str, vectors: Vec<Hypervector>) {
        let slot = match self.categories.iter().position(|(c, _)| c == category) {
            Some(i) => &mut self.categories[i].1,
            None => {
                self.categories.push((category.to_string(), Vec::new()));
                let last = self.categories.len() - 1;
                &mut self.categories[last].1
            }
        };
        for v in vectors {
            if !slot.contains(&v) {
                slot.push(v);
            }
        }
    }

    /// Serialize back to the hex map.
    pub fn to_json(&self) -> Result<String> {
        let map: BTreeMap<&str, Vec<String>> = self
            .categories
            .iter()
            .map(|(c, vs)| (c.as_str(), vs.iter().map(Hypervector::to_hex).collect()))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    /// Nearest category within `max_distance` bits (inclusive).
    ///
    /// Ties go to the category scanned first.
    pub fn classify(&self, vector: &Hypervector, max_distance: u32) -> Option<(&str, u32)> {
        let mut best: Option<(&str, u32)> = None;
        for (category, exemplars) in &self.categories {
            if let Some((_, d)) = Similarity::nearest(vector, exemplars) {
                if d <= max_distance && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((category.as_str(), d));
                }
            }
        }
        debug!(category = ?best.map(|(c, _)| c), "functional classification");
        best
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(c, _)| c.as_str())
    }

    pub fn exemplars(&self, category: &str) -> Option<&[Hypervector]> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, vs)| vs.as_slice())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FunctionalMatcher {
        FunctionalMatcher::from_terms(
            [
                ("greeting", vec!["hello", "hi", "good morning"]),
                ("command", vec!["status", "check", "report"]),
            ],
            &HyperEncoder::new(),
        )
    }

    #[test]
    fn test_classify_exemplar() {
        let enc = HyperEncoder::new();
        let m = matcher();
        assert_eq!(m.classify(&enc.encode_text("status"), 0), Some(("command", 0)));
        assert_eq!(
            m.classify(&enc.encode_text("good mornin"), 64).map(|(c, _)| c),
            Some("greeting")
        );
        assert!(m.classify(&enc.encode_text("the weather is nice today"), 64).is_none());
    }

    #[test]
    fn test_dedup_examples() {
        let enc = HyperEncoder::new();
        let mut m = matcher();
        m.add_examples("greeting", ["hello", "hey"], &enc);
        assert_eq!(m.exemplars("greeting").map(<[_]>::len), Some(4));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn test_json_round_trip_and_bad_hex() {
        let m = matcher();
        let json = m.to_json().expect("serialize");
        let back = FunctionalMatcher::from_json(&json).expect("parse");
        assert_eq!(back.exemplars("command"), m.exemplars("command"));

        let enc = HyperEncoder::new();
        let good = enc.encode_text("yes").to_hex();
        let json = format!(r#"{{"confirmation": ["{}", "zz", "abcd"]}}"#, good);
        let parsed = FunctionalMatcher::from_json(&json).expect("parse");
        assert_eq!(parsed.exemplars("confirmation").map(<[_]>::len), Some(1));
    }
}
