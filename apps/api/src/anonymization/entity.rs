use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Semantic type of a detected span. Closed set; `Unknown` covers any label
/// the recognizer emits outside the three sensitive categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Person,
    Organization,
    Location,
    Unknown,
}

impl EntityCategory {
    /// Maps a recognizer label (`PER`, `B-ORG`, `LOCATION`, ...) to a category.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_uppercase();
        let label = label
            .strip_prefix("B-")
            .or_else(|| label.strip_prefix("I-"))
            .unwrap_or(label.as_str());
        match label {
            "PER" | "PERSON" => EntityCategory::Person,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => EntityCategory::Organization,
            "LOC" | "LOCATION" => EntityCategory::Location,
            _ => EntityCategory::Unknown,
        }
    }

    pub fn is_sensitive(self) -> bool {
        !matches!(self, EntityCategory::Unknown)
    }

    /// Prefix used by token-style pseudonyms.
    pub fn token_prefix(self) -> &'static str {
        match self {
            EntityCategory::Person => "person",
            EntityCategory::Organization => "organization",
            EntityCategory::Location => "location",
            EntityCategory::Unknown => "entity",
        }
    }
}

/// A detected span of sensitive text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub category: EntityCategory,
}

impl Entity {
    pub fn new(text: impl Into<String>, category: EntityCategory) -> Self {
        Self {
            text: text.into(),
            category,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MappedEntity {
    pub pseudonym: String,
    pub original: String,
    pub category: EntityCategory,
}

/// Session-scoped pseudonym -> original mapping.
///
/// Grows monotonically. Pseudonyms are unique case-insensitively, and each
/// original maps to exactly one pseudonym, so repeated detections of the same
/// entity reuse their first assignment.
#[derive(Debug, Default, Clone)]
pub struct EntityMap {
    entries: Vec<MappedEntity>,
    by_pseudonym: HashMap<String, usize>,
    by_original: HashMap<String, usize>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MappedEntity] {
        &self.entries
    }

    pub fn pseudonym_for(&self, original: &str) -> Option<&str> {
        self.by_original
            .get(original)
            .map(|&i| self.entries[i].pseudonym.as_str())
    }

    /// Case-insensitive lookup of the original behind a pseudonym.
    pub fn original_for(&self, pseudonym: &str) -> Option<&str> {
        self.by_pseudonym
            .get(&pseudonym.to_lowercase())
            .map(|&i| self.entries[i].original.as_str())
    }

    pub fn is_pseudonym(&self, text: &str) -> bool {
        self.by_pseudonym.contains_key(&text.to_lowercase())
    }

    /// True if `candidate` would clash with an existing pseudonym or original.
    pub fn conflicts_with(&self, candidate: &str) -> bool {
        let lowered = candidate.to_lowercase();
        self.by_pseudonym.contains_key(&lowered)
            || self
                .entries
                .iter()
                .any(|e| e.original.to_lowercase() == lowered)
    }

    /// Records a new assignment. Returns false (and changes nothing) if either
    /// side is already taken.
    pub fn insert(&mut self, pseudonym: String, original: String, category: EntityCategory) -> bool {
        let key = pseudonym.to_lowercase();
        if self.by_pseudonym.contains_key(&key) || self.by_original.contains_key(&original) {
            return false;
        }
        let idx = self.entries.len();
        self.by_pseudonym.insert(key, idx);
        self.by_original.insert(original.clone(), idx);
        self.entries.push(MappedEntity {
            pseudonym,
            original,
            category,
        });
        true
    }

    /// Pseudonym -> original pairs, in a stable order for API responses.
    pub fn to_pairs(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.pseudonym.clone(), e.original.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_variants() {
        assert_eq!(EntityCategory::from_label("PER"), EntityCategory::Person);
        assert_eq!(EntityCategory::from_label("b-org"), EntityCategory::Organization);
        assert_eq!(EntityCategory::from_label("LOCATION"), EntityCategory::Location);
        assert_eq!(EntityCategory::from_label("MISC"), EntityCategory::Unknown);
        assert!(!EntityCategory::Unknown.is_sensitive());
    }

    #[test]
    fn test_insert_rejects_duplicate_pseudonym_case_insensitive() {
        let mut map = EntityMap::new();
        assert!(map.insert("Yoda".into(), "john".into(), EntityCategory::Person));
        assert!(!map.insert("YODA".into(), "mary".into(), EntityCategory::Person));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insert_rejects_second_pseudonym_for_same_original() {
        let mut map = EntityMap::new();
        assert!(map.insert("Yoda".into(), "john".into(), EntityCategory::Person));
        assert!(!map.insert("Shrek".into(), "john".into(), EntityCategory::Person));
        assert_eq!(map.pseudonym_for("john"), Some("Yoda"));
    }

    #[test]
    fn test_original_lookup_ignores_case() {
        let mut map = EntityMap::new();
        map.insert("Hogwarts".into(), "london".into(), EntityCategory::Location);
        assert_eq!(map.original_for("hogwarts"), Some("london"));
        assert!(map.is_pseudonym("HOGWARTS"));
        assert!(map.conflicts_with("London"));
    }
}
