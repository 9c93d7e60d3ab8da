//! Reversible anonymization.
//!
//! `anonymize` lower-cases its input, asks the recognizer for sensitive spans
//! and swaps each for a session-stable pseudonym. `reverse` puts the originals
//! back into any later text in which the pseudonyms survive verbatim, for
//! example JSON an LLM produced from the anonymized text.
//!
//! Lower-casing is a deliberate normalization: the uncased recognizer and the
//! case-insensitive reversal both depend on it. Original capitalization is
//! lost, and reversed text carries the lower-cased originals.

pub mod entity;
pub mod handlers;
pub mod pseudonym;
pub mod recognizer;
pub mod substitution;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::anonymization::entity::{Entity, EntityMap};
use crate::anonymization::pseudonym::{looks_like_pseudonym, PseudonymGenerator};
use crate::anonymization::recognizer::{EntityRecognizer, RecognitionError};

#[derive(Debug, Error)]
pub enum AnonymizationError {
    #[error("Entity recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("State violation: {0}")]
    StateViolation(String),

    #[error("No unique pseudonym available for a {0:?} entity")]
    SubstitutionAmbiguity(entity::EntityCategory),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// One anonymization session: owns its entity map and pseudonym source.
pub struct Anonymizer {
    recognizer: Arc<dyn EntityRecognizer>,
    generator: PseudonymGenerator,
    map: EntityMap,
    call_timeout: Duration,
}

impl Anonymizer {
    pub fn new(
        recognizer: Arc<dyn EntityRecognizer>,
        generator: PseudonymGenerator,
        call_timeout: Duration,
    ) -> Self {
        Self {
            recognizer,
            generator,
            map: EntityMap::new(),
            call_timeout,
        }
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.map
    }

    /// Replaces every detected sensitive span in `text` with its pseudonym.
    /// Recognition failures propagate; nothing is returned half-anonymized.
    pub async fn anonymize(&mut self, text: &str) -> Result<String, AnonymizationError> {
        let normalized = text.to_lowercase();

        let detected = tokio::time::timeout(self.call_timeout, self.recognizer.identify(&normalized))
            .await
            .map_err(|_| RecognitionError::Timeout(self.call_timeout))??;

        debug!(
            "Anonymizing text: {} entities detected, {} already mapped",
            detected.len(),
            self.map.len()
        );
        self.substitute(&normalized, detected)
    }

    /// Substitution step of `anonymize`, on already-normalized text.
    fn substitute(
        &mut self,
        normalized: &str,
        detected: Vec<Entity>,
    ) -> Result<String, AnonymizationError> {
        let mut seen = HashSet::new();
        let mut entities: Vec<Entity> = detected
            .into_iter()
            .map(|e| Entity::new(e.text.to_lowercase(), e.category))
            .filter(|e| !e.text.is_empty() && normalized.contains(&e.text))
            .filter(|e| !self.map.is_pseudonym(&e.text))
            .filter(|e| seen.insert(e.text.clone()))
            .collect();

        // Longest first, so "new york" is consumed before "york" can match inside it.
        entities.sort_by_key(|e| std::cmp::Reverse(e.char_len()));

        let mut replacements: HashMap<String, String> = HashMap::new();
        for entity in &entities {
            let pseudonym = match self.map.pseudonym_for(&entity.text) {
                Some(existing) => existing.to_string(),
                None => self.assign(entity, normalized)?,
            };
            replacements.insert(entity.text.clone(), pseudonym);
        }

        // Pseudonyms already in the text map to themselves, which shields them
        // from being rewritten by a shorter entity that happens to sit inside.
        for mapped in self.map.entries() {
            replacements
                .entry(mapped.pseudonym.to_lowercase())
                .or_insert_with(|| mapped.pseudonym.clone());
        }

        let mut terms: Vec<&str> = replacements.keys().map(String::as_str).collect();
        terms.sort_unstable();
        substitution::longest_first(&mut terms);

        let Some(matcher) = substitution::alternation(terms, false)? else {
            return Ok(normalized.to_string());
        };

        Ok(substitution::replace_terms(normalized, &matcher, |m| {
            replacements.get(m).map(String::as_str)
        }))
    }

    fn assign(&mut self, entity: &Entity, text: &str) -> Result<String, AnonymizationError> {
        let map = &self.map;
        let pseudonym = self
            .generator
            .generate(entity.category, |candidate| {
                map.conflicts_with(candidate) || text.contains(&candidate.to_lowercase())
            })
            .ok_or(AnonymizationError::SubstitutionAmbiguity(entity.category))?;

        // Unreachable while `conflicts_with` rejects every clash.
        if !self
            .map
            .insert(pseudonym.clone(), entity.text.clone(), entity.category)
        {
            return Err(AnonymizationError::SubstitutionAmbiguity(entity.category));
        }
        Ok(pseudonym)
    }

    /// Restores original values for every session pseudonym found in `text`.
    pub fn reverse(&self, text: &str) -> Result<String, AnonymizationError> {
        if self.map.is_empty() {
            if looks_like_pseudonym(text)? {
                return Err(AnonymizationError::StateViolation(
                    "text contains pseudonyms but this session has no entity map".to_string(),
                ));
            }
            return Ok(text.to_string());
        }

        let mut pseudonyms: Vec<&str> = self
            .map
            .entries()
            .iter()
            .map(|e| e.pseudonym.as_str())
            .collect();
        substitution::longest_first(&mut pseudonyms);

        let Some(matcher) = substitution::alternation(pseudonyms, true)? else {
            return Ok(text.to_string());
        };

        Ok(substitution::replace_terms(text, &matcher, |m| {
            self.map.original_for(m)
        }))
    }
}
