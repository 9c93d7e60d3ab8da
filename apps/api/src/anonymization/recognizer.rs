//! Entity recognition adapter.
//!
//! Detection itself is delegated to an external token-classification model.
//! This module owns the contract the anonymizer relies on: only PERSON,
//! ORGANIZATION and LOCATION spans survive, sub-token fragments and tiny or
//! low-confidence spans are dropped, and the result is deduplicated in
//! first-seen order.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::anonymization::entity::{Entity, EntityCategory};

/// Spans shorter than this (in characters) are discarded.
pub const MIN_ENTITY_CHARS: usize = 3;

/// Word-piece continuation marker emitted by BERT-style tokenizers.
const CONTINUATION_MARKER: &str = "##";

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unparseable recognizer output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Recognizer did not answer within {0:?}")]
    Timeout(Duration),
}

/// Contract consumed by the anonymizer.
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Returns deduplicated sensitive entities found in `text`.
    async fn identify(&self, text: &str) -> Result<Vec<Entity>, RecognitionError>;
}

/// One raw detection as returned by an aggregated NER pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetection {
    #[serde(alias = "entity", alias = "label")]
    pub entity_group: String,
    pub word: String,
    #[serde(default = "full_confidence")]
    pub score: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// Applies the adapter contract to raw model output.
pub fn filter_detections(raw: &[RawDetection], min_score: f32) -> Vec<Entity> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();

    for detection in raw {
        let category = EntityCategory::from_label(&detection.entity_group);
        if !category.is_sensitive() || detection.score < min_score {
            continue;
        }

        let text = detection.word.trim();
        if text.is_empty()
            || text.starts_with(CONTINUATION_MARKER)
            || text.chars().count() < MIN_ENTITY_CHARS
        {
            continue;
        }

        // First-seen category wins for a repeated span.
        if seen.insert(text.to_string()) {
            entities.push(Entity::new(text, category));
        }
    }

    entities
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    aggregation_strategy: &'static str,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: String,
}

/// Recognizer backed by a hosted token-classification endpoint
/// (Hugging Face inference API shape).
#[derive(Clone)]
pub struct HttpEntityRecognizer {
    client: Client,
    endpoint: String,
    api_token: String,
    min_score: f32,
}

impl HttpEntityRecognizer {
    pub fn new(
        endpoint: String,
        api_token: String,
        min_score: f32,
        timeout: Duration,
    ) -> Result<Self, RecognitionError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            api_token,
            min_score,
        })
    }
}

#[async_trait]
impl EntityRecognizer for HttpEntityRecognizer {
    async fn identify(&self, text: &str) -> Result<Vec<Entity>, RecognitionError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&InferenceRequest {
                inputs: text,
                parameters: InferenceParameters {
                    aggregation_strategy: "simple",
                },
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<InferenceError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(RecognitionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: Vec<RawDetection> = serde_json::from_str(&body)?;
        let entities = filter_detections(&raw, self.min_score);
        debug!(
            "Recognizer returned {} detections, {} kept",
            raw.len(),
            entities.len()
        );
        Ok(entities)
    }
}
