//! Relevance evaluation and clarification collaborators.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::interview::prompts::{
    CLARIFICATION_PROMPT, CLARIFICATION_SYSTEM, RELEVANCE_PROMPT, RELEVANCE_SYSTEM,
};
use crate::llm_client::prompts::PSEUDONYM_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};

/// Lowest band of the 1..=10 relevance scale. Failed or malformed
/// evaluations are scored with it.
pub const LOWEST_RELEVANCE: u8 = 1;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Evaluator call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed evaluation: {0}")]
    Malformed(String),

    #[error("Score {0} is outside 1..=10")]
    OutOfRange(f64),

    #[error("Evaluator did not answer within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ClarificationError {
    #[error("Clarification call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Clarification was empty")]
    Empty,

    #[error("Clarifier did not answer within {0:?}")]
    Timeout(Duration),
}

/// Scores how directly an answer addresses a question, 1..=10.
#[async_trait]
pub trait RelevanceEvaluator: Send + Sync {
    async fn evaluate(&self, question: &str, answer: &str) -> Result<u8, EvaluationError>;
}

/// Produces a rephrased or clarifying version of a question.
#[async_trait]
pub trait ClarificationGenerator: Send + Sync {
    async fn rephrase(&self, question: &str, answer: &str) -> Result<String, ClarificationError>;
}

/// Reads a 1..=10 score stored under `key` (matched case-insensitively).
/// Integers, floats (rounded) and numeric strings are accepted.
pub fn parse_scale_score(value: &Value, key: &str) -> Result<u8, EvaluationError> {
    let object = value
        .as_object()
        .ok_or_else(|| EvaluationError::Malformed(format!("expected a JSON object, got {value}")))?;

    let raw = object
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
        .ok_or_else(|| EvaluationError::Malformed(format!("missing '{key}' field")))?;

    let score = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| EvaluationError::Malformed(format!("'{key}' is not numeric: {raw}")))?;

    let rounded = score.round();
    if !(1.0..=10.0).contains(&rounded) {
        return Err(EvaluationError::OutOfRange(score));
    }
    Ok(rounded as u8)
}

/// LLM-backed relevance scorer.
pub struct LlmRelevanceEvaluator {
    llm: LlmClient,
}

impl LlmRelevanceEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RelevanceEvaluator for LlmRelevanceEvaluator {
    async fn evaluate(&self, question: &str, answer: &str) -> Result<u8, EvaluationError> {
        let prompt = RELEVANCE_PROMPT
            .replace("{question}", question)
            .replace("{answer}", answer);
        let value: Value = self.llm.call_json(&prompt, RELEVANCE_SYSTEM).await?;
        parse_scale_score(&value, "relevance")
    }
}

/// LLM-backed clarifier.
pub struct LlmClarifier {
    llm: LlmClient,
}

impl LlmClarifier {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ClarificationGenerator for LlmClarifier {
    async fn rephrase(&self, question: &str, answer: &str) -> Result<String, ClarificationError> {
        let prompt = format!(
            "{}\n\n{}",
            CLARIFICATION_PROMPT
                .replace("{question}", question)
                .replace("{answer}", answer),
            PSEUDONYM_INSTRUCTION
        );
        let text = self.llm.call_text(&prompt, CLARIFICATION_SYSTEM).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ClarificationError::Empty);
        }
        Ok(text.to_string())
    }
}
