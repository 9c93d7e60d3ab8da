//! Interview questions derived from the candidate's CV.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::anonymization::Anonymizer;
use crate::interview::prompts::{cv_question_prompt, CV_QUESTION_SYSTEM};
use crate::interview::InterviewError;
use crate::llm_client::{LlmClient, LlmError};

/// Upper bound on questions appended from one CV.
pub const MAX_CV_QUESTIONS: usize = 3;

#[derive(Debug, Error)]
pub enum CvQuestionError {
    #[error("CV question call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("CV question generator did not answer within {0:?}")]
    Timeout(Duration),
}

/// Writes HR questions from an already anonymized CV.
#[async_trait]
pub trait CvQuestionGenerator: Send + Sync {
    async fn questions(&self, anonymized_cv: &str) -> Result<Vec<String>, CvQuestionError>;
}

#[derive(Debug, Deserialize)]
struct CvQuestionsOutput {
    #[serde(default)]
    questions: Vec<String>,
}

/// LLM-backed generator.
pub struct LlmCvQuestionGenerator {
    llm: LlmClient,
}

impl LlmCvQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvQuestionGenerator for LlmCvQuestionGenerator {
    async fn questions(&self, anonymized_cv: &str) -> Result<Vec<String>, CvQuestionError> {
        let prompt = cv_question_prompt(anonymized_cv, MAX_CV_QUESTIONS);
        let output: CvQuestionsOutput = self.llm.call_json(&prompt, CV_QUESTION_SYSTEM).await?;
        Ok(output.questions)
    }
}

/// Anonymizes the CV with the candidate's own anonymizer and returns up to
/// [`MAX_CV_QUESTIONS`] non-blank questions in pseudonymized form.
pub async fn questions_from_cv(
    generator: &dyn CvQuestionGenerator,
    anonymizer: &mut Anonymizer,
    cv_text: &str,
    timeout: Duration,
) -> Result<Vec<String>, InterviewError> {
    let anonymized = anonymizer.anonymize(cv_text).await?;

    let raw = match tokio::time::timeout(timeout, generator.questions(&anonymized)).await {
        Ok(result) => result?,
        Err(_) => {
            warn!("CV question generator timed out after {timeout:?}");
            return Err(CvQuestionError::Timeout(timeout).into());
        }
    };

    let questions: Vec<String> = raw
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(MAX_CV_QUESTIONS)
        .collect();
    info!("Generated {} questions from the CV", questions.len());
    Ok(questions)
}
