use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::anonymization::Anonymizer;
use crate::cv::prompts::CV_FIT_PROMPT;
use crate::errors::AppError;
use crate::interview::evaluator::parse_scale_score;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitResult {
    /// Whether the score reached the configured pass mark.
    pub result: bool,
    pub score: u8,
}

impl FitResult {
    pub fn from_score(score: u8, threshold: u8) -> Self {
        Self {
            result: score >= threshold,
            score,
        }
    }
}

/// Scores how well a CV fits a job description, 1..=10. The CV is
/// anonymized before it reaches the LLM.
pub async fn evaluate_fit(
    llm: &LlmClient,
    anonymizer: &mut Anonymizer,
    cv_text: &str,
    job_description: &str,
    threshold: u8,
) -> Result<FitResult, AppError> {
    let anonymized_cv = anonymizer.anonymize(cv_text).await?;
    let prompt = CV_FIT_PROMPT
        .replace("{job_description}", job_description)
        .replace("{cv_text}", &anonymized_cv);

    let value: Value = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("CV fit evaluation failed: {e}")))?;
    let score = parse_scale_score(&value, "score")
        .map_err(|e| AppError::Llm(format!("CV fit evaluation failed: {e}")))?;

    let fit = FitResult::from_score(score, threshold);
    info!("CV fit score {score}/10 (pass mark {threshold}): {}", fit.result);
    Ok(fit)
}
