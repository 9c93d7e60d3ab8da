use serde_json::Value;
use tracing::{debug, info};

use crate::anonymization::{AnonymizationError, Anonymizer};
use crate::cv::prompts::CV_SEGMENT_PROMPT;
use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PSEUDONYM_INSTRUCTION};
use crate::llm_client::LlmClient;

/// Extracts and cleans the text of a PDF held in memory. Blocking; run it
/// off the async executor.
pub fn extract_pdf_text(pdf: &[u8]) -> Result<String, AppError> {
    let raw = pdf_extract::extract_text_from_mem(pdf)
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read the PDF: {e}")))?;
    let text = clean_text(&raw);
    debug!("Extracted {} chars from a {} byte PDF", text.len(), pdf.len());
    Ok(text)
}

/// Drops control characters and collapses every whitespace run (newlines and
/// page breaks included) into a single space.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Segments a CV into structured JSON. The LLM only ever sees the anonymized
/// text; string values in its output are mapped back to the originals.
pub async fn segment_cv(
    llm: &LlmClient,
    anonymizer: &mut Anonymizer,
    cv_text: &str,
) -> Result<Value, AppError> {
    if cv_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "The CV contains no extractable text".to_string(),
        ));
    }

    let anonymized = anonymizer.anonymize(cv_text).await?;
    let prompt = format!(
        "{}\n\n{}",
        CV_SEGMENT_PROMPT.replace("{cv_text}", &anonymized),
        PSEUDONYM_INSTRUCTION
    );
    let segmented: Value = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("CV segmentation failed: {e}")))?;

    info!(
        "Segmented CV ({} entities pseudonymized)",
        anonymizer.entity_map().len()
    );
    Ok(reveal_json(anonymizer, segmented)?)
}

/// Reverses pseudonyms in every string of a JSON document. Keys are left as
/// they are.
pub fn reveal_json(anonymizer: &Anonymizer, value: Value) -> Result<Value, AnonymizationError> {
    if anonymizer.entity_map().is_empty() {
        return Ok(value);
    }
    Ok(match value {
        Value::String(s) => Value::String(anonymizer.reverse(&s)?),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| reveal_json(anonymizer, item))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| Ok((k, reveal_json(anonymizer, v)?)))
                .collect::<Result<_, AnonymizationError>>()?,
        ),
        other => other,
    })
}
