//! Interview report: the anonymized transcript goes to the LLM, pseudonyms in
//! the returned report are resolved before it leaves the service.

use tracing::info;

use crate::errors::AppError;
use crate::interview::candidate::{CandidateSession, Speaker, TranscriptEntry};
use crate::interview::prompts::{report_prompt, REPORT_SYSTEM};
use crate::llm_client::LlmClient;

pub async fn generate_report(
    llm: &LlmClient,
    session: &CandidateSession,
    criteria: &[String],
) -> Result<String, AppError> {
    if session.interview().answers().is_empty() && session.interview().unresolved().is_empty() {
        return Err(AppError::Validation(
            "The interview has no answers to report on yet".to_string(),
        ));
    }

    let prompt = report_prompt(&format_criteria(criteria), &format_conversation(session.transcript()));
    let report = llm
        .call_text(&prompt, REPORT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Report generation failed: {e}")))?;

    info!(
        "Generated interview report ({} chars, {} criteria)",
        report.len(),
        criteria.len()
    );
    Ok(session.reveal(&report)?)
}

fn format_criteria(criteria: &[String]) -> String {
    criteria
        .iter()
        .map(|c| format!("<b>{}</b>", c.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_conversation(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .map(|entry| {
            let label = match entry.speaker {
                Speaker::Interviewer => "Question",
                Speaker::Candidate => "Answer",
            };
            format!("{label}: {}", entry.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(speaker: Speaker, text: &str) -> TranscriptEntry {
        TranscriptEntry {
            speaker,
            text: text.to_string(),
            at: Utc::now(),
        }
    }

    #[test]
    fn test_conversation_labels_turns() {
        let transcript = vec![
            entry(Speaker::Interviewer, "Why this role?"),
            entry(Speaker::Candidate, "Because Yoda recommended it"),
        ];
        assert_eq!(
            format_conversation(&transcript),
            "Question: Why this role?\n\nAnswer: Because Yoda recommended it"
        );
    }

    #[test]
    fn test_criteria_are_bolded_one_per_line() {
        let criteria = vec!["Relevance".to_string(), " Clarity ".to_string()];
        assert_eq!(format_criteria(&criteria), "<b>Relevance</b>\n<b>Clarity</b>");
    }
}
