use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::anonymization::{AnonymizationError, Anonymizer};
use crate::interview::flow::FlowController;
use crate::interview::session::{FlowStep, InterviewSession};
use crate::interview::InterviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Everything one candidate's interview owns: the flow state, the
/// anonymizer guarding their answers, and the anonymized transcript.
pub struct CandidateSession {
    interview: InterviewSession,
    anonymizer: Anonymizer,
    transcript: Vec<TranscriptEntry>,
    created_at: DateTime<Utc>,
}

impl CandidateSession {
    pub fn new(interview: InterviewSession, anonymizer: Anonymizer) -> Self {
        Self {
            interview,
            anonymizer,
            transcript: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn interview(&self) -> &InterviewSession {
        &self.interview
    }

    pub fn anonymizer(&self) -> &Anonymizer {
        &self.anonymizer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Anonymized transcript, as the external collaborators saw it.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Emits the current prompt, logs it and resolves any pseudonyms in it.
    /// Questions taken from an anonymized CV carry pseudonyms.
    pub fn open(&mut self) -> Result<FlowStep, AnonymizationError> {
        let mut step = self.interview.start();
        if let Some(question) = step.question.take() {
            self.log(Speaker::Interviewer, question.clone());
            step.question = Some(self.reveal(&question)?);
        }
        Ok(step)
    }

    /// Anonymizes the raw answer, runs it through the flow controller and
    /// returns the next prompt with pseudonyms resolved for the candidate.
    pub async fn answer(
        &mut self,
        flow: &FlowController,
        raw_answer: &str,
    ) -> Result<FlowStep, InterviewError> {
        self.interview.ensure_accepting()?;

        let answer = self.anonymizer.anonymize(raw_answer).await?;
        let mut step = flow.submit_answer(&mut self.interview, &answer).await?;

        self.log(Speaker::Candidate, answer);
        if let Some(question) = step.question.take() {
            self.log(Speaker::Interviewer, question.clone());
            step.question = Some(self.reveal(&question)?);
        }
        Ok(step)
    }

    /// Transcript with originals restored.
    pub fn revealed_transcript(&self) -> Result<Vec<TranscriptEntry>, AnonymizationError> {
        self.transcript
            .iter()
            .map(|entry| {
                Ok(TranscriptEntry {
                    text: self.reveal(&entry.text)?,
                    ..entry.clone()
                })
            })
            .collect()
    }

    /// Reverses pseudonyms once any exist. Interviewer text may mention
    /// pool-like names on its own, so an empty map is not an error here.
    pub fn reveal(&self, text: &str) -> Result<String, AnonymizationError> {
        if self.anonymizer.entity_map().is_empty() {
            return Ok(text.to_string());
        }
        self.anonymizer.reverse(text)
    }

    fn log(&mut self, speaker: Speaker, text: String) {
        self.transcript.push(TranscriptEntry {
            speaker,
            text,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::anonymization::entity::EntityCategory;
    use crate::anonymization::pseudonym::{PseudonymGenerator, PseudonymStrategy};
    use crate::interview::flow::FlowPolicy;
    use crate::interview::session::{InterviewStatus, PromptKind};
    use crate::testing::{EchoClarifier, FailingRecognizer, ScriptedEvaluator, StaticRecognizer};

    fn flow(scores: &[u8]) -> (Arc<ScriptedEvaluator>, FlowController) {
        let evaluator = Arc::new(ScriptedEvaluator::scores(scores));
        let controller = FlowController::new(
            evaluator.clone(),
            Arc::new(EchoClarifier),
            FlowPolicy {
                relevance_threshold: 6,
                max_clarifications: None,
                call_timeout: Duration::from_secs(5),
            },
        );
        (evaluator, controller)
    }

    fn candidate(questions: &[&str]) -> CandidateSession {
        let recognizer = StaticRecognizer::new(&[
            ("maria lopez", EntityCategory::Person),
            ("globant", EntityCategory::Organization),
        ]);
        CandidateSession::new(
            InterviewSession::new(questions.iter().map(|q| q.to_string()).collect()),
            Anonymizer::new(
                Arc::new(recognizer),
                PseudonymGenerator::with_seed(PseudonymStrategy::Pool, 3),
                Duration::from_secs(5),
            ),
        )
    }

    #[tokio::test]
    async fn test_evaluator_only_sees_anonymized_answer() {
        let (evaluator, flow) = flow(&[9]);
        let mut session = candidate(&["Where did you work?"]);
        session.open().unwrap();

        let step = session
            .answer(&flow, "Maria Lopez led my team at Globant")
            .await
            .unwrap();
        assert_eq!(step.status, InterviewStatus::Completed);

        let (_, seen) = &evaluator.calls()[0];
        assert!(!seen.contains("maria lopez"));
        assert!(!seen.contains("globant"));
        assert!(seen.contains(" led my team at "));
    }

    #[tokio::test]
    async fn test_clarification_is_revealed_for_candidate() {
        let (_, flow) = flow(&[2]);
        let mut session = candidate(&["Tell us about Globant"]);
        session.open().unwrap();

        // The clarifier echoes the question, which the anonymizer never saw,
        // so it comes back unchanged.
        let step = session.answer(&flow, "I worked at Globant").await.unwrap();
        assert_eq!(step.kind, Some(PromptKind::Clarification));
        assert_eq!(step.question.as_deref(), Some("To clarify: Tell us about Globant"));
        assert_eq!(session.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_revealed_transcript_restores_answers() {
        let (_, flow) = flow(&[9]);
        let mut session = candidate(&["Who was your mentor?"]);
        session.open().unwrap();
        session.answer(&flow, "maria lopez").await.unwrap();

        let anonymized = &session.transcript()[1];
        assert_eq!(anonymized.speaker, Speaker::Candidate);
        assert_ne!(anonymized.text, "maria lopez");

        let revealed = session.revealed_transcript().unwrap();
        assert_eq!(revealed[1].text, "maria lopez");
    }

    #[tokio::test]
    async fn test_recognition_failure_does_not_reach_flow() {
        let (evaluator, flow) = flow(&[9]);
        let mut session = CandidateSession::new(
            InterviewSession::new(vec!["Q1".to_string()]),
            Anonymizer::new(
                Arc::new(FailingRecognizer),
                PseudonymGenerator::with_seed(PseudonymStrategy::Pool, 3),
                Duration::from_secs(5),
            ),
        );

        let err = session.answer(&flow, "anything").await.unwrap_err();
        assert!(matches!(err, InterviewError::Anonymization(_)));
        assert!(evaluator.calls().is_empty());
        assert_eq!(session.interview().current_question_index(), 0);
    }

    #[tokio::test]
    async fn test_answer_after_completion_rejected_before_anonymizing() {
        let (_, flow) = flow(&[]);
        let mut session = candidate(&[]);
        assert_eq!(session.open().unwrap().status, InterviewStatus::Completed);

        let err = session.answer(&flow, "late").await.unwrap_err();
        assert!(matches!(err, InterviewError::StateViolation(_)));
        assert!(session.anonymizer().entity_map().is_empty());
    }

    #[tokio::test]
    async fn test_opening_question_is_revealed() {
        let mut anonymizer = Anonymizer::new(
            Arc::new(StaticRecognizer::new(&[("globant", EntityCategory::Organization)])),
            PseudonymGenerator::with_seed(PseudonymStrategy::Pool, 3),
            Duration::from_secs(5),
        );
        let pseudonymized = anonymizer.anonymize("what did you learn at globant?").await.unwrap();
        assert!(!pseudonymized.contains("globant"));

        let mut session =
            CandidateSession::new(InterviewSession::new(vec![pseudonymized.clone()]), anonymizer);
        let step = session.open().unwrap();

        assert_eq!(step.question.as_deref(), Some("what did you learn at globant?"));
        assert_eq!(session.transcript()[0].text, pseudonymized);
    }
}
