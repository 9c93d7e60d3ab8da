//! Interview flow: per-candidate question cursor gated on answer relevance.

pub mod candidate;
pub mod cv_questions;
pub mod evaluator;
pub mod flow;
pub mod handlers;
pub mod panel;
pub mod prompts;
pub mod report;
pub mod session;

use thiserror::Error;

use crate::anonymization::AnonymizationError;
use crate::interview::cv_questions::CvQuestionError;
use crate::interview::evaluator::ClarificationError;

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("State violation: {0}")]
    StateViolation(String),

    #[error("Another answer for this interview is still being processed")]
    Busy,

    #[error("Could not anonymize the answer: {0}")]
    Anonymization(#[from] AnonymizationError),

    #[error("Clarification failed: {0}")]
    Clarification(#[from] ClarificationError),

    #[error("Could not derive questions from the CV: {0}")]
    CvQuestions(#[from] CvQuestionError),
}
