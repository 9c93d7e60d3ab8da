use serde::{Deserialize, Serialize};

use crate::interview::InterviewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Question,
    Clarification,
}

/// What the candidate should see next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStep {
    pub status: InterviewStatus,
    pub question: Option<String>,
    pub kind: Option<PromptKind>,
}

impl FlowStep {
    fn question(text: &str) -> Self {
        Self {
            status: InterviewStatus::InProgress,
            question: Some(text.to_string()),
            kind: Some(PromptKind::Question),
        }
    }

    fn clarification(text: String) -> Self {
        Self {
            status: InterviewStatus::InProgress,
            question: Some(text),
            kind: Some(PromptKind::Clarification),
        }
    }

    fn completed() -> Self {
        Self {
            status: InterviewStatus::Completed,
            question: None,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedAnswer {
    pub question_index: usize,
    pub question: String,
    pub answer: String,
    pub relevance: u8,
}

/// State of one candidate's interview.
///
/// The cursor only moves forward and never passes `questions.len()`.
/// `answers` holds exactly the answers that cleared the relevance gate;
/// answers pushed past the gate by a clarification cap go to `unresolved`.
#[derive(Debug, Clone)]
pub struct InterviewSession {
    questions: Vec<String>,
    current_question_index: usize,
    answers: Vec<RecordedAnswer>,
    unresolved: Vec<RecordedAnswer>,
    status: InterviewStatus,
    clarifications: u32,
    last_relevance: Option<u8>,
}

impl InterviewSession {
    pub fn new(questions: Vec<String>) -> Self {
        let status = if questions.is_empty() {
            InterviewStatus::Completed
        } else {
            InterviewStatus::InProgress
        };
        Self {
            questions,
            current_question_index: 0,
            answers: Vec::new(),
            unresolved: Vec::new(),
            status,
            clarifications: 0,
            last_relevance: None,
        }
    }

    /// Emits the question under the cursor, or completion for an empty list.
    pub fn start(&self) -> FlowStep {
        match self.current_question() {
            Some(question) => FlowStep::question(question),
            None => FlowStep::completed(),
        }
    }

    pub fn status(&self) -> InterviewStatus {
        self.status
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_question(&self) -> Option<&str> {
        match self.status {
            InterviewStatus::InProgress => self
                .questions
                .get(self.current_question_index)
                .map(String::as_str),
            InterviewStatus::Completed => None,
        }
    }

    pub fn answers(&self) -> &[RecordedAnswer] {
        &self.answers
    }

    pub fn unresolved(&self) -> &[RecordedAnswer] {
        &self.unresolved
    }

    /// Clarifications issued for the current question so far.
    pub fn clarifications(&self) -> u32 {
        self.clarifications
    }

    pub fn last_relevance(&self) -> Option<u8> {
        self.last_relevance
    }

    /// The question an answer would be submitted against.
    pub fn ensure_accepting(&self) -> Result<&str, InterviewError> {
        self.current_question().ok_or_else(|| {
            InterviewError::StateViolation("the interview is already completed".to_string())
        })
    }

    /// Records an answer that cleared the gate and advances the cursor.
    pub fn accept(&mut self, answer: &str, relevance: u8) -> FlowStep {
        let recorded = self.record(answer, relevance);
        self.answers.push(recorded);
        self.advance()
    }

    /// Keeps the cursor in place and emits a clarification.
    pub fn hold(&mut self, clarification: String, relevance: u8) -> FlowStep {
        self.last_relevance = Some(relevance);
        self.clarifications += 1;
        FlowStep::clarification(clarification)
    }

    /// Advances past the current question without counting the answer as
    /// accepted.
    pub fn force_advance(&mut self, answer: &str, relevance: u8) -> FlowStep {
        let recorded = self.record(answer, relevance);
        self.unresolved.push(recorded);
        self.advance()
    }

    fn record(&mut self, answer: &str, relevance: u8) -> RecordedAnswer {
        self.last_relevance = Some(relevance);
        RecordedAnswer {
            question_index: self.current_question_index,
            question: self.questions[self.current_question_index].clone(),
            answer: answer.to_string(),
            relevance,
        }
    }

    fn advance(&mut self) -> FlowStep {
        self.current_question_index += 1;
        self.clarifications = 0;
        match self.questions.get(self.current_question_index) {
            Some(next) => FlowStep::question(next),
            None => {
                self.status = InterviewStatus::Completed;
                FlowStep::completed()
            }
        }
    }
}
