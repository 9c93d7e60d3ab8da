//! Test doubles for the external collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::anonymization::entity::{Entity, EntityCategory};
use crate::anonymization::pseudonym::PseudonymStrategy;
use crate::anonymization::recognizer::{EntityRecognizer, RecognitionError};
use crate::config::Config;
use crate::interview::cv_questions::{CvQuestionError, CvQuestionGenerator};
use crate::interview::evaluator::{
    ClarificationError, ClarificationGenerator, EvaluationError, RelevanceEvaluator,
};
use crate::interview::flow::{FlowController, FlowPolicy};
use crate::interview::panel::InterviewConfig;
use crate::llm_client::LlmClient;
use crate::sessions::SessionRegistry;
use crate::state::AppState;

/// Returns the configured entities that occur in the input text.
pub struct StaticRecognizer {
    entities: Vec<Entity>,
}

impl StaticRecognizer {
    pub fn new(entities: &[(&str, EntityCategory)]) -> Self {
        Self {
            entities: entities
                .iter()
                .map(|(text, category)| Entity::new(*text, *category))
                .collect(),
        }
    }
}

#[async_trait]
impl EntityRecognizer for StaticRecognizer {
    async fn identify(&self, text: &str) -> Result<Vec<Entity>, RecognitionError> {
        Ok(self
            .entities
            .iter()
            .filter(|e| text.contains(&e.text))
            .cloned()
            .collect())
    }
}

pub struct FailingRecognizer;

#[async_trait]
impl EntityRecognizer for FailingRecognizer {
    async fn identify(&self, _text: &str) -> Result<Vec<Entity>, RecognitionError> {
        Err(RecognitionError::Api {
            status: 503,
            message: "model is loading".to_string(),
        })
    }
}

pub struct SlowRecognizer(pub Duration);

#[async_trait]
impl EntityRecognizer for SlowRecognizer {
    async fn identify(&self, _text: &str) -> Result<Vec<Entity>, RecognitionError> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }
}

/// Hands out scripted results in order; once the script runs dry every
/// answer scores 10.
pub struct ScriptedEvaluator {
    script: Mutex<VecDeque<Result<u8, EvaluationError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedEvaluator {
    pub fn new(script: Vec<Result<u8, EvaluationError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn scores(scores: &[u8]) -> Self {
        Self::new(scores.iter().map(|s| Ok(*s)).collect())
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelevanceEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, question: &str, answer: &str) -> Result<u8, EvaluationError> {
        self.calls
            .lock()
            .unwrap()
            .push((question.to_string(), answer.to_string()));
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(10))
    }
}

/// Never answers within any reasonable call timeout.
pub struct SlowEvaluator(pub Duration);

#[async_trait]
impl RelevanceEvaluator for SlowEvaluator {
    async fn evaluate(&self, _question: &str, _answer: &str) -> Result<u8, EvaluationError> {
        tokio::time::sleep(self.0).await;
        Ok(10)
    }
}

/// Clarifies by prefixing the original question.
pub struct EchoClarifier;

#[async_trait]
impl ClarificationGenerator for EchoClarifier {
    async fn rephrase(&self, question: &str, _answer: &str) -> Result<String, ClarificationError> {
        Ok(format!("To clarify: {question}"))
    }
}

pub struct SlowClarifier(pub Duration);

#[async_trait]
impl ClarificationGenerator for SlowClarifier {
    async fn rephrase(&self, question: &str, _answer: &str) -> Result<String, ClarificationError> {
        tokio::time::sleep(self.0).await;
        Ok(format!("Eventually: {question}"))
    }
}

pub struct FailingClarifier;

#[async_trait]
impl ClarificationGenerator for FailingClarifier {
    async fn rephrase(&self, _question: &str, _answer: &str) -> Result<String, ClarificationError> {
        Err(ClarificationError::Empty)
    }
}

/// Returns fixed questions and records the CV text it was shown.
pub struct CannedCvQuestions {
    questions: Vec<String>,
    delay: Option<Duration>,
    seen: Mutex<Vec<String>>,
}

impl CannedCvQuestions {
    pub fn new(questions: &[&str]) -> Self {
        Self {
            questions: questions.iter().map(|q| q.to_string()).collect(),
            delay: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CvQuestionGenerator for CannedCvQuestions {
    async fn questions(&self, anonymized_cv: &str) -> Result<Vec<String>, CvQuestionError> {
        self.seen.lock().unwrap().push(anonymized_cv.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.questions.clone())
    }
}

/// Application state wired to the given fakes. The LLM client is real but
/// never reached by the routes the router tests exercise.
pub fn test_state(
    recognizer: Arc<dyn EntityRecognizer>,
    evaluator: Arc<dyn RelevanceEvaluator>,
    clarifier: Arc<dyn ClarificationGenerator>,
) -> AppState {
    test_state_with_cv(
        recognizer,
        evaluator,
        clarifier,
        Arc::new(CannedCvQuestions::new(&[])),
    )
}

pub fn test_state_with_cv(
    recognizer: Arc<dyn EntityRecognizer>,
    evaluator: Arc<dyn RelevanceEvaluator>,
    clarifier: Arc<dyn ClarificationGenerator>,
    cv_questions: Arc<dyn CvQuestionGenerator>,
) -> AppState {
    let config = Config {
        anthropic_api_key: "test-key".to_string(),
        ner_api_token: "test-token".to_string(),
        ner_endpoint: "http://127.0.0.1:9/ner".to_string(),
        ner_min_score: 0.5,
        pseudonym_strategy: PseudonymStrategy::Pool,
        relevance_threshold: 6,
        max_clarifications: None,
        external_call_timeout: Duration::from_secs(5),
        cv_fit_threshold: 5,
        session_ttl: Duration::from_secs(3600),
        port: 0,
        rust_log: "debug".to_string(),
    };
    let flow = FlowController::new(
        evaluator,
        clarifier,
        FlowPolicy {
            relevance_threshold: config.relevance_threshold,
            max_clarifications: config.max_clarifications,
            call_timeout: config.external_call_timeout,
        },
    );

    AppState {
        llm: LlmClient::new(config.anthropic_api_key.clone()).unwrap(),
        config,
        recognizer,
        flow: Arc::new(flow),
        cv_questions,
        anonymization_sessions: SessionRegistry::new(),
        interviews: SessionRegistry::new(),
        panel: Arc::new(RwLock::new(InterviewConfig::default())),
    }
}
