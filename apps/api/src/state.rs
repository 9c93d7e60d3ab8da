use std::sync::Arc;

use tokio::sync::RwLock;

use crate::anonymization::pseudonym::PseudonymGenerator;
use crate::anonymization::recognizer::EntityRecognizer;
use crate::anonymization::Anonymizer;
use crate::config::Config;
use crate::interview::candidate::CandidateSession;
use crate::interview::cv_questions::CvQuestionGenerator;
use crate::interview::flow::FlowController;
use crate::interview::panel::InterviewConfig;
use crate::llm_client::LlmClient;
use crate::sessions::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Entity recognizer shared by every anonymization session.
    pub recognizer: Arc<dyn EntityRecognizer>,
    pub flow: Arc<FlowController>,
    pub cv_questions: Arc<dyn CvQuestionGenerator>,
    pub anonymization_sessions: SessionRegistry<Anonymizer>,
    pub interviews: SessionRegistry<CandidateSession>,
    /// HR-panel defaults for new interviews.
    pub panel: Arc<RwLock<InterviewConfig>>,
}

impl AppState {
    /// A fresh anonymizer with its own empty entity map.
    pub fn new_anonymizer(&self) -> Anonymizer {
        Anonymizer::new(
            Arc::clone(&self.recognizer),
            PseudonymGenerator::new(self.config.pseudonym_strategy),
            self.config.external_call_timeout,
        )
    }
}
