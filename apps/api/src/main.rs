mod anonymization;
mod config;
mod cv;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod sessions;
mod state;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::anonymization::recognizer::HttpEntityRecognizer;
use crate::config::Config;
use crate::interview::cv_questions::LlmCvQuestionGenerator;
use crate::interview::evaluator::{LlmClarifier, LlmRelevanceEvaluator};
use crate::interview::flow::{FlowController, FlowPolicy};
use crate::interview::panel::InterviewConfig;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("Failed to build the LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize entity recognizer
    let recognizer = HttpEntityRecognizer::new(
        config.ner_endpoint.clone(),
        config.ner_api_token.clone(),
        config.ner_min_score,
        config.external_call_timeout,
    )
    .context("Failed to build the entity recognizer client")?;
    info!(
        "Entity recognizer at {} (min score {}, {} pseudonyms)",
        config.ner_endpoint, config.ner_min_score, config.pseudonym_strategy
    );

    // Interview flow: LLM-backed relevance gate and clarifier
    let policy = FlowPolicy {
        relevance_threshold: config.relevance_threshold,
        max_clarifications: config.max_clarifications,
        call_timeout: config.external_call_timeout,
    };
    let flow = FlowController::new(
        Arc::new(LlmRelevanceEvaluator::new(llm.clone())),
        Arc::new(LlmClarifier::new(llm.clone())),
        policy,
    );
    info!(
        "Relevance threshold {} (clarification cap: {:?})",
        flow.policy().relevance_threshold,
        flow.policy().max_clarifications
    );

    let cv_questions = Arc::new(LlmCvQuestionGenerator::new(llm.clone()));

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        recognizer: Arc::new(recognizer),
        flow: Arc::new(flow),
        cv_questions,
        anonymization_sessions: SessionRegistry::new(),
        interviews: SessionRegistry::new(),
        panel: Arc::new(RwLock::new(InterviewConfig::default())),
    };

    // Abandoned sessions are dropped once they outlive the TTL
    state
        .anonymization_sessions
        .spawn_sweeper(config.session_ttl, "anonymization");
    state.interviews.spawn_sweeper(config.session_ttl, "interview");
    info!("Session TTL {:?}", config.session_ttl);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
