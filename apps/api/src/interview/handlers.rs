//! Axum route handlers for interviews and the HR panel.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::candidate::{CandidateSession, TranscriptEntry};
use crate::interview::cv_questions::questions_from_cv;
use crate::interview::panel::{normalize_list, InterviewConfig};
use crate::interview::report::generate_report;
use crate::interview::session::{FlowStep, InterviewSession, InterviewStatus};
use crate::interview::InterviewError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct StartInterviewRequest {
    /// Overrides the HR-panel questions for this interview.
    pub questions: Option<Vec<String>>,
    /// Raw CV text; questions generated from it follow the fixed ones.
    pub cv_text: Option<String>,
    /// Overrides the HR-panel `ask_from_cv` switch.
    pub ask_from_cv: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    pub criteria: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct InterviewStepResponse {
    pub interview_id: Uuid,
    #[serde(flatten)]
    pub step: FlowStep,
}

#[derive(Debug, Serialize)]
pub struct InterviewSummary {
    pub interview_id: Uuid,
    pub status: InterviewStatus,
    pub current_question_index: usize,
    pub total_questions: usize,
    pub answers_accepted: usize,
    pub answers_unresolved: usize,
    pub clarifications: u32,
    pub last_relevance: Option<u8>,
    pub entities_pseudonymized: usize,
    pub transcript: Vec<TranscriptEntry>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub interview_id: Uuid,
    pub report: String,
}

fn interview_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Interview {id} not found"))
}

/// An empty body means no overrides; anything else must be valid JSON.
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<InterviewStepResponse>), AppError> {
    let req: StartInterviewRequest = optional_json(&body)?;
    let panel = state.panel.read().await.clone();
    let mut questions = match req.questions {
        Some(questions) => normalize_list(questions, "question")?,
        None => panel.questions,
    };

    let mut anonymizer = state.new_anonymizer();
    let cv_text = req.cv_text.as_deref().map(str::trim).filter(|t| !t.is_empty());
    match cv_text {
        Some(cv) if req.ask_from_cv.unwrap_or(panel.ask_from_cv) => {
            let extra = questions_from_cv(
                state.cv_questions.as_ref(),
                &mut anonymizer,
                cv,
                state.config.external_call_timeout,
            )
            .await?;
            questions.extend(extra);
        }
        Some(_) => debug!("CV text sent but CV questions are disabled"),
        None => {}
    }
    let total = questions.len();

    let mut candidate = CandidateSession::new(InterviewSession::new(questions), anonymizer);
    let step = candidate.open()?;
    let interview_id = state.interviews.create(candidate).await;
    info!(
        "Interview {interview_id} started with {total} questions ({} active)",
        state.interviews.len().await
    );

    Ok((
        StatusCode::CREATED,
        Json(InterviewStepResponse { interview_id, step }),
    ))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSummary>, AppError> {
    let handle = state.interviews.get(id).await.ok_or_else(|| interview_not_found(id))?;
    let session = handle.try_lock().map_err(|_| InterviewError::Busy)?;
    let interview = session.interview();

    Ok(Json(InterviewSummary {
        interview_id: id,
        status: interview.status(),
        current_question_index: interview.current_question_index(),
        total_questions: interview.questions().len(),
        answers_accepted: interview.answers().len(),
        answers_unresolved: interview.unresolved().len(),
        clarifications: interview.clarifications(),
        last_relevance: interview.last_relevance(),
        entities_pseudonymized: session.anonymizer().entity_map().len(),
        transcript: session.revealed_transcript()?,
        created_at: session.created_at(),
    }))
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<Json<InterviewStepResponse>, AppError> {
    if req.answer.trim().is_empty() {
        return Err(AppError::Validation("answer must not be empty".to_string()));
    }

    let handle = state.interviews.get(id).await.ok_or_else(|| interview_not_found(id))?;
    // One in-flight submission per interview; a concurrent one is rejected.
    let mut session = handle.try_lock().map_err(|_| InterviewError::Busy)?;
    let step = session.answer(&state.flow, &req.answer).await?;

    Ok(Json(InterviewStepResponse {
        interview_id: id,
        step,
    }))
}

/// POST /api/v1/interviews/:id/report
pub async fn handle_interview_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ReportResponse>, AppError> {
    let req: ReportRequest = optional_json(&body)?;
    let criteria = match req.criteria {
        Some(criteria) => normalize_list(criteria, "criterion")?,
        None => state.panel.read().await.metrics.clone(),
    };

    let handle = state.interviews.get(id).await.ok_or_else(|| interview_not_found(id))?;
    let session = handle.try_lock().map_err(|_| InterviewError::Busy)?;
    let report = generate_report(&state.llm, &session, &criteria).await?;

    Ok(Json(ReportResponse {
        interview_id: id,
        report,
    }))
}

/// DELETE /api/v1/interviews/:id
pub async fn handle_end_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.interviews.remove(id).await {
        return Err(interview_not_found(id));
    }
    info!("Interview {id} discarded");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/hr-panel/config
pub async fn handle_get_panel_config(State(state): State<AppState>) -> Json<InterviewConfig> {
    Json(state.panel.read().await.clone())
}

/// PUT /api/v1/hr-panel/config
pub async fn handle_put_panel_config(
    State(state): State<AppState>,
    Json(config): Json<InterviewConfig>,
) -> Result<Json<InterviewConfig>, AppError> {
    let config = config.normalized()?;
    *state.panel.write().await = config.clone();
    info!(
        "HR panel config updated: {} questions, {} metrics",
        config.questions.len(),
        config.metrics.len()
    );
    Ok(Json(config))
}
