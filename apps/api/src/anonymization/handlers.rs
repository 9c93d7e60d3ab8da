use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AnonymizeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnonymizeResponse {
    pub pseudonymized_text: String,
    /// Pseudonym to original value, for every entity seen in the session so far.
    pub pseudonymized_entity_dict: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    pub pseudonymized_text: String,
}

#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub original_text: String,
}

fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Anonymization session {id} not found"))
}

/// POST /api/v1/anonymization/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state
        .anonymization_sessions
        .create(state.new_anonymizer())
        .await;
    info!("Anonymization session {session_id} created");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// POST /api/v1/anonymization/sessions/:id/anonymize
pub async fn handle_anonymize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnonymizeRequest>,
) -> Result<Json<AnonymizeResponse>, AppError> {
    let handle = state
        .anonymization_sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let mut anonymizer = handle.lock().await;

    let pseudonymized_text = anonymizer.anonymize(&req.text).await?;

    Ok(Json(AnonymizeResponse {
        pseudonymized_text,
        pseudonymized_entity_dict: anonymizer.entity_map().to_pairs(),
    }))
}

/// POST /api/v1/anonymization/sessions/:id/reverse
pub async fn handle_reverse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReverseRequest>,
) -> Result<Json<ReverseResponse>, AppError> {
    let handle = state
        .anonymization_sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let original_text = handle.lock().await.reverse(&req.pseudonymized_text)?;

    Ok(Json(ReverseResponse { original_text }))
}

/// DELETE /api/v1/anonymization/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.anonymization_sessions.remove(id).await {
        return Err(session_not_found(id));
    }
    info!("Anonymization session {id} discarded");
    Ok(StatusCode::NO_CONTENT)
}
