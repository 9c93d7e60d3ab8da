use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::anonymization::AnonymizationError;
use crate::interview::InterviewError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("State violation: {0}")]
    StateViolation(String),

    #[error("Session busy")]
    SessionBusy,

    #[error("Entity recognition error: {0}")]
    Recognition(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnonymizationError> for AppError {
    fn from(err: AnonymizationError) -> Self {
        match err {
            AnonymizationError::Recognition(e) => AppError::Recognition(e.to_string()),
            AnonymizationError::StateViolation(msg) => AppError::StateViolation(msg),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<InterviewError> for AppError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::StateViolation(msg) => AppError::StateViolation(msg),
            InterviewError::Busy => AppError::SessionBusy,
            InterviewError::Anonymization(e) => e.into(),
            InterviewError::Clarification(e) => AppError::Llm(e.to_string()),
            InterviewError::CvQuestions(e) => AppError::Llm(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::StateViolation(msg) => {
                (StatusCode::CONFLICT, "STATE_VIOLATION", msg.clone())
            }
            AppError::SessionBusy => (
                StatusCode::CONFLICT,
                "SESSION_BUSY",
                "Another request for this session is still being processed".to_string(),
            ),
            AppError::Recognition(msg) => {
                tracing::error!("Entity recognition error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RECOGNITION_ERROR",
                    "Entity recognition failed; no text was anonymized".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::recognizer::RecognitionError;

    #[test]
    fn test_recognition_failure_maps_to_bad_gateway() {
        let err: AppError = AnonymizationError::Recognition(RecognitionError::Api {
            status: 503,
            message: "loading".to_string(),
        })
        .into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_state_violation_maps_to_conflict() {
        let err: AppError = InterviewError::StateViolation("done".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
        let busy: AppError = InterviewError::Busy.into();
        assert_eq!(busy.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
