use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cv::extract::{extract_pdf_text, segment_cv};
use crate::cv::fit::{evaluate_fit, FitResult};
use crate::errors::AppError;
use crate::state::AppState;

const CV_FIELD: &str = "cv_file";

#[derive(Debug, Serialize)]
pub struct CvExtractResponse {
    pub cv: Value,
}

#[derive(Debug, Deserialize)]
pub struct CvFitRequest {
    pub cv_text: String,
    pub job_description: String,
}

/// POST /api/v1/cv/extract
pub async fn handle_extract_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CvExtractResponse>, AppError> {
    let mut pdf: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(CV_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read '{CV_FIELD}': {e}")))?;
            pdf = Some(data);
        }
    }
    let pdf = pdf
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::Validation(format!("multipart field '{CV_FIELD}' is required")))?;

    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&pdf))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))??;

    // Fresh session: the entity map lives only as long as this request.
    let mut anonymizer = state.new_anonymizer();
    let cv = segment_cv(&state.llm, &mut anonymizer, &text).await?;
    Ok(Json(CvExtractResponse { cv }))
}

/// POST /api/v1/cv/fit
pub async fn handle_cv_fit(
    State(state): State<AppState>,
    Json(req): Json<CvFitRequest>,
) -> Result<Json<FitResult>, AppError> {
    if req.cv_text.trim().is_empty() || req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "cv_text and job_description must not be empty".to_string(),
        ));
    }

    let mut anonymizer = state.new_anonymizer();
    let fit = evaluate_fit(
        &state.llm,
        &mut anonymizer,
        &req.cv_text,
        &req.job_description,
        state.config.cv_fit_threshold,
    )
    .await?;
    Ok(Json(fit))
}
