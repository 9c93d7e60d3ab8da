pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::anonymization::handlers as anonymization;
use crate::cv::handlers as cv;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Anonymization API
        .route(
            "/api/v1/anonymization/sessions",
            post(anonymization::handle_create_session),
        )
        .route(
            "/api/v1/anonymization/sessions/:id",
            delete(anonymization::handle_delete_session),
        )
        .route(
            "/api/v1/anonymization/sessions/:id/anonymize",
            post(anonymization::handle_anonymize),
        )
        .route(
            "/api/v1/anonymization/sessions/:id/reverse",
            post(anonymization::handle_reverse),
        )
        // Interview API
        .route("/api/v1/interviews", post(interview::handle_start_interview))
        .route(
            "/api/v1/interviews/:id",
            get(interview::handle_get_interview).delete(interview::handle_end_interview),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/report",
            post(interview::handle_interview_report),
        )
        .route(
            "/api/v1/hr-panel/config",
            get(interview::handle_get_panel_config).put(interview::handle_put_panel_config),
        )
        // CV API
        .route("/api/v1/cv/extract", post(cv::handle_extract_cv))
        .route("/api/v1/cv/fit", post(cv::handle_cv_fit))
        .with_state(state)
}
