// HTTP route handlers for the Arbiter API

use std::sync::Arc;

use arbiter_common::JudgeRequest;
use arbiter_judge::JudgeError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct LanguageStatus {
    pub id: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// HTTP status for an engine-level failure. User-code failures on the run
/// path (compile/runtime) are not transport errors and answer 200 with an
/// `error` body, matching the judge response contract.
fn failure_status(err: &JudgeError) -> StatusCode {
    match err {
        JudgeError::UnsupportedLanguage(_) => StatusCode::BAD_REQUEST,
        JudgeError::ProblemNotFound(_) => StatusCode::NOT_FOUND,
        JudgeError::ToolchainUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        JudgeError::Compilation(_) | JudgeError::Runtime(_) => StatusCode::OK,
        JudgeError::Workspace(_) | JudgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/submit - Judge a submission against its problem's test cases
pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JudgeRequest>,
) -> impl IntoResponse {
    info!(
        problem_id = payload.problem_id,
        language = %payload.language,
        "Submission received"
    );

    match state.engine.judge(&payload, &state.store, &state.store).await {
        Ok(verdict) => {
            info!(
                problem_id = payload.problem_id,
                status = %verdict.overall_status,
                passed = verdict.passed_count(),
                "Submission judged"
            );
            (StatusCode::OK, Json(verdict)).into_response()
        }
        Err(e) => {
            error!(
                problem_id = payload.problem_id,
                status = %e.status(),
                error = %e,
                "Judging failed before a verdict"
            );
            error_response(failure_status(&e), e.to_string())
        }
    }
}

/// POST /api/run - Execute code once with caller-supplied input
pub async fn run_code(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RunRequest>,
) -> impl IntoResponse {
    match state
        .engine
        .run_custom(&payload.code, &payload.language, &payload.input)
        .await
    {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(e) => {
            info!(language = %payload.language, error = %e, "Run failed");
            error_response(failure_status(&e), e.to_string())
        }
    }
}

/// GET /api/languages - Registry contents with availability probes
pub async fn list_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = state.engine.registry();
    let mut statuses = Vec::new();

    for id in registry.list_languages() {
        let spec = registry.resolve(&id).expect("listed language must resolve");
        let status = match registry.probe(spec).await {
            Ok(()) => LanguageStatus {
                id,
                available: true,
                reason: None,
            },
            Err(reason) => LanguageStatus {
                id,
                available: false,
                reason: Some(reason),
            },
        };
        statuses.push(status);
    }

    (StatusCode::OK, Json(statuses))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
