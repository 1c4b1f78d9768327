/// HTTP adapter for the generation pipeline
///
/// - `POST /generate` submits a JSON generation request
/// - `GET /jobs/:job_id` polls a job
/// - `GET /download/:file_name` streams a finished package
/// - `GET /health` liveness check

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::codegen::types::GenerationRequest;
use crate::error::{DownloadError, FieldError, ValidationError};
use crate::jobs::{GenerationPipeline, JobState, JobStatusResponse};

/// Build the router over a shared pipeline
pub fn router(pipeline: GenerationPipeline) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/jobs/:job_id", get(job_status))
        .route("/download/:file_name", get(download))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(pipeline)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub job_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Submit a generation request; returns as soon as the job is queued
async fn generate(
    State(pipeline): State<GenerationPipeline>,
    body: String,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let request: GenerationRequest = serde_json::from_str(&body).map_err(|e| {
        AppError::Validation(ValidationError::InvalidRequest(vec![FieldError::new(
            "body",
            format!("Invalid JSON: {}", e),
        )]))
    })?;

    let job_id = pipeline.submit(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            success: true,
            job_id: Some(job_id),
            message: "Code generation started. Poll the job for progress.".to_string(),
            errors: Vec::new(),
        }),
    ))
}

async fn job_status(
    State(pipeline): State<GenerationPipeline>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<JobStatusResponse>) {
    let status = pipeline.get_status(&job_id).await;
    let code = if status.status == JobState::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    (code, Json(status))
}

async fn download(
    State(pipeline): State<GenerationPipeline>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = pipeline.download(&file_name).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Health check endpoint (liveness)
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "dalgen-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Error handling

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Download(DownloadError),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e)
    }
}

impl From<DownloadError> for AppError {
    fn from(e: DownloadError) -> Self {
        AppError::Download(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse {
                    success: false,
                    job_id: None,
                    message: e.to_string(),
                    errors: e.field_errors().to_vec(),
                }),
            )
                .into_response(),
            AppError::Download(e) => {
                let status = match &e {
                    DownloadError::InvalidName => StatusCode::BAD_REQUEST,
                    DownloadError::NotFound => StatusCode::NOT_FOUND,
                    DownloadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
            }
        }
    }
}
