//! Axum route handlers for the Analysis API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::models::{AnalysisMethod, AnalysisResult};
use crate::analysis::report::{render_report, report_file_name};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub analysis: AnalysisResult,
    pub method: AnalysisMethod,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Analyses pasted resume text against a job description.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate_inputs(
        &request.resume_text,
        &request.job_description,
        state.config.max_input_bytes,
    )?;

    run_analysis(&state, &request.resume_text, &request.job_description).await
}

/// POST /api/v1/analyze/upload
///
/// Multipart form: `resume` (plain-text file) and `job_description` (text field).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let max_bytes = state.config.max_input_bytes;
    let mut resume_text: Option<String> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body", max_bytes))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                ensure_plain_text(file_name.as_deref(), content_type.as_deref())?;

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Could not read resume file", max_bytes))?;
                info!(
                    "Resume file received: {:?} ({} bytes)",
                    file_name.as_deref().unwrap_or("unnamed"),
                    data.len()
                );
                resume_text = Some(decode_text(data, "resume", max_bytes)?);
            }
            Some("job_description") => {
                let data = field.bytes().await.map_err(|e| {
                    multipart_error(e, "Could not read job description", max_bytes)
                })?;
                job_description = Some(decode_text(data, "job_description", max_bytes)?);
            }
            _ => {}
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::Validation("resume file is required".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;

    validate_inputs(&resume_text, &job_description, max_bytes)?;

    run_analysis(&state, &resume_text, &job_description).await
}

/// POST /api/v1/analyze/report
///
/// Renders a previously returned analysis as a downloadable text report.
pub async fn handle_report(Json(result): Json<AnalysisResult>) -> Result<Response, AppError> {
    for (name, score) in [
        ("matchScore", result.match_score),
        ("atsScore", result.ats_score),
        ("readabilityScore", result.readability_score),
    ] {
        if score > 100 {
            return Err(AppError::Validation(format!(
                "{name} must be between 0 and 100"
            )));
        }
    }

    let today = Utc::now().date_naive();
    let report = render_report(&result, today);
    let disposition = format!("attachment; filename=\"{}\"", report_file_name(today));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(report),
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run_analysis(
    state: &AppState,
    resume_text: &str,
    job_description: &str,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis_id = Uuid::new_v4();
    info!(
        "Analysis {analysis_id} started: resume {} bytes, job description {} bytes",
        resume_text.len(),
        job_description.len()
    );

    let outcome = state.engine.analyze(resume_text, job_description).await?;

    info!(
        "Analysis {analysis_id} finished via {:?}: {}/100",
        outcome.method, outcome.result.match_score
    );

    Ok(Json(AnalyzeResponse {
        analysis_id,
        analysis: outcome.result,
        method: outcome.method,
    }))
}

fn validate_inputs(
    resume_text: &str,
    job_description: &str,
    max_bytes: usize,
) -> Result<(), AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    for (name, text) in [("resume_text", resume_text), ("job_description", job_description)] {
        if text.len() > max_bytes {
            return Err(too_large(name, max_bytes));
        }
    }
    Ok(())
}

fn too_large(name: &str, max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!("{name} exceeds the {} limit", format_size(max_bytes)))
}

fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if bytes >= MB {
        format!("{} MB", bytes / MB)
    } else if bytes >= KB {
        format!("{} KB", bytes / KB)
    } else {
        format!("{bytes} bytes")
    }
}

/// A body cut off by the request size cap is a 413, not a malformed upload.
fn multipart_error(e: MultipartError, context: &str, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large("upload", max_bytes)
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

/// Only plain text is accepted; there is no PDF or Word extraction.
fn ensure_plain_text(file_name: Option<&str>, content_type: Option<&str>) -> Result<(), AppError> {
    let is_txt_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".txt"))
        .unwrap_or(false);
    let is_text_type = content_type
        .map(|t| t.starts_with("text/plain"))
        .unwrap_or(false);

    if is_txt_name || is_text_type {
        Ok(())
    } else {
        Err(AppError::UnsupportedMediaType(format!(
            "Unsupported file type {}. Upload a .txt file or paste the resume text.",
            content_type.unwrap_or("unknown")
        )))
    }
}

fn decode_text(data: Bytes, name: &str, max_bytes: usize) -> Result<String, AppError> {
    if data.len() > max_bytes {
        return Err(too_large(name, max_bytes));
    }
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::Validation(format!("{name} must be UTF-8 text")))
}
