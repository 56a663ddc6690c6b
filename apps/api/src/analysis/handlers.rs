//! Axum route handlers for the analysis API. Each one validates its body and
//! forwards to a text analysis or the file analyzer.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request, State},
    Json,
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::text::{ats_score, enhance_bullet, job_match};
use crate::errors::AppError;
use crate::models::resume::{ResumeDocument, Style};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Body extractor
// ────────────────────────────────────────────────────────────────────────────

/// JSON request body whose failures render as `400 {error}`.
///
/// The content type is not checked, and an empty body reads as `{}` so the
/// handler's own required-field checks produce the error message.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))?
        };

        serde_json::from_value(value)
            .map(JsonBody)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EnhanceBulletRequest {
    pub text: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EnhanceBulletResponse {
    pub result: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchRequest {
    pub style: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchFileRequest {
    pub file_url: Option<String>,
    pub job_description: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub file_url: Option<String>,
}

/// `{success: true, data}` envelope used by the file endpoints.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub data: Value,
}

impl SuccessEnvelope {
    fn ok(data: Value) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Returns the trimmed value, or `None` when absent or blank.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/enhance-bullet
pub async fn handle_enhance_bullet(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<EnhanceBulletRequest>,
) -> Result<Json<EnhanceBulletResponse>, AppError> {
    let text = present(&request.text)
        .ok_or_else(|| AppError::Validation("Text is required".to_string()))?;
    let style = Style::from_flag(request.style.as_deref());

    let result = enhance_bullet(state.llm.as_ref(), text, style).await?;
    Ok(Json(EnhanceBulletResponse { result }))
}

/// POST /api/jd-match
pub async fn handle_jd_match(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JobMatchRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(job_description), Some(resume)) =
        (present(&request.job_description), request.resume.as_ref())
    else {
        return Err(AppError::Validation(
            "Job description and resume are required".to_string(),
        ));
    };

    let resume = ResumeDocument::from_value(resume);
    let style = Style::from_flag(request.style.as_deref());
    let result = job_match(state.llm.as_ref(), &resume, job_description, style).await?;
    Ok(Json(result))
}

/// POST /api/jd-match-file
pub async fn handle_jd_match_file(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<JobMatchFileRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(file_url), Some(job_description)) =
        (present(&request.file_url), present(&request.job_description))
    else {
        return Err(AppError::Validation(
            "File URL and Job Description are required".to_string(),
        ));
    };

    let style = Style::from_flag(request.style.as_deref());
    let result = state
        .analyzer
        .job_matching_from_file(file_url, job_description, style)
        .await?;
    Ok(Json(result))
}

/// POST /api/ats-score
///
/// The whole body is the resume; every field is optional and an empty body
/// is an empty resume.
pub async fn handle_ats_score(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<Value>,
) -> Result<Json<Value>, AppError> {
    let resume = ResumeDocument::from_value(&body);
    let result = ats_score(state.llm.as_ref(), &resume).await?;
    Ok(Json(result))
}

/// POST /api/ats-check-file
pub async fn handle_ats_check_file(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<FileRequest>,
) -> Result<Json<SuccessEnvelope>, AppError> {
    let file_url = present(&request.file_url)
        .ok_or_else(|| AppError::Validation("File URL is required".to_string()))?;

    let data = state.analyzer.check_ats_from_file(file_url).await?;
    Ok(SuccessEnvelope::ok(data))
}

/// POST /api/parse-resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<FileRequest>,
) -> Result<Json<SuccessEnvelope>, AppError> {
    let file_url = present(&request.file_url)
        .ok_or_else(|| AppError::Validation("File URL is required".to_string()))?;

    let data = state.analyzer.parse_resume_from_file(file_url).await?;
    Ok(SuccessEnvelope::ok(data))
}
