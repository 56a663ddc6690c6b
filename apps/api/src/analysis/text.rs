//! Analyses over text the caller already has: a single bullet, or the
//! structured resume from the editor.
//!
//! Pipeline: Sanitizer → Prompt Builder → Text Completion → JSON Extractor.

use serde_json::Value;
use tracing::info;

use crate::analysis::error::{AnalysisError, OperationError};
use crate::analysis::json::{extract_json, validate_shape};
use crate::analysis::prompts::{
    build_ats_prompt, build_bullet_prompt, build_job_match_prompt, ATS_SYSTEM, BULLET_SYSTEM,
    JOB_MATCH_SYSTEM,
};
use crate::analysis::sanitize::collapse_whitespace;
use crate::llm_client::TextCompletion;
use crate::models::analysis::{AtsReport, JobMatchReport};
use crate::models::resume::{ResumeDocument, Style};

const BULLET_TEMPERATURE: f32 = 0.7;
const BULLET_MAX_TOKENS: u32 = 200;
const ANALYSIS_TEMPERATURE: f32 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 2048;

/// Rewrites one resume bullet. Returns the model's text as-is (trimmed).
pub async fn enhance_bullet(
    llm: &dyn TextCompletion,
    text: &str,
    style: Style,
) -> Result<String, OperationError> {
    let prompt = build_bullet_prompt(&collapse_whitespace(text), style);
    llm.complete(BULLET_SYSTEM, &prompt, BULLET_TEMPERATURE, BULLET_MAX_TOKENS)
        .await
        .map_err(|e| OperationError::new("Failed to enhance bullet", e.into()))
}

/// Scores the resume against a job description and suggests section rewrites.
pub async fn job_match(
    llm: &dyn TextCompletion,
    resume: &ResumeDocument,
    job_description: &str,
    style: Style,
) -> Result<Value, OperationError> {
    let prompt = build_job_match_prompt(resume, &collapse_whitespace(job_description), style);
    let result = complete_json(llm, JOB_MATCH_SYSTEM, &prompt)
        .await
        .and_then(validate_shape::<JobMatchReport>)
        .map_err(|e| OperationError::new("Failed to match job description", e))?;

    info!("Job match completed (style: {:?})", style);
    Ok(result)
}

/// Scores the resume's ATS compatibility.
pub async fn ats_score(
    llm: &dyn TextCompletion,
    resume: &ResumeDocument,
) -> Result<Value, OperationError> {
    let prompt = build_ats_prompt(resume);
    let result = complete_json(llm, ATS_SYSTEM, &prompt)
        .await
        .and_then(validate_shape::<AtsReport>)
        .map_err(|e| OperationError::new("Failed to compute ATS score", e))?;

    info!("ATS score computed");
    Ok(result)
}

async fn complete_json(
    llm: &dyn TextCompletion,
    system: &str,
    prompt: &str,
) -> Result<Value, AnalysisError> {
    let text = llm
        .complete(system, prompt, ANALYSIS_TEMPERATURE, ANALYSIS_MAX_TOKENS)
        .await?;
    extract_json(&text)
}
