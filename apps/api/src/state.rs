use std::sync::Arc;

use crate::analysis::orchestrator::FileAnalyzer;
use crate::llm_client::TextCompletion;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-generation capability for bullet, job-match and ATS analyses.
    pub llm: Arc<dyn TextCompletion>,
    /// Drives the file analyses against the assistants capability.
    pub analyzer: Arc<FileAnalyzer>,
}
