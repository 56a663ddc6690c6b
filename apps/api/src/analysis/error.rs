use std::time::Duration;

use thiserror::Error;

use crate::llm_client::ProviderError;

/// Failure of a single analysis, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("could not fetch source file: {0}")]
    Fetch(String),

    #[error("file upload failed: {0}")]
    Upload(#[source] ProviderError),

    #[error("analysis agent creation failed: {0}")]
    AgentCreation(#[source] ProviderError),

    #[error("content index creation failed: {0}")]
    IndexCreation(#[source] ProviderError),

    #[error("binding content index to agent failed: {0}")]
    IndexBinding(#[source] ProviderError),

    #[error("conversation creation failed: {0}")]
    ConversationCreation(#[source] ProviderError),

    #[error("analysis run ended with status '{status}'")]
    RunFailed { status: String },

    #[error("analysis run did not finish within {}s", .0.as_secs())]
    RunTimedOut(Duration),

    #[error("analysis returned an empty response")]
    EmptyResponse,

    #[error("model returned malformed JSON: {snippet}")]
    MalformedResponse { snippet: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// An analysis failure wrapped with the public operation that raised it.
/// Displays as `"<operation>: <cause>"`.
#[derive(Debug, Error)]
#[error("{operation}: {source}")]
pub struct OperationError {
    pub operation: &'static str,
    #[source]
    pub source: AnalysisError,
}

impl OperationError {
    pub fn new(operation: &'static str, source: AnalysisError) -> Self {
        tracing::error!("{operation}: {source}");
        Self { operation, source }
    }
}
