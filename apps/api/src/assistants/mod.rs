//! Assistants capability: file storage, content indexes, analysis agents and
//! conversation runs held by the AI provider.
//!
//! The orchestrator only sees `AnalysisProvider`; `OpenAiAssistants` is the
//! production backend. Carried in `AppState` behind an `Arc<dyn AnalysisProvider>`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::analysis::ingest::IngestedFile;
use crate::llm_client::ProviderError;

pub mod openai;

/// Provider-level access class for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePurpose {
    /// Files read by agents through file search.
    Parsing,
    /// General user data.
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileHandle {
    pub id: String,
    pub purpose: FilePurpose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisAgent {
    pub id: String,
    pub bound_index_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentIndex {
    pub id: String,
    pub file_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
}

/// Everything needed to create an agent for one analysis.
#[derive(Debug, Clone)]
pub struct AgentSpec<'a> {
    pub name: &'a str,
    pub instructions: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }

    /// Queued and running states. Agents here only use file search, so a run
    /// asking for tool output can never make progress and counts as terminal.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRun {
    pub id: String,
    pub status: RunStatus,
    pub conversation_id: String,
    pub agent_id: String,
}

/// The external capabilities one file analysis consumes.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn upload_file(
        &self,
        file: &IngestedFile,
        purpose: FilePurpose,
    ) -> Result<RemoteFileHandle, ProviderError>;

    async fn create_agent(&self, spec: &AgentSpec<'_>) -> Result<AnalysisAgent, ProviderError>;

    async fn create_index(
        &self,
        name: &str,
        file_ids: &[String],
    ) -> Result<ContentIndex, ProviderError>;

    /// Attaches the index to the agent's file-search tool.
    async fn bind_index(
        &self,
        agent: &AnalysisAgent,
        index: &ContentIndex,
    ) -> Result<AnalysisAgent, ProviderError>;

    /// Creates a conversation holding one user message.
    async fn create_conversation(&self, message: &str) -> Result<Conversation, ProviderError>;

    async fn start_run(
        &self,
        conversation: &Conversation,
        agent: &AnalysisAgent,
    ) -> Result<AnalysisRun, ProviderError>;

    async fn get_run(&self, run: &AnalysisRun) -> Result<AnalysisRun, ProviderError>;

    /// Text of the most recent message in the conversation, if any.
    async fn latest_message(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<String>, ProviderError>;

    async fn delete_file(&self, id: &str) -> Result<(), ProviderError>;

    async fn delete_agent(&self, id: &str) -> Result<(), ProviderError>;

    async fn delete_index(&self, id: &str) -> Result<(), ProviderError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), ProviderError>;
}


#[cfg(test)]
pub mod fake;
