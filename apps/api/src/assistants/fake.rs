//! In-memory `AnalysisProvider` that records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::analysis::ingest::IngestedFile;
use crate::assistants::{
    AgentSpec, AnalysisAgent, AnalysisProvider, AnalysisRun, ContentIndex, Conversation,
    FilePurpose, RemoteFileHandle, RunStatus,
};
use crate::llm_client::ProviderError;

#[derive(Default)]
pub struct FakeProvider {
    calls: Mutex<Vec<String>>,
    statuses: Mutex<VecDeque<RunStatus>>,
    reply: Option<String>,
    fail_at: Option<&'static str>,
    fail_deletes: bool,
    instructions: Mutex<Vec<String>>,
}

impl FakeProvider {
    /// A provider whose runs complete on the first poll with `reply`.
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Default::default()
        }
    }

    /// Statuses returned by successive `get_run` calls; `completed` once exhausted.
    pub fn with_statuses(self, statuses: Vec<RunStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    /// Makes the named trait method fail with an API error.
    pub fn failing_at(mut self, method: &'static str) -> Self {
        self.fail_at = Some(method);
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn agent_instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push(call.to_string());
        let method = call.split(':').next().unwrap_or(call);
        let is_delete = method.starts_with("delete_");
        if self.fail_at == Some(method) || (is_delete && self.fail_deletes) {
            return Err(ProviderError::Api {
                status: 500,
                message: format!("{method} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisProvider for FakeProvider {
    async fn upload_file(
        &self,
        _file: &IngestedFile,
        purpose: FilePurpose,
    ) -> Result<RemoteFileHandle, ProviderError> {
        self.record("upload_file")?;
        Ok(RemoteFileHandle {
            id: "file-1".to_string(),
            purpose,
        })
    }

    async fn create_agent(&self, spec: &AgentSpec<'_>) -> Result<AnalysisAgent, ProviderError> {
        self.record("create_agent")?;
        self.instructions
            .lock()
            .unwrap()
            .push(spec.instructions.to_string());
        Ok(AnalysisAgent {
            id: "agent-1".to_string(),
            bound_index_id: None,
        })
    }

    async fn create_index(
        &self,
        _name: &str,
        file_ids: &[String],
    ) -> Result<ContentIndex, ProviderError> {
        self.record("create_index")?;
        Ok(ContentIndex {
            id: "index-1".to_string(),
            file_ids: file_ids.to_vec(),
        })
    }

    async fn bind_index(
        &self,
        agent: &AnalysisAgent,
        index: &ContentIndex,
    ) -> Result<AnalysisAgent, ProviderError> {
        self.record("bind_index")?;
        Ok(AnalysisAgent {
            id: agent.id.clone(),
            bound_index_id: Some(index.id.clone()),
        })
    }

    async fn create_conversation(&self, _message: &str) -> Result<Conversation, ProviderError> {
        self.record("create_conversation")?;
        Ok(Conversation {
            id: "conversation-1".to_string(),
        })
    }

    async fn start_run(
        &self,
        conversation: &Conversation,
        agent: &AnalysisAgent,
    ) -> Result<AnalysisRun, ProviderError> {
        self.record("start_run")?;
        Ok(AnalysisRun {
            id: "run-1".to_string(),
            status: RunStatus::Queued,
            conversation_id: conversation.id.clone(),
            agent_id: agent.id.clone(),
        })
    }

    async fn get_run(&self, run: &AnalysisRun) -> Result<AnalysisRun, ProviderError> {
        self.record("get_run")?;
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RunStatus::Completed);
        Ok(AnalysisRun {
            status,
            ..run.clone()
        })
    }

    async fn latest_message(
        &self,
        _conversation: &Conversation,
    ) -> Result<Option<String>, ProviderError> {
        self.record("latest_message")?;
        Ok(self.reply.clone())
    }

    async fn delete_file(&self, id: &str) -> Result<(), ProviderError> {
        self.record(&format!("delete_file:{id}"))
    }

    async fn delete_agent(&self, id: &str) -> Result<(), ProviderError> {
        self.record(&format!("delete_agent:{id}"))
    }

    async fn delete_index(&self, id: &str) -> Result<(), ProviderError> {
        self.record(&format!("delete_index:{id}"))
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ProviderError> {
        self.record(&format!("delete_conversation:{id}"))
    }
}
