//! File-Analysis Orchestrator.
//!
//! One analysis walks a fixed lifecycle against the provider:
//!
//! ```text
//! Uploading → AgentCreating → IndexCreating → IndexBinding → ConversationCreating
//!   → Running → Polling → Fetching → CleaningUp → Done
//! ```
//!
//! Any step may fail. Every remote resource is registered on a `CleanupStack`
//! as soon as it exists, and the stack is unwound on every exit path before the
//! result (or error) is returned. Nothing is shared between invocations: each
//! call allocates its own file, agent, index and conversation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::cleanup::{CleanupStack, RemoteResource};
use crate::analysis::error::{AnalysisError, OperationError};
use crate::analysis::ingest::{FileIngestor, IngestedFile};
use crate::analysis::json::{extract_json, validate_shape};
use crate::analysis::prompts::{
    build_ats_file_instructions, build_job_match_file_instructions, ATS_FILE_MESSAGE,
    JOB_MATCH_FILE_MESSAGE, RESUME_EXTRACTION_INSTRUCTIONS, RESUME_EXTRACTION_MESSAGE,
};
use crate::assistants::{AgentSpec, AnalysisProvider, AnalysisRun, FilePurpose, RunStatus};
use crate::models::analysis::{AtsReport, JobMatchReport, ParsedResume};
use crate::models::resume::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Uploading,
    AgentCreating,
    IndexCreating,
    IndexBinding,
    ConversationCreating,
    Running,
    Polling,
    Fetching,
    CleaningUp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Uploading => "uploading",
            Stage::AgentCreating => "agent-creating",
            Stage::IndexCreating => "index-creating",
            Stage::IndexBinding => "index-binding",
            Stage::ConversationCreating => "conversation-creating",
            Stage::Running => "running",
            Stage::Polling => "polling",
            Stage::Fetching => "fetching",
            Stage::CleaningUp => "cleaning-up",
        };
        f.write_str(name)
    }
}

/// How often, and for how long, a run is polled before giving up.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

/// The three file analyses. Each picks its own instructions, upload purpose
/// and expected result shape.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisTask {
    ParseResume,
    AtsCheck,
    JobMatch {
        job_description: String,
        style: Style,
    },
}

impl AnalysisTask {
    /// Top-level message used when the analysis fails.
    pub fn operation(&self) -> &'static str {
        match self {
            AnalysisTask::ParseResume => "Failed to parse resume",
            AnalysisTask::AtsCheck => "Failed to check ATS score from file",
            AnalysisTask::JobMatch { .. } => "Failed to match job description from file",
        }
    }

    fn purpose(&self) -> FilePurpose {
        match self {
            AnalysisTask::AtsCheck => FilePurpose::General,
            AnalysisTask::ParseResume | AnalysisTask::JobMatch { .. } => FilePurpose::Parsing,
        }
    }

    fn agent_name(&self) -> &'static str {
        match self {
            AnalysisTask::ParseResume => "resume-parser",
            AnalysisTask::AtsCheck => "ats-analyzer",
            AnalysisTask::JobMatch { .. } => "job-matcher",
        }
    }

    fn instructions(&self) -> String {
        match self {
            AnalysisTask::ParseResume => RESUME_EXTRACTION_INSTRUCTIONS.to_string(),
            AnalysisTask::AtsCheck => build_ats_file_instructions(),
            AnalysisTask::JobMatch {
                job_description,
                style,
            } => build_job_match_file_instructions(job_description, *style),
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AnalysisTask::ParseResume => RESUME_EXTRACTION_MESSAGE,
            AnalysisTask::AtsCheck => ATS_FILE_MESSAGE,
            AnalysisTask::JobMatch { .. } => JOB_MATCH_FILE_MESSAGE,
        }
    }

    fn validate(&self, value: Value) -> Result<Value, AnalysisError> {
        match self {
            AnalysisTask::ParseResume => validate_shape::<ParsedResume>(value),
            AnalysisTask::AtsCheck => validate_shape::<AtsReport>(value),
            AnalysisTask::JobMatch { .. } => validate_shape::<JobMatchReport>(value),
        }
    }
}

pub struct FileAnalyzer {
    provider: Arc<dyn AnalysisProvider>,
    ingestor: FileIngestor,
    model: String,
    polling: PollSettings,
}

impl FileAnalyzer {
    pub fn new(
        provider: Arc<dyn AnalysisProvider>,
        ingestor: FileIngestor,
        model: String,
        polling: PollSettings,
    ) -> Self {
        Self {
            provider,
            ingestor,
            model,
            polling,
        }
    }

    /// Extracts every resume field from the document at `file_url`.
    pub async fn parse_resume_from_file(&self, file_url: &str) -> Result<Value, OperationError> {
        self.run_task(AnalysisTask::ParseResume, file_url).await
    }

    /// Scores the ATS compatibility of the document at `file_url`.
    pub async fn check_ats_from_file(&self, file_url: &str) -> Result<Value, OperationError> {
        self.run_task(AnalysisTask::AtsCheck, file_url).await
    }

    /// Scores the document at `file_url` against a job description.
    pub async fn job_matching_from_file(
        &self,
        file_url: &str,
        job_description: &str,
        style: Style,
    ) -> Result<Value, OperationError> {
        let task = AnalysisTask::JobMatch {
            job_description: job_description.to_string(),
            style,
        };
        self.run_task(task, file_url).await
    }

    async fn run_task(&self, task: AnalysisTask, file_url: &str) -> Result<Value, OperationError> {
        info!("Starting {} analysis", task.agent_name());

        let file = self
            .ingestor
            .ingest(file_url)
            .await
            .map_err(|e| OperationError::new(task.operation(), e))?;

        let value = self
            .analyze(&task, &file)
            .await
            .map_err(|e| OperationError::new(task.operation(), e))?;

        info!("Finished {} analysis", task.agent_name());
        Ok(value)
    }

    /// Runs one full lifecycle for an already-ingested file.
    pub async fn analyze(
        &self,
        task: &AnalysisTask,
        file: &IngestedFile,
    ) -> Result<Value, AnalysisError> {
        let mut cleanup = CleanupStack::new();
        let outcome = self.drive(task, file, &mut cleanup).await;

        debug!("{}: releasing {} resources", Stage::CleaningUp, cleanup.len());
        cleanup.unwind(self.provider.as_ref()).await;

        let text = outcome?;
        task.validate(extract_json(&text)?)
    }

    async fn drive(
        &self,
        task: &AnalysisTask,
        file: &IngestedFile,
        cleanup: &mut CleanupStack,
    ) -> Result<String, AnalysisError> {
        let provider = self.provider.as_ref();
        let name = format!("{}-{}", task.agent_name(), Uuid::new_v4().simple());

        debug!("{}: {} ({})", Stage::Uploading, file.file_name, file.content_type);
        let handle = provider
            .upload_file(file, task.purpose())
            .await
            .map_err(AnalysisError::Upload)?;
        cleanup.push(RemoteResource::File(handle.id.clone()));
        debug!("Uploaded {} as {:?} file", handle.id, handle.purpose);

        debug!("{}: {name}", Stage::AgentCreating);
        let instructions = task.instructions();
        let agent = provider
            .create_agent(&AgentSpec {
                name: &name,
                instructions: &instructions,
                model: &self.model,
            })
            .await
            .map_err(AnalysisError::AgentCreation)?;
        cleanup.push(RemoteResource::Agent(agent.id.clone()));

        debug!("{}: over {}", Stage::IndexCreating, handle.id);
        let index = provider
            .create_index(&format!("{name}-index"), std::slice::from_ref(&handle.id))
            .await
            .map_err(AnalysisError::IndexCreation)?;
        cleanup.push(RemoteResource::Index(index.id.clone()));
        debug!("Index {} covers {} file(s)", index.id, index.file_ids.len());

        debug!("{}: {} -> {}", Stage::IndexBinding, index.id, agent.id);
        let agent = provider
            .bind_index(&agent, &index)
            .await
            .map_err(AnalysisError::IndexBinding)?;
        debug!(
            "Agent {} bound to {}",
            agent.id,
            agent.bound_index_id.as_deref().unwrap_or("nothing")
        );

        debug!("{}", Stage::ConversationCreating);
        let conversation = provider
            .create_conversation(task.message())
            .await
            .map_err(AnalysisError::ConversationCreation)?;
        cleanup.push(RemoteResource::Conversation(conversation.id.clone()));

        debug!("{}: agent {} on {}", Stage::Running, agent.id, conversation.id);
        let run = provider.start_run(&conversation, &agent).await?;
        self.await_run(run).await?;

        debug!("{}: {}", Stage::Fetching, conversation.id);
        let text = provider
            .latest_message(&conversation)
            .await?
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        Ok(text)
    }

    /// Polls at a fixed interval until the run leaves the pending states or the
    /// deadline passes.
    async fn await_run(&self, mut run: AnalysisRun) -> Result<(), AnalysisError> {
        let deadline = Instant::now() + self.polling.timeout;

        loop {
            if run.status == RunStatus::Completed {
                return Ok(());
            }
            if !run.status.is_pending() {
                return Err(AnalysisError::RunFailed {
                    status: run.status.as_str().to_string(),
                });
            }
            if Instant::now() >= deadline {
                return Err(AnalysisError::RunTimedOut(self.polling.timeout));
            }

            tokio::time::sleep(self.polling.interval).await;
            run = self.provider.get_run(&run).await?;
            debug!("{}: run {} is {}", Stage::Polling, run.id, run.status.as_str());
        }
    }
}
