//! Unwind stack for remote resources created during one file analysis.

use tracing::{debug, warn};

use crate::assistants::AnalysisProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResource {
    File(String),
    Agent(String),
    Index(String),
    Conversation(String),
}

impl RemoteResource {
    fn kind(&self) -> &'static str {
        match self {
            RemoteResource::File(_) => "file",
            RemoteResource::Agent(_) => "agent",
            RemoteResource::Index(_) => "content index",
            RemoteResource::Conversation(_) => "conversation",
        }
    }

    fn id(&self) -> &str {
        match self {
            RemoteResource::File(id)
            | RemoteResource::Agent(id)
            | RemoteResource::Index(id)
            | RemoteResource::Conversation(id) => id,
        }
    }
}

/// Resources are registered right after creation and released in reverse
/// order by `unwind`. Each release is best-effort: failures are logged and
/// never stop the remaining releases.
#[derive(Debug, Default)]
pub struct CleanupStack {
    resources: Vec<RemoteResource>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, resource: RemoteResource) {
        self.resources.push(resource);
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub async fn unwind(&mut self, provider: &dyn AnalysisProvider) {
        while let Some(resource) = self.resources.pop() {
            let result = match &resource {
                RemoteResource::File(id) => provider.delete_file(id).await,
                RemoteResource::Agent(id) => provider.delete_agent(id).await,
                RemoteResource::Index(id) => provider.delete_index(id).await,
                RemoteResource::Conversation(id) => provider.delete_conversation(id).await,
            };

            match result {
                Ok(()) => debug!("Deleted {} {}", resource.kind(), resource.id()),
                Err(e) => warn!(
                    "Failed to delete {} {}: {e}",
                    resource.kind(),
                    resource.id()
                ),
            }
        }
    }
}
