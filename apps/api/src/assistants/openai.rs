//! `AnalysisProvider` over the OpenAI Assistants v2 REST API.
//!
//! Mapping: file handle → `/files`, content index → `/vector_stores`,
//! analysis agent → `/assistants`, conversation → `/threads`.

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::debug;

use crate::analysis::ingest::IngestedFile;
use crate::assistants::{
    AgentSpec, AnalysisAgent, AnalysisProvider, AnalysisRun, ContentIndex, Conversation,
    FilePurpose, RemoteFileHandle, RunStatus,
};
use crate::llm_client::{ensure_success, ProviderError};

const ASSISTANTS_BETA: &str = "assistants=v2";

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<MessageText>,
}

#[derive(Debug, Deserialize)]
struct MessageText {
    value: String,
}

#[derive(Clone)]
pub struct OpenAiAssistants {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiAssistants {
    pub fn new(client: Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", ASSISTANTS_BETA)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = self.authorized(request).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ProviderError> {
        self.send(self.client.post(self.url(path)).json(&body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ProviderError> {
        let response = self
            .authorized(self.client.delete(self.url(path)))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn purpose_tag(purpose: FilePurpose) -> &'static str {
    match purpose {
        FilePurpose::Parsing => "assistants",
        FilePurpose::General => "user_data",
    }
}

#[async_trait]
impl AnalysisProvider for OpenAiAssistants {
    async fn upload_file(
        &self,
        file: &IngestedFile,
        purpose: FilePurpose,
    ) -> Result<RemoteFileHandle, ProviderError> {
        let part = multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new()
            .text("purpose", purpose_tag(purpose))
            .part("file", part);

        let created: Created = self
            .send(self.client.post(self.url("/files")).multipart(form))
            .await?;
        debug!("Uploaded {} as {}", file.file_name, created.id);

        Ok(RemoteFileHandle {
            id: created.id,
            purpose,
        })
    }

    async fn create_agent(&self, spec: &AgentSpec<'_>) -> Result<AnalysisAgent, ProviderError> {
        let created: Created = self
            .post_json(
                "/assistants",
                json!({
                    "name": spec.name,
                    "model": spec.model,
                    "instructions": spec.instructions,
                    "tools": [{"type": "file_search"}],
                    "temperature": 0.2,
                }),
            )
            .await?;

        Ok(AnalysisAgent {
            id: created.id,
            bound_index_id: None,
        })
    }

    async fn create_index(
        &self,
        name: &str,
        file_ids: &[String],
    ) -> Result<ContentIndex, ProviderError> {
        let created: Created = self
            .post_json("/vector_stores", json!({"name": name, "file_ids": file_ids}))
            .await?;

        Ok(ContentIndex {
            id: created.id,
            file_ids: file_ids.to_vec(),
        })
    }

    async fn bind_index(
        &self,
        agent: &AnalysisAgent,
        index: &ContentIndex,
    ) -> Result<AnalysisAgent, ProviderError> {
        let _: Created = self
            .post_json(
                &format!("/assistants/{}", agent.id),
                json!({"tool_resources": {"file_search": {"vector_store_ids": [index.id]}}}),
            )
            .await?;

        Ok(AnalysisAgent {
            id: agent.id.clone(),
            bound_index_id: Some(index.id.clone()),
        })
    }

    async fn create_conversation(&self, message: &str) -> Result<Conversation, ProviderError> {
        let created: Created = self
            .post_json(
                "/threads",
                json!({"messages": [{"role": "user", "content": message}]}),
            )
            .await?;

        Ok(Conversation { id: created.id })
    }

    async fn start_run(
        &self,
        conversation: &Conversation,
        agent: &AnalysisAgent,
    ) -> Result<AnalysisRun, ProviderError> {
        let run: RunObject = self
            .post_json(
                &format!("/threads/{}/runs", conversation.id),
                json!({"assistant_id": agent.id}),
            )
            .await?;

        Ok(AnalysisRun {
            id: run.id,
            status: run.status,
            conversation_id: conversation.id.clone(),
            agent_id: agent.id.clone(),
        })
    }

    async fn get_run(&self, run: &AnalysisRun) -> Result<AnalysisRun, ProviderError> {
        let latest: RunObject = self
            .send(self.client.get(self.url(&format!(
                "/threads/{}/runs/{}",
                run.conversation_id, run.id
            ))))
            .await?;

        if let Some(error) = &latest.last_error {
            debug!("Run {} reported error: {}", latest.id, error.message);
        }

        Ok(AnalysisRun {
            id: latest.id,
            status: latest.status,
            conversation_id: run.conversation_id.clone(),
            agent_id: run.agent_id.clone(),
        })
    }

    async fn latest_message(
        &self,
        conversation: &Conversation,
    ) -> Result<Option<String>, ProviderError> {
        let messages: MessageList = self
            .send(
                self.client
                    .get(self.url(&format!("/threads/{}/messages", conversation.id)))
                    .query(&[("order", "desc"), ("limit", "1")]),
            )
            .await?;

        // A run that produced no reply leaves the user's prompt as the newest message.
        let latest = messages
            .data
            .into_iter()
            .next()
            .filter(|message| message.role == "assistant");

        Ok(latest.map(|message| {
            message
                .content
                .into_iter()
                .filter(|c| c.content_type == "text")
                .filter_map(|c| c.text.map(|t| t.value))
                .collect::<Vec<_>>()
                .join("\n")
        }))
    }

    async fn delete_file(&self, id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/files/{id}")).await
    }

    async fn delete_agent(&self, id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/assistants/{id}")).await
    }

    async fn delete_index(&self, id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/vector_stores/{id}")).await
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ProviderError> {
        self.delete(&format!("/threads/{id}")).await
    }
}
