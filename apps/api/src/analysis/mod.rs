// Resume analysis: text analyses over the structured resume, and file analyses
// driven through the assistants capability. All provider calls go through
// `llm_client` or `assistants`.

pub mod cleanup;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod json;
pub mod orchestrator;
pub mod prompts;
pub mod sanitize;
pub mod text;
