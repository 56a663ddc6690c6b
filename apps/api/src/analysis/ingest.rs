//! File Ingestion. Downloads an uploaded resume and packages it for the provider.

use std::path::Path;

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::{debug, info};

use crate::analysis::error::AnalysisError;

const DEFAULT_FILE_NAME: &str = "resume.pdf";
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// A downloaded file ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedFile {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
}

#[derive(Clone)]
pub struct FileIngestor {
    client: Client,
}

impl FileIngestor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn ingest(&self, url: &str) -> Result<IngestedFile, AnalysisError> {
        let parsed = Url::parse(url)
            .map_err(|e| AnalysisError::Fetch(format!("invalid file URL '{url}': {e}")))?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| AnalysisError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Fetch(format!(
                "file URL responded with status {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnalysisError::Fetch(e.to_string()))?;

        let file_name = with_extension(file_name_from_url(&parsed), &content_type);
        info!(
            "Fetched source file {} ({} bytes, {})",
            file_name,
            bytes.len(),
            content_type
        );

        Ok(IngestedFile {
            bytes,
            file_name,
            content_type,
        })
    }
}

/// Last path segment of the URL. Storage-bucket URLs encode the object path
/// into one segment (`resumes%2Fcv.pdf`), so only the part after the last
/// encoded slash is kept.
fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| {
            let segment = segment.replace("%2f", "%2F");
            segment.rsplit("%2F").next().unwrap_or_default().to_string()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

/// Appends an extension inferred from the content type when the name has none.
/// Only cosmetic: the provider trusts the content type, not the extension.
fn with_extension(file_name: String, content_type: &str) -> String {
    if Path::new(&file_name).extension().is_some() {
        return file_name;
    }
    let extension = extension_for_content_type(content_type);
    debug!("Inferred extension {extension} for {file_name}");
    format!("{file_name}{extension}")
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("pdf") {
        ".pdf"
    } else if content_type.contains("msword") {
        ".doc"
    } else if content_type.contains("wordprocessingml") {
        ".docx"
    } else if content_type.contains("text/plain") {
        ".txt"
    } else {
        ".pdf"
    }
}
