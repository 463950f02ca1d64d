//! # Service Client
//!
//! Thin JSON-over-HTTP client for the four remote services: file staging,
//! text extraction, entity labelling, and anonymization.
//!
//! Every call follows the same shape: POST a small JSON (or multipart) body,
//! treat any non-2xx response as an error carrying the response body as the
//! error text. There are no retries and no request timeouts; a hung request
//! blocks the pipeline for as long as the server keeps the connection open.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::Entity;

/// Full URLs of the four service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    /// Entry service: multipart file staging.
    #[serde(default = "default_upload_url")]
    pub upload: String,
    /// Entry service: anonymization requests.
    #[serde(default = "default_anonymize_url")]
    pub anonymize: String,
    /// Extraction service: PDF-to-text.
    #[serde(default = "default_extract_url")]
    pub extract: String,
    /// Labelling service: named-entity recognition.
    #[serde(default = "default_label_url")]
    pub label: String,
}

fn default_upload_url() -> String {
    "http://127.0.0.1:8080/loadfile".to_string()
}

fn default_anonymize_url() -> String {
    "http://127.0.0.1:8080/entry".to_string()
}

fn default_extract_url() -> String {
    "http://127.0.0.1:8081/extract".to_string()
}

fn default_label_url() -> String {
    "http://127.0.0.1:8082/label".to_string()
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            upload: default_upload_url(),
            anonymize: default_anonymize_url(),
            extract: default_extract_url(),
            label: default_label_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    filepath: String,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    file_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct LabelRequest<'a> {
    text: &'a str,
}

/// Labelling service response: the text it analyzed plus the entities found.
#[derive(Debug, Deserialize)]
pub struct LabelResponse {
    pub extracted_text: Option<String>,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Serialize)]
struct AnonymizeRequest<'a> {
    file_path: &'a str,
    forbidden_labels: &'a [String],
}

/// Client for the anonymization service mesh.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ServiceClient {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
        }
    }

    /// Stage a local file on the entry service. Returns the server-assigned
    /// file path used by the later calls.
    pub async fn stage_upload(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&self.endpoints.upload)
            .multipart(form)
            .send()
            .await
            .context("Upload request failed")?;

        let response = error_for_status(response, "Upload").await?;
        let data: UploadResponse = response
            .json()
            .await
            .context("Failed to parse upload response")?;
        Ok(data.filepath)
    }

    /// Ask the extraction service for the raw text of a staged document.
    pub async fn extract_text(&self, file_path: &str) -> Result<String> {
        let response = self
            .http
            .post(&self.endpoints.extract)
            .json(&ExtractRequest { file_path })
            .send()
            .await
            .context("Extraction request failed")?;

        let response = error_for_status(response, "Extraction").await?;
        let data: ExtractResponse = response
            .json()
            .await
            .context("Failed to parse extraction response")?;
        Ok(data.text)
    }

    /// Ask the labelling service for the entities recognized in `text`.
    pub async fn label_text(&self, text: &str) -> Result<LabelResponse> {
        let response = self
            .http
            .post(&self.endpoints.label)
            .json(&LabelRequest { text })
            .send()
            .await
            .context("Labelling request failed")?;

        let response = error_for_status(response, "Labelling").await?;
        response
            .json()
            .await
            .context("Failed to parse labelling response")
    }

    /// Request a redacted copy of a staged document. The success body is
    /// opaque; the redacted file's location is derived client-side with
    /// [`redacted_path`].
    pub async fn anonymize(&self, file_path: &str, forbidden_labels: &[String]) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoints.anonymize)
            .json(&AnonymizeRequest {
                file_path,
                forbidden_labels,
            })
            .send()
            .await
            .context("Anonymization request failed")?;

        error_for_status(response, "Anonymization").await?;
        Ok(())
    }
}

/// Map a non-2xx response to an error carrying the response body as text.
async fn error_for_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("{what} failed ({status}): {body}"))
}

/// Derive the redacted file's path from the staged path: the staging area
/// maps to the output directory and the file gets a `_redacted` suffix.
pub fn redacted_path(file_path: &str) -> String {
    file_path
        .replace("temp", "output_dir")
        .replace(".pdf", "_redacted.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_path_substitution() {
        assert_eq!(
            redacted_path("temp/report.pdf"),
            "output_dir/report_redacted.pdf"
        );
    }

    #[test]
    fn test_redacted_path_without_markers_is_unchanged_shape() {
        // Non-PDF staged elsewhere: substitutions simply do not apply.
        assert_eq!(redacted_path("upload/notes.txt"), "upload/notes.txt");
    }

    #[test]
    fn test_default_endpoints_point_at_local_mesh() {
        let e = Endpoints::default();
        assert_eq!(e.upload, "http://127.0.0.1:8080/loadfile");
        assert_eq!(e.anonymize, "http://127.0.0.1:8080/entry");
        assert_eq!(e.extract, "http://127.0.0.1:8081/extract");
        assert_eq!(e.label, "http://127.0.0.1:8082/label");
    }

    #[test]
    fn test_endpoints_deserialize_with_partial_fields() {
        let json = r#"{"extract": "http://10.0.0.5:9000/extract"}"#;
        let e: Endpoints = serde_json::from_str(json).expect("deserialize");
        assert_eq!(e.extract, "http://10.0.0.5:9000/extract");
        assert_eq!(e.upload, "http://127.0.0.1:8080/loadfile");
    }

    #[test]
    fn test_anonymize_request_wire_format() {
        let labels = vec!["PERSON".to_string(), "EMAIL".to_string()];
        let req = AnonymizeRequest {
            file_path: "temp/doc.pdf",
            forbidden_labels: &labels,
        };
        let json = serde_json::to_string(&req).expect("serialize");
        assert_eq!(
            json,
            r#"{"file_path":"temp/doc.pdf","forbidden_labels":["PERSON","EMAIL"]}"#
        );
    }

    #[tokio::test]
    async fn test_non_2xx_response_surfaces_body_text() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Minimal one-shot HTTP server answering 500 with a readable body.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let body = "extraction backend exploded";
                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\n\
                     content-length: {}\r\n\
                     connection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        let endpoints = Endpoints {
            extract: format!("http://{addr}/extract"),
            ..Endpoints::default()
        };
        let client = ServiceClient::new(endpoints);

        let err = client
            .extract_text("temp/doc.pdf")
            .await
            .expect_err("non-2xx must be an error");
        let message = format!("{err:#}");
        assert!(message.contains("Extraction failed"), "got: {message}");
        assert!(message.contains("500"), "got: {message}");
        assert!(
            message.contains("extraction backend exploded"),
            "body text missing from: {message}"
        );
    }

    #[test]
    fn test_label_response_wire_format() {
        let json = r#"{
            "extracted_text": "Isaac wrote to a@b.com",
            "entities": [
                {"text": "Isaac", "label": "PERSON"},
                {"text": "a@b.com", "label": "EMAIL"}
            ]
        }"#;
        let resp: LabelResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(resp.entities.len(), 2);
        assert_eq!(resp.entities[0].label, "PERSON");
    }
}
