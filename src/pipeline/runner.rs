//! # Background Pipeline Runners
//!
//! Network work runs on background tokio tasks so the event loop never
//! blocks on a request. Each runner returns a handle exposing a shared
//! status that the UI polls once per frame.
//!
//! ## Failure Semantics
//!
//! The analysis pipeline (upload → extract → label → group) catches every
//! error at this boundary, logs it, and settles on [`AnalysisStatus::NoResult`]
//! with no user-facing message. The anonymization runner instead surfaces its
//! failure message so the UI can raise an alert. No stage retries.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::client::{redacted_path, ServiceClient};
use super::{group_entities, LabelGroup};

/// Status of a running or finished analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// Staging the file on the entry service.
    Uploading,
    /// Asking the extraction service for the document text.
    Extracting,
    /// Asking the labelling service for entities.
    Labelling,
    /// Pipeline finished: server-assigned path plus grouped findings.
    Done {
        file_path: String,
        groups: Vec<LabelGroup>,
    },
    /// Pipeline aborted; the cause was logged, nothing is shown to the user.
    NoResult,
}

/// A handle to a running analysis pipeline that can be polled for status.
pub struct AnalysisHandle {
    status: Arc<Mutex<AnalysisStatus>>,
    pub started_at: Instant,
}

impl AnalysisHandle {
    /// Poll the current pipeline status.
    pub fn poll_status(&self) -> AnalysisStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or(AnalysisStatus::NoResult)
    }
}

fn set_status(status: &Arc<Mutex<AnalysisStatus>>, next: AnalysisStatus) {
    if let Ok(mut guard) = status.lock() {
        *guard = next;
    }
}

/// Spawn the upload → extraction → labelling → grouping pipeline for a local
/// file. Stages run strictly in sequence, each gated on the previous one.
pub fn spawn_analysis(
    client: ServiceClient,
    local_file: PathBuf,
    meanings: HashMap<String, String>,
) -> AnalysisHandle {
    let status = Arc::new(Mutex::new(AnalysisStatus::Uploading));
    let task_status = Arc::clone(&status);

    tokio::spawn(async move {
        match run_analysis(&client, &local_file, &meanings, &task_status).await {
            Ok((file_path, groups)) => {
                set_status(&task_status, AnalysisStatus::Done { file_path, groups });
            }
            Err(e) => {
                tracing::error!("analysis pipeline failed: {e:#}");
                set_status(&task_status, AnalysisStatus::NoResult);
            }
        }
    });

    AnalysisHandle {
        status,
        started_at: Instant::now(),
    }
}

async fn run_analysis(
    client: &ServiceClient,
    local_file: &PathBuf,
    meanings: &HashMap<String, String>,
    status: &Arc<Mutex<AnalysisStatus>>,
) -> Result<(String, Vec<LabelGroup>)> {
    let file_path = client.stage_upload(local_file).await?;
    tracing::info!("staged upload as {file_path}");

    set_status(status, AnalysisStatus::Extracting);
    let text = client.extract_text(&file_path).await?;

    set_status(status, AnalysisStatus::Labelling);
    let response = client.label_text(&text).await?;
    tracing::info!("labelling returned {} entities", response.entities.len());

    let groups = group_entities(&response.entities, meanings);
    Ok((file_path, groups))
}

/// Status of a running or finished anonymization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnonymizeStatus {
    Running,
    /// Request accepted; the redacted file's location was derived client-side.
    Done { redacted: String },
    /// Request failed; the message is surfaced to the user as an alert.
    Failed { message: String },
}

/// A handle to a running anonymization request.
pub struct AnonymizeHandle {
    status: Arc<Mutex<AnonymizeStatus>>,
    pub started_at: Instant,
}

impl AnonymizeHandle {
    pub fn poll_status(&self) -> AnonymizeStatus {
        self.status.lock().map(|s| s.clone()).unwrap_or_else(|_| {
            AnonymizeStatus::Failed {
                message: "anonymization status lock poisoned".to_string(),
            }
        })
    }
}

/// Spawn an anonymization request for a staged file and the user-selected
/// forbidden label categories.
pub fn spawn_anonymize(
    client: ServiceClient,
    file_path: String,
    forbidden_labels: Vec<String>,
) -> AnonymizeHandle {
    let status = Arc::new(Mutex::new(AnonymizeStatus::Running));
    let task_status = Arc::clone(&status);

    tokio::spawn(async move {
        let next = match client.anonymize(&file_path, &forbidden_labels).await {
            Ok(()) => {
                let redacted = redacted_path(&file_path);
                tracing::info!("redacted file available at {redacted}");
                AnonymizeStatus::Done { redacted }
            }
            Err(e) => {
                tracing::error!("anonymization failed: {e:#}");
                AnonymizeStatus::Failed {
                    message: e.to_string(),
                }
            }
        };
        if let Ok(mut guard) = task_status.lock() {
            *guard = next;
        }
    });

    AnonymizeHandle {
        status,
        started_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Endpoints;

    #[tokio::test]
    async fn test_analysis_with_unreachable_service_reports_no_result() {
        // Port 9 (discard) is not listening; the upload stage fails and the
        // pipeline settles on NoResult without surfacing an error.
        let endpoints = Endpoints {
            upload: "http://127.0.0.1:9/loadfile".to_string(),
            ..Endpoints::default()
        };
        let client = ServiceClient::new(endpoints);

        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("doc.pdf");
        std::fs::write(&file, b"%PDF-1.4").expect("write");

        let handle = spawn_analysis(client, file, HashMap::new());

        let mut status = handle.poll_status();
        for _ in 0..200 {
            if status == AnalysisStatus::NoResult {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            status = handle.poll_status();
        }
        assert_eq!(status, AnalysisStatus::NoResult);
    }

    #[tokio::test]
    async fn test_analysis_with_missing_file_reports_no_result() {
        let client = ServiceClient::new(Endpoints::default());
        let handle = spawn_analysis(
            client,
            PathBuf::from("/nonexistent/definitely/missing.pdf"),
            HashMap::new(),
        );

        let mut status = handle.poll_status();
        for _ in 0..200 {
            if status == AnalysisStatus::NoResult {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            status = handle.poll_status();
        }
        assert_eq!(status, AnalysisStatus::NoResult);
    }

    #[tokio::test]
    async fn test_anonymize_with_unreachable_service_fails_with_message() {
        let endpoints = Endpoints {
            anonymize: "http://127.0.0.1:9/entry".to_string(),
            ..Endpoints::default()
        };
        let client = ServiceClient::new(endpoints);
        let handle = spawn_anonymize(
            client,
            "temp/doc.pdf".to_string(),
            vec!["PERSON".to_string()],
        );

        let mut status = handle.poll_status();
        for _ in 0..200 {
            if !matches!(status, AnonymizeStatus::Running) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            status = handle.poll_status();
        }
        assert!(matches!(status, AnonymizeStatus::Failed { .. }));
    }
}
