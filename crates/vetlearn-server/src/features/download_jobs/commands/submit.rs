//! Submit bulk download command
//!
//! Validates the code list, registers a job and starts it in the background.
//! The response returns as soon as the job is queued.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::response::AppError;
use crate::features::shared::validation::{normalize_codes, CodeListError};
use crate::ingest::{IngestService, JobKind, JobStatus};

/// Command to download a list of component codes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitDownloadCommand {
    pub kind: JobKind,
    /// Codes as received; trimmed during validation
    pub codes: Vec<String>,
    /// Operator submitting the job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of a successful bulk download request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDownloadResponse {
    pub job_id: Uuid,
    pub message: String,
    pub status: JobStatus,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmitDownloadError {
    #[error(transparent)]
    InvalidCodes(#[from] CodeListError),
}

impl Request<Result<SubmitDownloadResponse, SubmitDownloadError>> for SubmitDownloadCommand {}

impl From<SubmitDownloadError> for AppError {
    fn from(err: SubmitDownloadError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

fn empty_message(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Packages => "No training package codes provided",
        JobKind::Units => "No unit codes provided",
    }
}

fn noun(kind: JobKind, count: usize) -> &'static str {
    match (kind, count) {
        (JobKind::Packages, 1) => "training package",
        (JobKind::Packages, _) => "training packages",
        (JobKind::Units, 1) => "unit",
        (JobKind::Units, _) => "units",
    }
}

impl SubmitDownloadCommand {
    pub fn new(kind: JobKind, codes: Vec<String>, user_id: Option<String>) -> Self {
        Self {
            kind,
            codes,
            user_id,
        }
    }

    /// Trimmed codes, or the reason the list is unusable
    pub fn validate(&self) -> Result<Vec<String>, SubmitDownloadError> {
        Ok(normalize_codes(self.codes.clone(), empty_message(self.kind))?)
    }
}

#[tracing::instrument(skip(service, command), fields(kind = command.kind.as_str(), items = command.codes.len()))]
pub async fn handle(
    service: &IngestService,
    command: SubmitDownloadCommand,
) -> Result<SubmitDownloadResponse, SubmitDownloadError> {
    let codes = command.validate()?;
    let count = codes.len();

    let job_id = service.submit(command.kind, codes, command.user_id).await;

    Ok(SubmitDownloadResponse {
        job_id,
        message: format!(
            "Bulk download started for {} {}",
            count,
            noun(command.kind, count)
        ),
        status: JobStatus::Queued,
    })
}
