//! List download jobs query

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::api::response::AppError;
use crate::ingest::{IngestService, Job, JobFilter, JobKind, JobStatus};

/// `GET /api/download-jobs?kind=units&status=processing`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDownloadJobsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDownloadJobsResponse {
    /// Newest first
    pub jobs: Vec<Job>,
    pub total: usize,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ListDownloadJobsError {
    #[error("{0}")]
    InvalidFilter(String),
}

impl Request<Result<ListDownloadJobsResponse, ListDownloadJobsError>> for ListDownloadJobsQuery {}

impl From<ListDownloadJobsError> for AppError {
    fn from(err: ListDownloadJobsError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl ListDownloadJobsQuery {
    pub fn filter(&self) -> Result<JobFilter, ListDownloadJobsError> {
        let kind = self
            .kind
            .as_deref()
            .map(str::parse::<JobKind>)
            .transpose()
            .map_err(ListDownloadJobsError::InvalidFilter)?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<JobStatus>)
            .transpose()
            .map_err(ListDownloadJobsError::InvalidFilter)?;

        Ok(JobFilter { kind, status })
    }
}

pub async fn handle(
    service: &IngestService,
    query: ListDownloadJobsQuery,
) -> Result<ListDownloadJobsResponse, ListDownloadJobsError> {
    let jobs = service.registry().list_jobs(query.filter()?).await;

    Ok(ListDownloadJobsResponse {
        total: jobs.len(),
        jobs,
    })
}
