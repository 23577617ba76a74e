//! Get download job query

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::response::AppError;
use crate::ingest::{IngestService, Job};

/// Query a job snapshot by id as given in the URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDownloadJobQuery {
    pub job_id: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GetDownloadJobError {
    #[error("Download job not found")]
    NotFound,
}

impl Request<Result<Job, GetDownloadJobError>> for GetDownloadJobQuery {}

impl From<GetDownloadJobError> for AppError {
    fn from(err: GetDownloadJobError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

/// Ids that are not UUIDs cannot name a job, so they are reported as unknown
pub async fn handle(
    service: &IngestService,
    query: GetDownloadJobQuery,
) -> Result<Job, GetDownloadJobError> {
    let id = Uuid::parse_str(query.job_id.trim()).map_err(|_| GetDownloadJobError::NotFound)?;

    service
        .registry()
        .get_job(id)
        .await
        .ok_or(GetDownloadJobError::NotFound)
}
