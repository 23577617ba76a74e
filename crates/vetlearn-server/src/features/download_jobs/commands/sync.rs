//! Sync single component command
//!
//! Ingests one package or unit in the request task and reports its
//! [`ItemResult`]. No job is registered.

use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::api::response::AppError;
use crate::ingest::{IngestError, IngestService, ItemResult, JobKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncComponentCommand {
    pub kind: JobKind,
    /// Code as taken from the path; trimmed during validation
    pub code: String,
    /// Operator requesting the sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncComponentError {
    #[error("{0}")]
    BlankCode(&'static str),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl Request<Result<ItemResult, SyncComponentError>> for SyncComponentCommand {}

impl From<SyncComponentError> for AppError {
    fn from(err: SyncComponentError) -> Self {
        match err {
            SyncComponentError::BlankCode(msg) => AppError::BadRequest(msg.to_string()),
            SyncComponentError::Ingest(err) => err.into(),
        }
    }
}

fn blank_message(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Packages => "Training package code is required",
        JobKind::Units => "Unit code is required",
    }
}

impl SyncComponentCommand {
    pub fn new(kind: JobKind, code: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            user_id,
        }
    }

    pub fn validate(&self) -> Result<&str, SyncComponentError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(SyncComponentError::BlankCode(blank_message(self.kind)));
        }
        Ok(code)
    }
}

#[tracing::instrument(skip(service, command), fields(kind = command.kind.as_str(), code = %command.code, user_id = ?command.user_id))]
pub async fn handle(
    service: &IngestService,
    command: SyncComponentCommand,
) -> Result<ItemResult, SyncComponentError> {
    let code = command.validate()?;
    Ok(service.sync_one(command.kind, code).await?)
}
