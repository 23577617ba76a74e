//! List available training packages query
//!
//! Searches the upstream registry for packages and marks the ones already in
//! the catalog.

use mediator::Request;
use serde::{Deserialize, Serialize};
use vetlearn_common::types::ComponentKind;

use crate::api::response::AppError;
use crate::features::shared::PageParams;
use crate::ingest::{AvailablePage, IngestError, IngestService};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAvailablePackagesQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListAvailableError {
    #[error("{0}")]
    InvalidPage(&'static str),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl Request<Result<AvailablePage, ListAvailableError>> for ListAvailablePackagesQuery {}

impl From<ListAvailableError> for AppError {
    fn from(err: ListAvailableError) -> Self {
        match err {
            ListAvailableError::InvalidPage(msg) => AppError::BadRequest(msg.to_string()),
            ListAvailableError::Ingest(err) => err.into(),
        }
    }
}

impl ListAvailablePackagesQuery {
    pub fn params(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }
}

pub async fn handle(
    service: &IngestService,
    query: ListAvailablePackagesQuery,
) -> Result<AvailablePage, ListAvailableError> {
    let params = query.params();
    params.validate().map_err(ListAvailableError::InvalidPage)?;

    Ok(service
        .list_available(
            ComponentKind::TrainingPackage,
            "",
            params.page(),
            params.page_size(),
        )
        .await?)
}
