//! Bulk download orchestration
//!
//! Accepts code lists from the HTTP layer, registers a job and drives the
//! worker over the codes in a background task. Also serves the annotated
//! upstream listings behind the "available" endpoints.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::{Arc, OnceLock};
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;
use vetlearn_common::types::{ComponentKind, ProcessedFlag};

use super::config::IngestConfig;
use super::errors::{IngestError, IngestResult};
use super::jobs::{ItemResult, JobKind, JobRegistry};
use super::parser::ElementTableParser;
use super::storage::IngestStore;
use super::tga::{ComponentSummary, SearchRequest, TgaApi, TgaError};
use super::worker::IngestWorker;

pub const MISSING_CREDENTIALS: &str = "TGA API credentials not configured";

/// Upstream component annotated with its catalog state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableComponent {
    #[serde(flatten)]
    pub summary: ComponentSummary,
    pub in_database: bool,
    pub processed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailablePage {
    pub items: Vec<AvailableComponent>,
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Entry point for bulk ingests
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn IngestStore>,
    tga: Option<Arc<dyn TgaApi>>,
    parser: Arc<ElementTableParser>,
    registry: JobRegistry,
    config: IngestConfig,
}

impl IngestService {
    /// `tga` is `None` when no upstream credentials are configured; jobs then
    /// fail immediately instead of the server refusing to start.
    pub fn new(
        store: Arc<dyn IngestStore>,
        tga: Option<Arc<dyn TgaApi>>,
        config: IngestConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            tga,
            parser: Arc::new(ElementTableParser::new()?),
            registry: JobRegistry::new(),
            config,
        })
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn IngestStore> {
        &self.store
    }

    /// Register a job for `codes` and start it in the background
    pub async fn submit(&self, kind: JobKind, codes: Vec<String>, user_id: Option<String>) -> Uuid {
        let job_id = self.registry.create_job(kind, codes.clone(), user_id).await;
        info!(job_id = %job_id, kind = kind.as_str(), items = codes.len(), "Queued download job");

        let service = self.clone();
        let span = tracing::info_span!("download_job", job_id = %job_id, kind = kind.as_str());
        tokio::spawn(async move { service.run_job(job_id, kind, codes).await }.instrument(span));

        job_id
    }

    fn worker(&self) -> IngestResult<IngestWorker> {
        let tga = self
            .tga
            .clone()
            .ok_or_else(|| IngestError::Config(MISSING_CREDENTIALS.to_string()))?;

        Ok(IngestWorker::new(
            self.store.clone(),
            tga,
            self.parser.clone(),
            self.config.clone(),
        ))
    }

    /// Ingest a single code in the caller's task, without registering a job.
    ///
    /// Only a missing upstream configuration is an `Err`; item failures come
    /// back as [`ItemResult::Failed`].
    pub async fn sync_one(&self, kind: JobKind, code: &str) -> IngestResult<ItemResult> {
        let worker = self.worker()?;

        let result = match worker.process(kind, code).await {
            Ok(record_id) => {
                info!(code = %code, kind = kind.as_str(), record_id, "Synced item");
                ItemResult::Success {
                    code: code.to_string(),
                    record_id,
                }
            },
            Err(e) => {
                warn!(code = %code, kind = e.kind().as_str(), "Sync of {} failed: {}", code, e);
                ItemResult::Failed {
                    code: code.to_string(),
                    error: e.to_string(),
                    kind: e.kind(),
                }
            },
        };
        Ok(result)
    }

    /// Drive one job to a terminal state
    pub async fn run_job(&self, job_id: Uuid, kind: JobKind, codes: Vec<String>) {
        self.registry.update_job(job_id, |job| job.start()).await;

        let worker = match self.worker() {
            Ok(worker) => worker,
            Err(e) => {
                error!("{}", e);
                self.registry.update_job(job_id, |job| job.fail(e.to_string())).await;
                return;
            },
        };
        let auth_failure: Arc<OnceLock<TgaError>> = Arc::new(OnceLock::new());
        let concurrency = self.config.item_concurrency.max(1);

        let mut outcomes = stream::iter(codes.into_iter().map(|code| {
            let worker = worker.clone();
            let registry = self.registry.clone();
            let auth_failure = auth_failure.clone();
            async move {
                if let Some(err) = auth_failure.get() {
                    return (code, Err(IngestError::Upstream(err.clone())));
                }
                registry.update_job(job_id, |job| job.begin_item(&code)).await;

                let outcome = worker.process(kind, &code).await;
                if let Some(err) = outcome.as_ref().err().and_then(IngestError::auth_rejection) {
                    let _ = auth_failure.set(err.clone());
                }
                (code, outcome)
            }
        }))
        .buffered(concurrency);

        while let Some((code, outcome)) = outcomes.next().await {
            match outcome {
                Ok(record_id) => {
                    info!(code = %code, record_id, "Processed item");
                    self.registry
                        .update_job(job_id, |job| job.record_success(&code, record_id))
                        .await;
                },
                Err(e) => {
                    let message = e.to_string();
                    error!(code = %code, kind = e.kind().as_str(), "Error processing {}: {}", code, message);
                    self.registry
                        .update_job(job_id, |job| job.record_failure(&code, e.kind(), &message))
                        .await;
                },
            }
        }

        match auth_failure.get() {
            Some(err) => {
                warn!("Job aborted after upstream rejected credentials");
                let message = format!("TGA authentication failed: {}", err);
                self.registry.update_job(job_id, |job| job.fail(message)).await;
            },
            None => {
                self.registry.update_job(job_id, |job| job.complete()).await;
            },
        }

        if let Some(job) = self.registry.get_job(job_id).await {
            info!(
                status = ?job.status,
                processed = job.processed_items(),
                completed = job.completed_items,
                failed = job.failed_items,
                "Download job finished"
            );
        }
    }

    /// One page of upstream components annotated with catalog state
    pub async fn list_available(
        &self,
        kind: ComponentKind,
        filter: &str,
        page: u32,
        page_size: u32,
    ) -> IngestResult<AvailablePage> {
        let tga = self
            .tga
            .as_ref()
            .ok_or_else(|| IngestError::Config(MISSING_CREDENTIALS.to_string()))?;

        let request = SearchRequest::new([kind]).filter(filter).page(page, page_size);
        let result = tga.search_components(&request).await?;

        let codes: Vec<String> = result.components.iter().map(|c| c.code.clone()).collect();
        let status = self.store.processed_status(kind, &codes).await?;

        let items = result
            .components
            .into_iter()
            .map(|summary| {
                let flag = status.get(&summary.code).copied();
                AvailableComponent {
                    in_database: flag.is_some(),
                    processed: flag.is_some_and(|f| f == ProcessedFlag::Done),
                    summary,
                }
            })
            .collect();

        Ok(AvailablePage {
            items,
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        })
    }
}
