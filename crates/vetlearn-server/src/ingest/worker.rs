//! Per-item ingest pipeline
//!
//! Each code goes through `resolving -> fetchingXml -> parsing -> persisting
//! -> done`; any stage may fail the item with an [`IngestError`]. Packages
//! skip the XML stages and fan out to their child components instead.

use std::sync::Arc;
use tracing::{debug, info, warn};
use vetlearn_common::types::ComponentKind;

use super::config::IngestConfig;
use super::errors::{IngestError, IngestResult};
use super::jobs::JobKind;
use super::models::{parse_release_date, ComponentRecord, PackageRecord, UnitRecord};
use super::parser::ElementTableParser;
use super::retry::with_retry;
use super::storage::IngestStore;
use super::tga::{ComponentDetails, DetailOptions, SearchRequest, TgaApi, TgaError};

/// Stage of one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    Resolving,
    FetchingXml,
    Parsing,
    Persisting,
    Done,
}

impl ItemStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStage::Resolving => "resolving",
            ItemStage::FetchingXml => "fetchingXml",
            ItemStage::Parsing => "parsing",
            ItemStage::Persisting => "persisting",
            ItemStage::Done => "done",
        }
    }
}

/// Runs single items against the upstream service and the store
#[derive(Clone)]
pub struct IngestWorker {
    store: Arc<dyn IngestStore>,
    tga: Arc<dyn TgaApi>,
    parser: Arc<ElementTableParser>,
    config: IngestConfig,
}

impl IngestWorker {
    pub fn new(
        store: Arc<dyn IngestStore>,
        tga: Arc<dyn TgaApi>,
        parser: Arc<ElementTableParser>,
        config: IngestConfig,
    ) -> Self {
        Self {
            store,
            tga,
            parser,
            config,
        }
    }

    /// Ingest one code; returns the id of the package or unit row written
    pub async fn process(&self, kind: JobKind, code: &str) -> IngestResult<i64> {
        match kind {
            JobKind::Packages => self.ingest_package(code).await,
            JobKind::Units => self.ingest_unit(code).await,
        }
    }

    fn enter(&self, code: &str, stage: ItemStage) {
        debug!(code = %code, stage = stage.as_str(), "Item stage");
    }

    async fn resolve(&self, code: &str) -> IngestResult<ComponentDetails> {
        let details = with_retry(&self.config.retry, "GetDetails", || {
            self.tga.get_details(code, DetailOptions::default())
        })
        .await?;
        Ok(details)
    }

    async fn download(&self, filename: &str) -> IngestResult<Vec<u8>> {
        let bytes = with_retry(&self.config.retry, "XML download", || {
            self.tga.download_xml(filename)
        })
        .await?;
        Ok(bytes)
    }

    pub async fn ingest_unit(&self, code: &str) -> IngestResult<i64> {
        self.enter(code, ItemStage::Resolving);
        let details = self.resolve(code).await?;
        let files = details.latest_files();
        let release_date = details
            .latest_release()
            .and_then(|r| r.release_date.as_deref())
            .and_then(parse_release_date);
        let training_package_id = self.store.find_package_id_for_unit(&details.code).await?;

        let unit_id = self
            .store
            .upsert_unit(&UnitRecord {
                code: details.code.clone(),
                training_package_id,
                title: details.title.clone(),
                release_date,
                xml_file: files.main.clone(),
                assessment_requirements_file: files.assessment.clone(),
                ..Default::default()
            })
            .await?;

        self.enter(code, ItemStage::FetchingXml);
        let main = files.main.as_deref().ok_or_else(|| {
            IngestError::Upstream(TgaError::NotFound(format!("No XML file found for unit {}", code)))
        })?;
        let xml = self.download(main).await?;

        if self.config.fetch_assessment_xml {
            if let Some(assessment) = files.assessment.as_deref() {
                self.fetch_assessment(unit_id, code, assessment).await;
            }
        }

        self.enter(code, ItemStage::Parsing);
        let elements = self.parser.parse(&xml);
        if elements.is_empty() {
            return Err(IngestError::ParseEmpty {
                code: code.to_string(),
            });
        }

        self.enter(code, ItemStage::Persisting);
        let summary = self.store.replace_unit_elements(unit_id, &elements).await?;

        self.enter(code, ItemStage::Done);
        info!(
            code = %code,
            unit_id,
            elements = summary.elements,
            criteria = summary.criteria,
            "Unit ingested"
        );
        Ok(unit_id)
    }

    /// Best effort: a missing or unstorable assessment document only warns
    async fn fetch_assessment(&self, unit_id: i64, code: &str, filename: &str) {
        let bytes = match self.download(filename).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(code = %code, "Assessment requirements unavailable: {}", e);
                return;
            },
        };

        let xml = String::from_utf8_lossy(&bytes);
        match self.store.store_assessment_requirements(unit_id, &xml).await {
            Ok(()) => debug!(code = %code, bytes = bytes.len(), "Stored assessment requirements"),
            Err(e) => warn!(code = %code, "Assessment requirements not stored: {}", e),
        }
    }

    pub async fn ingest_package(&self, code: &str) -> IngestResult<i64> {
        self.enter(code, ItemStage::Resolving);
        let details = self.resolve(code).await?;
        let release_date = details
            .latest_release()
            .and_then(|r| r.release_date.as_deref())
            .and_then(parse_release_date);

        self.enter(code, ItemStage::Persisting);
        let package_id = self
            .store
            .upsert_training_package(&PackageRecord {
                code: details.code.clone(),
                title: details.title.clone(),
                release_date,
                xml_file: details.latest_files().main,
                ..Default::default()
            })
            .await?;

        for kind in [ComponentKind::Unit, ComponentKind::Qualification, ComponentKind::Skillset] {
            match self.ingest_children(&details.code, package_id, kind).await {
                Ok(count) => info!(package = %details.code, kind = %kind, count, "Stored package children"),
                Err(e) => warn!(package = %details.code, kind = %kind, "Child listing failed: {}", e),
            }
        }

        self.enter(code, ItemStage::Done);
        Ok(package_id)
    }

    /// Upsert the children of one kind listed under a package code
    async fn ingest_children(
        &self,
        package_code: &str,
        package_id: i64,
        kind: ComponentKind,
    ) -> IngestResult<usize> {
        let request = SearchRequest::new([kind])
            .filter(package_code)
            .page(1, self.config.package_child_page_size);

        let page = with_retry(&self.config.retry, "Search", || {
            self.tga.search_components(&request)
        })
        .await?;

        let mut stored = 0;
        for summary in page
            .components
            .into_iter()
            .filter(|c| c.code.starts_with(package_code))
        {
            match kind {
                ComponentKind::Unit => {
                    self.store
                        .upsert_unit(&UnitRecord {
                            code: summary.code,
                            training_package_id: Some(package_id),
                            title: summary.title,
                            description: summary.description,
                            status: summary.status,
                            ..Default::default()
                        })
                        .await?;
                },
                ComponentKind::Qualification | ComponentKind::Skillset => {
                    let record = ComponentRecord {
                        code: summary.code,
                        training_package_id: package_id,
                        title: summary.title,
                        description: summary.description,
                        status: summary.status,
                        ..Default::default()
                    };
                    if kind == ComponentKind::Qualification {
                        self.store.upsert_qualification(&record).await?;
                    } else {
                        self.store.upsert_skillset(&record).await?;
                    }
                },
                ComponentKind::TrainingPackage => continue,
            }
            stored += 1;
        }

        Ok(stored)
    }
}
