//! In-process ingest store
//!
//! Mirrors the Postgres semantics: upserts keyed by code with null-preserving
//! updates, duplicate element and criterion ordinals rejected like the unique
//! constraints, and all-or-nothing element replacement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use vetlearn_common::types::{ComponentKind, ProcessedFlag};

use super::{IngestStore, StoreError, StoreResult};
use crate::ingest::models::{
    ComponentRecord, PackageRecord, ParsedElement, ReplaceSummary, UnitRecord,
};

/// Stored catalog row, shared by all four kinds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRow {
    pub id: i64,
    pub code: String,
    pub training_package_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub xml_file: Option<String>,
    pub assessment_requirements_file: Option<String>,
    pub assessment_requirements_xml: Option<String>,
    pub processed: ProcessedFlag,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    rows: HashMap<ComponentKind, HashMap<String, StoredRow>>,
    elements: HashMap<i64, Vec<ParsedElement>>,
}

impl Tables {
    fn upsert(&mut self, kind: ComponentKind, incoming: StoredRow) -> i64 {
        self.next_id += 1;
        let fresh_id = self.next_id;
        let table = self.rows.entry(kind).or_default();

        match table.get_mut(&incoming.code) {
            Some(row) => {
                row.title = incoming.title;
                if kind == ComponentKind::Unit {
                    row.training_package_id = incoming.training_package_id.or(row.training_package_id);
                } else if incoming.training_package_id.is_some() {
                    row.training_package_id = incoming.training_package_id;
                }
                row.description = incoming.description.or(row.description.take());
                row.status = incoming.status.or(row.status.take());
                row.release_date = incoming.release_date.or(row.release_date);
                row.xml_file = incoming.xml_file.or(row.xml_file.take());
                row.assessment_requirements_file = incoming
                    .assessment_requirements_file
                    .or(row.assessment_requirements_file.take());
                row.processed = ProcessedFlag::Pending;
                row.id
            },
            None => {
                let code = incoming.code.clone();
                table.insert(
                    code,
                    StoredRow {
                        id: fresh_id,
                        processed: ProcessedFlag::Pending,
                        visible: true,
                        ..incoming
                    },
                );
                fresh_id
            },
        }
    }

    fn unit_mut(&mut self, unit_id: i64) -> Option<&mut StoredRow> {
        self.rows
            .get_mut(&ComponentKind::Unit)?
            .values_mut()
            .find(|row| row.id == unit_id)
    }

    fn package_exists(&self, id: i64) -> bool {
        self.rows
            .get(&ComponentKind::TrainingPackage)
            .is_some_and(|t| t.values().any(|row| row.id == id))
    }
}

/// Memory-backed [`IngestStore`]
#[derive(Clone, Default)]
pub struct MemoryIngestStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryIngestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored row
    pub async fn row(&self, kind: ComponentKind, code: &str) -> Option<StoredRow> {
        let tables = self.inner.read().await;
        tables.rows.get(&kind)?.get(code).cloned()
    }

    pub async fn count(&self, kind: ComponentKind) -> usize {
        let tables = self.inner.read().await;
        tables.rows.get(&kind).map_or(0, |t| t.len())
    }

    fn check_package(tables: &Tables, id: Option<i64>) -> StoreResult<()> {
        match id {
            Some(id) if !tables.package_exists(id) => Err(StoreError::Constraint(format!(
                "training package {} does not exist",
                id
            ))),
            _ => Ok(()),
        }
    }

    async fn upsert_component(&self, kind: ComponentKind, record: &ComponentRecord) -> StoreResult<i64> {
        let mut tables = self.inner.write().await;
        Self::check_package(&tables, Some(record.training_package_id))?;

        Ok(tables.upsert(
            kind,
            StoredRow {
                code: record.code.clone(),
                training_package_id: Some(record.training_package_id),
                title: record.title.clone(),
                description: record.description.clone(),
                status: record.status.clone(),
                release_date: record.release_date,
                xml_file: record.xml_file.clone(),
                ..Default::default()
            },
        ))
    }
}

/// Ordinal uniqueness as enforced by the relational constraints
fn check_ordinals(elements: &[ParsedElement]) -> StoreResult<()> {
    let mut seen = HashSet::new();
    for element in elements {
        if !seen.insert(element.element_number.as_str()) {
            return Err(StoreError::Constraint(format!(
                "duplicate element number {}",
                element.element_number
            )));
        }
        let mut pcs = HashSet::new();
        for pc in &element.performance_criteria {
            if !pcs.insert(pc.pc_number.as_str()) {
                return Err(StoreError::Constraint(format!(
                    "duplicate performance criterion {} in element {}",
                    pc.pc_number, element.element_number
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl IngestStore for MemoryIngestStore {
    async fn upsert_training_package(&self, record: &PackageRecord) -> StoreResult<i64> {
        let mut tables = self.inner.write().await;
        Ok(tables.upsert(
            ComponentKind::TrainingPackage,
            StoredRow {
                code: record.code.clone(),
                title: record.title.clone(),
                description: record.description.clone(),
                status: record.status.clone(),
                release_date: record.release_date,
                xml_file: record.xml_file.clone(),
                ..Default::default()
            },
        ))
    }

    async fn upsert_qualification(&self, record: &ComponentRecord) -> StoreResult<i64> {
        self.upsert_component(ComponentKind::Qualification, record).await
    }

    async fn upsert_skillset(&self, record: &ComponentRecord) -> StoreResult<i64> {
        self.upsert_component(ComponentKind::Skillset, record).await
    }

    async fn upsert_unit(&self, record: &UnitRecord) -> StoreResult<i64> {
        let mut tables = self.inner.write().await;
        Self::check_package(&tables, record.training_package_id)?;

        Ok(tables.upsert(
            ComponentKind::Unit,
            StoredRow {
                code: record.code.clone(),
                training_package_id: record.training_package_id,
                title: record.title.clone(),
                description: record.description.clone(),
                status: record.status.clone(),
                release_date: record.release_date,
                xml_file: record.xml_file.clone(),
                assessment_requirements_file: record.assessment_requirements_file.clone(),
                ..Default::default()
            },
        ))
    }

    async fn find_package_id_for_unit(&self, unit_code: &str) -> StoreResult<Option<i64>> {
        let tables = self.inner.read().await;
        Ok(tables
            .rows
            .get(&ComponentKind::TrainingPackage)
            .and_then(|packages| {
                packages
                    .values()
                    .filter(|row| unit_code.starts_with(row.code.as_str()))
                    .max_by_key(|row| row.code.len())
                    .map(|row| row.id)
            }))
    }

    async fn replace_unit_elements(
        &self,
        unit_id: i64,
        elements: &[ParsedElement],
    ) -> StoreResult<ReplaceSummary> {
        let mut tables = self.inner.write().await;

        if tables.unit_mut(unit_id).is_none() {
            return Err(StoreError::NotFound(format!("Unit {} not found", unit_id)));
        }
        check_ordinals(elements)?;

        tables.elements.insert(unit_id, elements.to_vec());
        if let Some(unit) = tables.unit_mut(unit_id) {
            unit.processed = ProcessedFlag::Done;
        }

        Ok(ReplaceSummary::of(elements))
    }

    async fn store_assessment_requirements(&self, unit_id: i64, xml: &str) -> StoreResult<()> {
        let mut tables = self.inner.write().await;
        let unit = tables
            .unit_mut(unit_id)
            .ok_or_else(|| StoreError::NotFound(format!("Unit {} not found", unit_id)))?;
        unit.assessment_requirements_xml = Some(xml.to_string());
        Ok(())
    }

    async fn unit_elements(&self, unit_id: i64) -> StoreResult<Vec<ParsedElement>> {
        let tables = self.inner.read().await;
        Ok(tables.elements.get(&unit_id).cloned().unwrap_or_default())
    }

    async fn processed_status(
        &self,
        kind: ComponentKind,
        codes: &[String],
    ) -> StoreResult<HashMap<String, ProcessedFlag>> {
        let tables = self.inner.read().await;
        let Some(table) = tables.rows.get(&kind) else {
            return Ok(HashMap::new());
        };

        Ok(codes
            .iter()
            .filter_map(|code| table.get(code).map(|row| (code.clone(), row.processed)))
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
