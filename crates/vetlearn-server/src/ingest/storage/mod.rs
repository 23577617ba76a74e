//! Ingest repository
//!
//! Idempotent upserts of catalog rows keyed by code, and the per-unit
//! replacement of elements and performance criteria. `PgIngestStore` is the
//! production backend; `MemoryIngestStore` keeps the same semantics in
//! process.

pub mod memory;
pub mod postgres;

pub use memory::MemoryIngestStore;
pub use postgres::PgIngestStore;

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use vetlearn_common::types::{ComponentKind, ProcessedFlag};

use super::models::{ComponentRecord, PackageRecord, ParsedElement, ReplaceSummary, UnitRecord};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    /// Unique or foreign-key violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_foreign_key_violation() {
                return StoreError::Constraint(db_err.message().to_string());
            }
        }
        StoreError::Db(err)
    }
}

#[async_trait]
pub trait IngestStore: Send + Sync {
    async fn upsert_training_package(&self, record: &PackageRecord) -> StoreResult<i64>;

    async fn upsert_qualification(&self, record: &ComponentRecord) -> StoreResult<i64>;

    async fn upsert_skillset(&self, record: &ComponentRecord) -> StoreResult<i64>;

    async fn upsert_unit(&self, record: &UnitRecord) -> StoreResult<i64>;

    /// Package whose code is the longest prefix of `unit_code`
    async fn find_package_id_for_unit(&self, unit_code: &str) -> StoreResult<Option<i64>>;

    /// Atomically replace the elements and criteria of a unit and mark it
    /// processed. `NotFound` when the unit row does not exist.
    async fn replace_unit_elements(
        &self,
        unit_id: i64,
        elements: &[ParsedElement],
    ) -> StoreResult<ReplaceSummary>;

    /// Keep the fetched assessment requirements document on the unit row.
    /// `NotFound` when the unit row does not exist.
    async fn store_assessment_requirements(&self, unit_id: i64, xml: &str) -> StoreResult<()>;

    /// Elements of a unit in ordinal insertion order
    async fn unit_elements(&self, unit_id: i64) -> StoreResult<Vec<ParsedElement>>;

    /// Processed flag of each stored code among `codes`; absent codes are not
    /// in the catalog
    async fn processed_status(
        &self,
        kind: ComponentKind,
        codes: &[String],
    ) -> StoreResult<HashMap<String, ProcessedFlag>>;

    async fn health_check(&self) -> StoreResult<()>;
}
