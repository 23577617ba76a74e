//! Training-component ingestion
//!
//! Pulls packages and units from training.gov.au, extracts unit elements and
//! performance criteria from the unit XML, and stores them in the catalog.
//!
//! # Architecture
//!
//! - **tga**: SOAP search/details client and XML downloads (`UPSTREAM_*`)
//! - **parser**: elements table extraction from unit XML
//! - **storage**: idempotent upserts and per-unit element replacement
//! - **worker**: per-item pipeline with retries
//! - **jobs**: bulk download jobs and the in-process registry
//! - **service**: job submission, background execution and listings
//! - **config**: worker tuning (`INGEST_*`)
//!
//! The HTTP surface lives in `features::{training_packages, units, download_jobs}`.

pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod parser;
pub mod retry;
pub mod service;
pub mod storage;
pub mod tga;
pub mod worker;

#[cfg(test)]
pub mod testing;

pub use config::{IngestConfig, RetryPolicy};
pub use errors::{IngestError, IngestErrorKind, IngestResult};
pub use jobs::{ItemResult, Job, JobFilter, JobKind, JobRegistry, JobStatus};
pub use parser::{parse_elements, ElementTableParser};
pub use service::{AvailableComponent, AvailablePage, IngestService};
pub use storage::{IngestStore, MemoryIngestStore, PgIngestStore, StoreError};
pub use worker::IngestWorker;
