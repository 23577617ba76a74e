//! VetLearn Server Library
//!
//! Operator API and ingestion core for the training-component catalog.
//!
//! # Overview
//!
//! - **ingest**: pulls packages and units from training.gov.au, parses unit
//!   elements and performance criteria, and stores them idempotently
//! - **features**: admin HTTP endpoints for listings, bulk downloads and job status
//! - **api**: router assembly, health check and server bootstrap
//! - **db**: connection pool and embedded migrations
//! - **middleware**: CORS, request tracing and the admin extractor
//!
//! # Example
//!
//! ```no_run
//! use vetlearn_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;
pub mod middleware;

pub use api::response::{AppError, ApiResult};
