//! training.gov.au upstream client
//!
//! Wraps the SOAP training component service (V12): paged search, component
//! details with releases and files, and raw XML downloads.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod soap;

pub use client::TgaClient;
pub use config::{Credentials, TgaConfig};
pub use error::{TgaError, TgaResult};
pub use models::{
    ComponentDetails, ComponentSummary, DetailOptions, Release, ReleaseFile, ReleaseFiles,
    SearchPage, SearchRequest,
};

use async_trait::async_trait;

/// Operations the ingest workers need from the upstream service
#[async_trait]
pub trait TgaApi: Send + Sync {
    async fn search_components(&self, request: &SearchRequest) -> TgaResult<SearchPage>;

    async fn get_details(&self, code: &str, options: DetailOptions) -> TgaResult<ComponentDetails>;

    /// Fetch a release file by name; missing or empty files are `NotFound`
    async fn download_xml(&self, filename: &str) -> TgaResult<Vec<u8>>;
}
