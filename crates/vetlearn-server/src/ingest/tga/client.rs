//! HTTP client for the training component SOAP service

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::config::{Credentials, TgaConfig};
use super::error::{TgaError, TgaResult};
use super::models::{ComponentDetails, DetailOptions, SearchPage, SearchRequest};
use super::soap;
use super::TgaApi;

/// Authenticated client for search, details and file downloads
pub struct TgaClient {
    client: Client,
    config: TgaConfig,
    credentials: Credentials,
    endpoint: String,
}

impl TgaClient {
    pub fn new(config: TgaConfig, credentials: Credentials) -> TgaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let endpoint = config.endpoint_url();

        Ok(Self {
            client,
            config,
            credentials,
            endpoint,
        })
    }

    /// Build a client from configuration carrying credentials
    pub fn from_config(config: TgaConfig) -> Option<TgaResult<Self>> {
        let credentials = config.credentials.clone()?;
        Some(Self::new(config, credentials))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, operation: &str, body: String) -> TgaResult<String> {
        debug!(operation, endpoint = %self.endpoint, "Calling TGA SOAP operation");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", soap::soap_action(operation)))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        classify_status(status, text)
    }
}

/// Map an HTTP status onto the error taxonomy, passing through bodies that
/// still need envelope parsing. 5xx responses carrying a SOAP fault are
/// handed on so the fault text decides between NotFound and Malformed.
fn classify_status(status: StatusCode, body: String) -> TgaResult<String> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(TgaError::Auth {
            status: status.as_u16(),
        });
    }
    if status.is_success() {
        return Ok(body);
    }
    if status.is_server_error() {
        if soap::is_fault(&body) {
            return Ok(body);
        }
        return Err(TgaError::Transport(format!("HTTP {}", status)));
    }
    Err(TgaError::Malformed(format!("unexpected HTTP {}", status)))
}

#[async_trait]
impl TgaApi for TgaClient {
    async fn search_components(&self, request: &SearchRequest) -> TgaResult<SearchPage> {
        let body = self.call("Search", soap::search_envelope(request)).await?;
        let page = soap::parse_search_response(&body, request)?;

        debug!(
            filter = %request.filter,
            page = page.page,
            hits = page.components.len(),
            "TGA search completed"
        );
        Ok(page)
    }

    async fn get_details(&self, code: &str, options: DetailOptions) -> TgaResult<ComponentDetails> {
        let body = self
            .call("GetDetails", soap::details_envelope(code, options))
            .await?;
        soap::parse_details_response(&body, code)
    }

    async fn download_xml(&self, filename: &str) -> TgaResult<Vec<u8>> {
        let url = self.config.file_url(filename);
        info!("Downloading component XML from: {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => {
                return Err(TgaError::NotFound(format!("XML file {} not found", filename)))
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(TgaError::Auth {
                    status: status.as_u16(),
                })
            },
            s if s.is_server_error() => {
                return Err(TgaError::Transport(format!("HTTP {} downloading {}", s, filename)))
            },
            s if !s.is_success() => {
                return Err(TgaError::Malformed(format!("unexpected HTTP {} downloading {}", s, filename)))
            },
            _ => {},
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TgaError::NotFound(format!("XML file {} is empty", filename)));
        }

        debug!("Downloaded {} ({} KB)", filename, bytes.len() / 1024);
        Ok(bytes.to_vec())
    }
}
