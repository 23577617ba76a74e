//! Ingestion configuration
//!
//! Worker tuning read from `INGEST_*` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on items processed in parallel within one job
pub const MAX_ITEM_CONCURRENCY: usize = 4;

/// Page size used when listing the children of a training package
pub const DEFAULT_CHILD_PAGE_SIZE: u32 = 500;

/// Bounded exponential backoff for retriable upstream failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let millis = self
            .base_delay_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_delay_ms);
        Duration::from_millis(millis)
    }

    /// Policy that never sleeps, for tests
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

/// Main ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Items of one job processed concurrently (1 = strictly sequential)
    pub item_concurrency: usize,
    pub retry: RetryPolicy,
    /// Also download the assessment requirements XML of a unit when present
    pub fetch_assessment_xml: bool,
    /// Page size for unit/qualification/skillset searches under a package
    pub package_child_page_size: u32,
}

impl IngestConfig {
    /// Load ingestion configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let config = Self {
            item_concurrency: env_parse("INGEST_ITEM_CONCURRENCY", defaults.item_concurrency),
            retry: RetryPolicy {
                max_retries: env_parse("INGEST_MAX_RETRIES", defaults.retry.max_retries),
                base_delay_ms: env_parse("INGEST_RETRY_BASE_DELAY_MS", defaults.retry.base_delay_ms),
                max_delay_ms: env_parse("INGEST_RETRY_MAX_DELAY_MS", defaults.retry.max_delay_ms),
            },
            fetch_assessment_xml: env_parse(
                "INGEST_FETCH_ASSESSMENT_XML",
                defaults.fetch_assessment_xml,
            ),
            package_child_page_size: env_parse(
                "INGEST_PACKAGE_CHILD_PAGE_SIZE",
                defaults.package_child_page_size,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.item_concurrency == 0 || self.item_concurrency > MAX_ITEM_CONCURRENCY {
            anyhow::bail!(
                "INGEST_ITEM_CONCURRENCY must be between 1 and {}, got {}",
                MAX_ITEM_CONCURRENCY,
                self.item_concurrency
            );
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            anyhow::bail!(
                "INGEST_RETRY_BASE_DELAY_MS ({}) cannot exceed INGEST_RETRY_MAX_DELAY_MS ({})",
                self.retry.base_delay_ms,
                self.retry.max_delay_ms
            );
        }
        if self.package_child_page_size == 0 {
            anyhow::bail!("INGEST_PACKAGE_CHILD_PAGE_SIZE must be greater than 0");
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            item_concurrency: 1,
            retry: RetryPolicy::default(),
            fetch_assessment_xml: false,
            package_child_page_size: DEFAULT_CHILD_PAGE_SIZE,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
