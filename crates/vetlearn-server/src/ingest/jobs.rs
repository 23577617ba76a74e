//! Bulk download jobs and the in-process job registry
//!
//! A job is created queued, moves to processing when its task starts and ends
//! completed (even when every item failed) or failed (configuration or
//! credential problems). Counters only ever grow and never exceed the item
//! count; `current_item` is set only while processing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::IngestErrorKind;

/// What a job downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Packages,
    Units,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Packages => "packages",
            JobKind::Units => "units",
        }
    }
}

impl std::str::FromStr for JobKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "packages" | "training-packages" | "training_packages" => Ok(JobKind::Packages),
            "units" => Ok(JobKind::Units),
            other => Err(format!("Unknown job kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(JobStatus::Queued),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!("Unknown job status: {}", other)),
        }
    }
}

/// Outcome of one item, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ItemResult {
    Success {
        code: String,
        /// Id of the package or unit row written
        record_id: i64,
    },
    Failed {
        code: String,
        error: String,
        kind: IngestErrorKind,
    },
}

impl ItemResult {
    pub fn code(&self) -> &str {
        match self {
            ItemResult::Success { code, .. } | ItemResult::Failed { code, .. } => code,
        }
    }
}

/// Snapshot of a bulk download job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub status: JobStatus,
    /// Operator who submitted the job
    pub user_id: Option<String>,
    /// Codes in submission order
    pub items: Vec<String>,
    pub total_items: usize,
    pub completed_items: usize,
    pub failed_items: usize,
    pub current_item: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
    pub results: Vec<ItemResult>,
}

impl Job {
    pub fn new(kind: JobKind, items: Vec<String>, user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: JobStatus::Queued,
            user_id,
            total_items: items.len(),
            items,
            completed_items: 0,
            failed_items: 0,
            current_item: None,
            started_at: Utc::now(),
            completed_at: None,
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    fn has_capacity(&self) -> bool {
        self.completed_items + self.failed_items < self.total_items
    }

    pub fn processed_items(&self) -> usize {
        self.completed_items + self.failed_items
    }

    /// Move a queued job to processing
    pub fn start(&mut self) {
        if self.status == JobStatus::Queued {
            self.status = JobStatus::Processing;
        }
    }

    /// Mark the item being worked on; ignored unless processing
    pub fn begin_item(&mut self, code: &str) {
        if self.status == JobStatus::Processing {
            self.current_item = Some(code.to_string());
        }
    }

    pub fn record_success(&mut self, code: &str, record_id: i64) {
        if self.status.is_terminal() || !self.has_capacity() {
            return;
        }
        self.completed_items += 1;
        self.results.push(ItemResult::Success {
            code: code.to_string(),
            record_id,
        });
    }

    pub fn record_failure(&mut self, code: &str, kind: IngestErrorKind, message: &str) {
        if self.status.is_terminal() || !self.has_capacity() {
            return;
        }
        self.failed_items += 1;
        self.errors
            .push(format!("Error processing {}: {}", code, message));
        self.results.push(ItemResult::Failed {
            code: code.to_string(),
            error: message.to_string(),
            kind,
        });
    }

    /// Finish normally, whatever the per-item outcomes were
    pub fn complete(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.current_item = None;
        self.completed_at = Some(Utc::now());
    }

    /// Abort the job with a job-level error
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.current_item = None;
        self.errors.push(message.into());
        self.completed_at = Some(Utc::now());
    }
}

/// Filter for [`JobRegistry::list_jobs`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub kind: Option<JobKind>,
    pub status: Option<JobStatus>,
}

impl JobFilter {
    fn matches(&self, job: &Job) -> bool {
        self.kind.map_or(true, |k| job.kind == k) && self.status.map_or(true, |s| job.status == s)
    }
}

/// Process-local job store. Clones share the same jobs.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_job(&self, kind: JobKind, items: Vec<String>, user_id: Option<String>) -> Uuid {
        let job = Job::new(kind, items, user_id);
        let id = job.id;
        self.jobs.write().await.insert(id, job);
        id
    }

    pub async fn get_job(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// Apply `f` to a job under the write lock. Returns false for unknown ids.
    pub async fn update_job<F>(&self, id: Uuid, f: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        match self.jobs.write().await.get_mut(&id) {
            Some(job) => {
                f(job);
                true
            },
            None => false,
        }
    }

    /// Matching jobs, newest first
    pub async fn list_jobs(&self, filter: JobFilter) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }
}
