//! Download job queries

pub mod get_job;
pub mod list_jobs;

pub use get_job::{GetDownloadJobError, GetDownloadJobQuery};
pub use list_jobs::{ListDownloadJobsError, ListDownloadJobsQuery, ListDownloadJobsResponse};
