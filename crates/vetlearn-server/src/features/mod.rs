//! Feature modules implementing the operator API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes. Commands and queries are plain data types marked with the
//! `mediator` `Request` trait and handled by a standalone `handle` function.
//!
//! # Features
//!
//! - **training_packages**: upstream package listing and package downloads
//! - **units**: upstream unit listing and unit downloads
//! - **download_jobs**: job submission, status and listing shared by both
//!
//! Every route requires the admin role (see [`crate::middleware::AdminUser`]).

pub mod download_jobs;
pub mod shared;
pub mod training_packages;
pub mod units;

use axum::Router;

use crate::ingest::IngestService;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub ingest: IngestService,
}

/// All feature routes, relative to the `/api` mount point
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(training_packages::training_packages_routes())
        .merge(units::units_routes())
        .merge(download_jobs::download_jobs_routes())
        .with_state(state.ingest)
}
