//! Download jobs feature module
//!
//! Submission and status of bulk download jobs. The per-kind endpoints in
//! `training_packages` and `units` delegate to the commands and queries here;
//! this module also serves the cross-kind job listing.

pub mod commands;
pub mod queries;
pub mod routes;


pub use routes::download_jobs_routes;
