//! Training packages feature module
//!
//! Upstream package listing, bulk package downloads and single-package sync.
//! A package download also pulls the package's units, qualifications and
//! skillsets.

pub mod queries;
pub mod routes;

#[cfg(test)]
mod routes_test;

pub use routes::training_packages_routes;
