//! Training package queries

pub mod list_available;

pub use list_available::{ListAvailableError, ListAvailablePackagesQuery};
