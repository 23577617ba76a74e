//! VetLearn Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging setup, and error handling for the VetLearn workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`CommonError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by `LOG_*` environment variables
//! - **Types**: catalog enums shared between the ingest core and the HTTP layer
//!
//! # Example
//!
//! ```no_run
//! use vetlearn_common::types::ComponentKind;
//!
//! let kind: ComponentKind = "unit".parse().unwrap();
//! assert_eq!(kind.as_str(), "unit");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
