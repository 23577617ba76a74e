//! Shared utilities and types for feature modules
//!
//! # Contents
//!
//! - **pagination**: `page`/`page_size` query parameters of the listing endpoints
//! - **validation**: code list normalization for bulk downloads
//! - **test_helpers**: in-memory router fixtures (test-only)

pub mod pagination;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use pagination::PageParams;
pub use validation::{normalize_codes, CodeListError};
