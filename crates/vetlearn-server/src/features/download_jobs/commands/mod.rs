//! Download job commands

pub mod submit;
pub mod sync;

pub use submit::{SubmitDownloadCommand, SubmitDownloadError, SubmitDownloadResponse};
pub use sync::{SyncComponentCommand, SyncComponentError};
