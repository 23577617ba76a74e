//! Per-item ingest failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::storage::StoreError;
use super::tga::TgaError;

/// Failure category reported in job results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IngestErrorKind {
    Config,
    Auth,
    Transport,
    NotFound,
    Malformed,
    ParseEmpty,
    #[serde(rename = "dbError")]
    Db,
}

impl IngestErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestErrorKind::Config => "config",
            IngestErrorKind::Auth => "auth",
            IngestErrorKind::Transport => "transport",
            IngestErrorKind::NotFound => "notFound",
            IngestErrorKind::Malformed => "malformed",
            IngestErrorKind::ParseEmpty => "parseEmpty",
            IngestErrorKind::Db => "dbError",
        }
    }
}

pub type IngestResult<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Upstream(#[from] TgaError),

    #[error("No elements found in XML for {code}")]
    ParseEmpty { code: String },

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            IngestError::Config(_) => IngestErrorKind::Config,
            IngestError::Upstream(TgaError::Auth { .. }) => IngestErrorKind::Auth,
            IngestError::Upstream(TgaError::Transport(_)) => IngestErrorKind::Transport,
            IngestError::Upstream(TgaError::NotFound(_)) => IngestErrorKind::NotFound,
            IngestError::Upstream(TgaError::Malformed(_)) => IngestErrorKind::Malformed,
            IngestError::ParseEmpty { .. } => IngestErrorKind::ParseEmpty,
            IngestError::Store(StoreError::NotFound(_)) => IngestErrorKind::NotFound,
            IngestError::Store(_) => IngestErrorKind::Db,
        }
    }

    /// Upstream credential rejection; it ends the whole job
    pub fn auth_rejection(&self) -> Option<&TgaError> {
        match self {
            IngestError::Upstream(err @ TgaError::Auth { .. }) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            IngestError::from(TgaError::Auth { status: 401 }).kind(),
            IngestErrorKind::Auth
        );
        assert_eq!(
            IngestError::from(TgaError::component_not_found("X")).kind(),
            IngestErrorKind::NotFound
        );
        assert_eq!(
            IngestError::ParseEmpty { code: "X".into() }.kind(),
            IngestErrorKind::ParseEmpty
        );
        assert_eq!(
            IngestError::from(StoreError::Constraint("dup".into())).kind(),
            IngestErrorKind::Db
        );
    }

    #[test]
    fn test_only_upstream_auth_is_a_rejection() {
        assert_eq!(
            IngestError::from(TgaError::Auth { status: 403 }).auth_rejection(),
            Some(&TgaError::Auth { status: 403 })
        );
        assert!(IngestError::Config("missing".into()).auth_rejection().is_none());
        assert!(IngestError::from(TgaError::Transport("timeout".into()))
            .auth_rejection()
            .is_none());
    }

    #[test]
    fn test_messages_pass_through() {
        let err = IngestError::from(TgaError::component_not_found("NOPE999"));
        assert_eq!(err.to_string(), "Component NOPE999 not found in TGA");
        assert_eq!(IngestErrorKind::Db.as_str(), "dbError");
    }

    #[test]
    fn test_wire_names_match_as_str() {
        for kind in [
            IngestErrorKind::Config,
            IngestErrorKind::Auth,
            IngestErrorKind::Transport,
            IngestErrorKind::NotFound,
            IngestErrorKind::Malformed,
            IngestErrorKind::ParseEmpty,
            IngestErrorKind::Db,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
        assert_eq!(
            serde_json::from_str::<IngestErrorKind>("\"dbError\"").unwrap(),
            IngestErrorKind::Db
        );
    }
}
