//! Catalog types shared between the ingest core and the HTTP layer

use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// Kind of national training component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    TrainingPackage,
    Qualification,
    Skillset,
    Unit,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::TrainingPackage,
        ComponentKind::Qualification,
        ComponentKind::Skillset,
        ComponentKind::Unit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::TrainingPackage => "training_package",
            ComponentKind::Qualification => "qualification",
            ComponentKind::Skillset => "skillset",
            ComponentKind::Unit => "unit",
        }
    }

    /// Name of the table holding rows of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            ComponentKind::TrainingPackage => "training_packages",
            ComponentKind::Qualification => "qualifications",
            ComponentKind::Skillset => "skillsets",
            ComponentKind::Unit => "units",
        }
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "training_package" | "trainingpackage" | "package" => Ok(ComponentKind::TrainingPackage),
            "qualification" => Ok(ComponentKind::Qualification),
            "skillset" | "skill_set" => Ok(ComponentKind::Skillset),
            "unit" => Ok(ComponentKind::Unit),
            _ => Err(CommonError::invalid("component kind", s)),
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a row's XML-derived detail has been materialized.
///
/// Stored as a single character to stay compatible with the legacy catalog:
/// `N` for pending, `Y` for done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcessedFlag {
    #[default]
    #[serde(rename = "N")]
    Pending,
    #[serde(rename = "Y")]
    Done,
}

impl ProcessedFlag {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ProcessedFlag::Pending => "N",
            ProcessedFlag::Done => "Y",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, ProcessedFlag::Done)
    }
}

impl std::str::FromStr for ProcessedFlag {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "N" | "n" => Ok(ProcessedFlag::Pending),
            "Y" | "y" => Ok(ProcessedFlag::Done),
            other => Err(CommonError::invalid("processed flag", other)),
        }
    }
}

impl std::fmt::Display for ProcessedFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}
