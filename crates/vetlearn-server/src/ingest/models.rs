//! Data models for ingestion
//!
//! Row payloads handed to the ingest store and the element tree produced by
//! the unit XML parser.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upsert payload for a training package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub xml_file: Option<String>,
}

/// Upsert payload for a qualification or a skillset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub code: String,
    pub training_package_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub xml_file: Option<String>,
}

/// Upsert payload for a unit of competency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub code: String,
    pub training_package_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub xml_file: Option<String>,
    pub assessment_requirements_file: Option<String>,
}

/// One element of a unit with its performance criteria, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedElement {
    /// Ordinal exactly as written in the source, e.g. "1" or "A1"
    pub element_number: String,
    pub element_text: String,
    pub performance_criteria: Vec<ParsedCriterion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCriterion {
    /// Ordinal exactly as written in the source, e.g. "1.1" or "A1.2"
    pub pc_number: String,
    pub pc_text: String,
}

impl ParsedElement {
    pub fn new(element_number: impl Into<String>, element_text: impl Into<String>) -> Self {
        Self {
            element_number: element_number.into(),
            element_text: element_text.into(),
            performance_criteria: Vec::new(),
        }
    }

    pub fn with_criterion(mut self, pc_number: impl Into<String>, pc_text: impl Into<String>) -> Self {
        self.performance_criteria.push(ParsedCriterion {
            pc_number: pc_number.into(),
            pc_text: pc_text.into(),
        });
        self
    }
}

/// Row counts written by one element replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceSummary {
    pub elements: usize,
    pub criteria: usize,
}

impl ReplaceSummary {
    pub fn of(elements: &[ParsedElement]) -> Self {
        Self {
            elements: elements.len(),
            criteria: elements.iter().map(|e| e.performance_criteria.len()).sum(),
        }
    }
}

/// Parse an upstream release date.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` taken as UTC, or a
/// bare date. Anything else yields `None`.
pub fn parse_release_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
