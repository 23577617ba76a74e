//! Typed views of upstream search and detail results

use serde::{Deserialize, Serialize};
use vetlearn_common::types::ComponentKind;

/// Paged component search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub filter: String,
    pub kinds: Vec<ComponentKind>,
    pub page: u32,
    pub page_size: u32,
    pub include_superseded: bool,
    pub include_deleted: bool,
    /// Match `filter` against component codes rather than titles
    pub search_by_code: bool,
}

impl SearchRequest {
    pub fn new(kinds: impl IntoIterator<Item = ComponentKind>) -> Self {
        Self {
            filter: String::new(),
            kinds: kinds.into_iter().collect(),
            page: 1,
            page_size: 100,
            include_superseded: true,
            include_deleted: false,
            search_by_code: true,
        }
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn includes(&self, kind: ComponentKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub code: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
}

impl ComponentSummary {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            description: None,
            status: None,
            component_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub components: Vec<ComponentSummary>,
    pub page: u32,
    pub page_size: u32,
    /// Total hit count when the service reports it
    pub total: Option<u64>,
}

/// Which optional sections a details request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailOptions {
    pub show_files: bool,
    pub show_releases: bool,
}

impl Default for DetailOptions {
    fn default() -> Self {
        Self {
            show_files: true,
            show_releases: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDetails {
    pub code: String,
    pub title: String,
    /// Newest first, as returned upstream
    pub releases: Vec<Release>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub release_number: Option<String>,
    pub release_date: Option<String>,
    pub files: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    pub relative_path: Option<String>,
}

impl ReleaseFile {
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            relative_path: None,
        }
    }
}

/// XML documents of a release, split by role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFiles {
    pub main: Option<String>,
    pub assessment: Option<String>,
}

impl ReleaseFiles {
    const ASSESSMENT_MARKER: &'static str = "AssessmentRequirements";

    /// Keep `.xml` files; names containing `AssessmentRequirements` are the
    /// assessment document, the first other one is the main document.
    pub fn from_files(files: &[ReleaseFile]) -> Self {
        let mut selected = ReleaseFiles::default();

        for file in files {
            let name = file.filename.trim();
            if !name.to_ascii_lowercase().ends_with(".xml") {
                continue;
            }
            if name.contains(Self::ASSESSMENT_MARKER) {
                selected.assessment.get_or_insert_with(|| name.to_string());
            } else {
                selected.main.get_or_insert_with(|| name.to_string());
            }
        }

        selected
    }
}

impl ComponentDetails {
    /// Latest release, which upstream lists first
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.first()
    }

    pub fn latest_files(&self) -> ReleaseFiles {
        self.latest_release()
            .map(|release| ReleaseFiles::from_files(&release.files))
            .unwrap_or_default()
    }
}
