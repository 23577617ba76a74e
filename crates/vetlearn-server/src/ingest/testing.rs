//! Canned upstream for worker, service and route tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use vetlearn_common::types::ComponentKind;

use super::models::ParsedElement;
use super::tga::{
    ComponentDetails, ComponentSummary, DetailOptions, Release, ReleaseFile, SearchPage,
    SearchRequest, TgaApi, TgaError, TgaResult,
};

/// Render a unit document whose elements table yields `elements`
pub fn unit_xml(elements: &[ParsedElement]) -> String {
    let mut rows = String::new();
    for element in elements {
        let mut criteria = element.performance_criteria.iter();
        match criteria.next() {
            Some(pc) => rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                element.element_number, element.element_text, pc.pc_number, pc.pc_text
            )),
            None => rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                element.element_number, element.element_text
            )),
        }
        for pc in criteria {
            rows.push_str(&format!(
                "<tr><td></td><td></td><td>{}</td><td>{}</td></tr>",
                pc.pc_number, pc.pc_text
            ));
        }
    }

    format!(
        "<Unit><table>\
         <tr><td>Elements</td><td>Performance criteria</td></tr>\
         <tr><td>Elements describe the outcomes.</td><td>Criteria describe the performance.</td></tr>\
         {}</table></Unit>",
        rows
    )
}

#[derive(Default)]
struct Canned {
    details: HashMap<String, ComponentDetails>,
    files: HashMap<String, Vec<u8>>,
    hits: Vec<(ComponentKind, ComponentSummary)>,
    failing_search: bool,
    auth_failure: bool,
}

/// In-memory [`TgaApi`]
#[derive(Clone, Default)]
pub struct FakeTga {
    canned: Arc<Canned>,
    transient_failures: Arc<AtomicU32>,
    details_calls: Arc<AtomicU32>,
}

impl FakeTga {
    pub fn new() -> Self {
        Self::default()
    }

    fn canned_mut(&mut self) -> &mut Canned {
        Arc::get_mut(&mut self.canned).expect("configure FakeTga before sharing it")
    }

    fn with_details(mut self, code: &str, files: &[&str]) -> Self {
        self.canned_mut().details.insert(
            code.to_string(),
            ComponentDetails {
                code: code.to_string(),
                title: format!("{} title", code),
                releases: vec![Release {
                    release_number: Some("1".into()),
                    release_date: Some("2020-01-15T00:00:00".into()),
                    files: files.iter().map(|f| ReleaseFile::named(*f)).collect(),
                }],
            },
        );
        self
    }

    /// Unit with a main and an assessment document; the main one holds `xml`
    pub fn with_unit(self, code: &str, xml: impl Into<String>) -> Self {
        let main = format!("{}_R1.xml", code);
        let assessment = format!("{}_AssessmentRequirements_R1.xml", code);
        let mut fake = self.with_details(code, &[assessment.as_str(), main.as_str()]);
        let canned = fake.canned_mut();
        canned.files.insert(main, xml.into().into_bytes());
        canned
            .files
            .insert(assessment, b"<AssessmentRequirements/>".to_vec());
        fake
    }

    pub fn with_package(self, code: &str) -> Self {
        let main = format!("{}_R1.xml", code);
        self.with_details(code, &[main.as_str()])
    }

    pub fn with_search_hit(mut self, kind: ComponentKind, summary: ComponentSummary) -> Self {
        self.canned_mut().hits.push((kind, summary));
        self
    }

    /// Fail the next `n` details calls with a transport error
    pub fn with_transient_failures(self, n: u32) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.canned_mut().failing_search = true;
        self
    }

    /// Reject every call as unauthenticated
    pub fn with_auth_failure(mut self) -> Self {
        self.canned_mut().auth_failure = true;
        self
    }

    pub fn details_calls(&self) -> u32 {
        self.details_calls.load(Ordering::SeqCst)
    }

    fn check_auth(&self) -> TgaResult<()> {
        if self.canned.auth_failure {
            return Err(TgaError::Auth { status: 401 });
        }
        Ok(())
    }
}

#[async_trait]
impl TgaApi for FakeTga {
    async fn search_components(&self, request: &SearchRequest) -> TgaResult<SearchPage> {
        self.check_auth()?;
        if self.canned.failing_search {
            return Err(TgaError::Transport("search unavailable".into()));
        }

        let matching: Vec<ComponentSummary> = self
            .canned
            .hits
            .iter()
            .filter(|(kind, summary)| {
                request.includes(*kind) && summary.code.starts_with(request.filter.as_str())
            })
            .map(|(_, summary)| summary.clone())
            .collect();

        let total = matching.len() as u64;
        let skip = (request.page.saturating_sub(1) * request.page_size) as usize;

        Ok(SearchPage {
            components: matching
                .into_iter()
                .skip(skip)
                .take(request.page_size as usize)
                .collect(),
            page: request.page,
            page_size: request.page_size,
            total: Some(total),
        })
    }

    async fn get_details(&self, code: &str, _options: DetailOptions) -> TgaResult<ComponentDetails> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.check_auth()?;

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(TgaError::Transport("connection reset".into()));
        }

        self.canned
            .details
            .get(code)
            .cloned()
            .ok_or_else(|| TgaError::component_not_found(code))
    }

    async fn download_xml(&self, filename: &str) -> TgaResult<Vec<u8>> {
        self.check_auth()?;
        match self.canned.files.get(filename) {
            Some(bytes) if !bytes.is_empty() => Ok(bytes.clone()),
            _ => Err(TgaError::NotFound(format!("XML file {} not found", filename))),
        }
    }
}
