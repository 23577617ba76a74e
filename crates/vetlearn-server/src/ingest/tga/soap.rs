//! SOAP 1.1 envelopes for the training component service
//!
//! Requests are rendered as text; responses are deserialized with
//! `quick_xml::de`, which matches elements by local name so the service's
//! namespace prefixes do not need to be modelled.

use quick_xml::escape::escape;
use serde::Deserialize;
use vetlearn_common::types::ComponentKind;

use super::error::{TgaError, TgaResult};
use super::models::{
    ComponentDetails, ComponentSummary, DetailOptions, Release, ReleaseFile, SearchPage,
    SearchRequest,
};

/// Service namespace; SOAP actions are `{SERVICE_NS}ITrainingComponentService/{op}`
pub const SERVICE_NS: &str = "http://training.gov.au/services/12/";

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

pub fn soap_action(operation: &str) -> String {
    format!("{}ITrainingComponentService/{}", SERVICE_NS, operation)
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><soapenv:Envelope xmlns:soapenv="{}" xmlns:ser="{}"><soapenv:Header/><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"#,
        SOAP_ENV_NS, SERVICE_NS, body
    )
}

fn field(name: &str, value: impl std::fmt::Display) -> String {
    format!("<ser:{0}>{1}</ser:{0}>", name, value)
}

/// Body of a `Search` call
pub fn search_envelope(request: &SearchRequest) -> String {
    let flag = |kind: ComponentKind| request.includes(kind);

    let types = [
        field("IncludeAccreditedCourse", false),
        field("IncludeAccreditedCourseModule", false),
        field("IncludeQualification", flag(ComponentKind::Qualification)),
        field("IncludeSkillSet", flag(ComponentKind::Skillset)),
        field("IncludeTrainingPackage", flag(ComponentKind::TrainingPackage)),
        field("IncludeUnit", flag(ComponentKind::Unit)),
        field("IncludeUnitContextualisation", false),
    ]
    .concat();

    let inner = [
        field("Filter", escape(request.filter.as_str())),
        field("IncludeDeleted", request.include_deleted),
        field("IncludeSuperseded", request.include_superseded),
        field("PageNumber", request.page),
        field("PageSize", request.page_size),
        field("SearchCode", request.search_by_code),
        field("TrainingComponentTypes", types),
    ]
    .concat();

    envelope(&format!("<ser:Search><ser:request>{}</ser:request></ser:Search>", inner))
}

/// Body of a `GetDetails` call
pub fn details_envelope(code: &str, options: DetailOptions) -> String {
    let info = [
        field("ShowClassifications", false),
        field("ShowCompletionMapping", false),
        field("ShowComponents", false),
        field("ShowContacts", false),
        field("ShowCurrencyPeriods", false),
        field("ShowDataManagers", false),
        field("ShowFiles", options.show_files),
        field("ShowMappingInformation", false),
        field("ShowRecognitionManagers", false),
        field("ShowReleases", options.show_releases),
        field("ShowUnitGrid", false),
        field("ShowUsageRecommendation", false),
    ]
    .concat();

    let inner = [field("Code", escape(code)), field("InformationRequest", info)].concat();

    envelope(&format!("<ser:GetDetails><ser:request>{}</ser:request></ser:GetDetails>", inner))
}

// ============================================================================
// Response shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<B> {
    #[serde(rename = "Body")]
    body: B,
}

#[derive(Debug, Deserialize)]
struct Fault {
    #[serde(rename = "faultcode", default)]
    code: Option<String>,
    #[serde(rename = "faultstring", default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(rename = "Fault", default)]
    fault: Option<Fault>,
    #[serde(rename = "SearchResponse", default)]
    response: Option<SearchResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "SearchResult", default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "Count", default)]
    count: Option<String>,
    #[serde(rename = "PageNumber", default)]
    page_number: Option<String>,
    #[serde(rename = "PageSize", default)]
    page_size: Option<String>,
    #[serde(rename = "Results", default)]
    results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(rename = "TrainingComponentSummary", default)]
    summaries: Vec<SummaryXml>,
}

#[derive(Debug, Deserialize)]
struct SummaryXml {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "CurrencyStatus", alias = "Status", default)]
    status: Option<String>,
    #[serde(rename = "ComponentType", default)]
    component_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsBody {
    #[serde(rename = "Fault", default)]
    fault: Option<Fault>,
    #[serde(rename = "GetDetailsResponse", default)]
    response: Option<DetailsResponse>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(rename = "GetDetailsResult", default)]
    result: Option<DetailsXml>,
}

#[derive(Debug, Deserialize)]
struct DetailsXml {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Releases", default)]
    releases: Option<ReleasesXml>,
}

#[derive(Debug, Deserialize)]
struct ReleasesXml {
    #[serde(rename = "Release", default)]
    releases: Vec<ReleaseXml>,
}

#[derive(Debug, Deserialize)]
struct ReleaseXml {
    #[serde(rename = "ReleaseNumber", default)]
    number: Option<String>,
    #[serde(rename = "ReleaseDate", default)]
    date: Option<String>,
    #[serde(rename = "Files", default)]
    files: Option<FilesXml>,
}

#[derive(Debug, Deserialize)]
struct FilesXml {
    #[serde(rename = "ReleaseFile", default)]
    files: Vec<ReleaseFileXml>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFileXml {
    #[serde(rename = "Filename", alias = "FileName", default)]
    filename: Option<String>,
    #[serde(rename = "RelativePath", default)]
    relative_path: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Map a SOAP fault onto the error taxonomy
fn fault_error(fault: Fault, code: Option<&str>) -> TgaError {
    let message = non_blank(fault.message)
        .or_else(|| non_blank(fault.code))
        .unwrap_or_else(|| "unspecified SOAP fault".to_string());
    let lowered = message.to_lowercase();

    let missing = ["not found", "does not exist", "could not be found", "no component"]
        .iter()
        .any(|needle| lowered.contains(needle));

    match (missing, code) {
        (true, Some(code)) => TgaError::NotFound(format!("Component {} not found in TGA: {}", code, message)),
        (true, None) => TgaError::NotFound(message),
        (false, _) => TgaError::Malformed(format!("SOAP fault: {}", message)),
    }
}

/// Does the body look like it carries a SOAP fault
pub fn is_fault(body: &str) -> bool {
    body.contains("Fault>")
}

pub fn parse_search_response(xml: &str, request: &SearchRequest) -> TgaResult<SearchPage> {
    let envelope: Envelope<SearchBody> = quick_xml::de::from_str(xml)?;

    if let Some(fault) = envelope.body.fault {
        return Err(fault_error(fault, None));
    }

    let result = envelope
        .body
        .response
        .ok_or_else(|| TgaError::Malformed("missing SearchResponse element".to_string()))?
        .result;

    let Some(result) = result else {
        return Ok(SearchPage {
            components: Vec::new(),
            page: request.page,
            page_size: request.page_size,
            total: Some(0),
        });
    };

    let components = result
        .results
        .map(|r| r.summaries)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| {
            let code = non_blank(s.code)?;
            Some(ComponentSummary {
                title: non_blank(s.title).unwrap_or_else(|| code.clone()),
                code,
                description: non_blank(s.description),
                status: non_blank(s.status),
                component_type: non_blank(s.component_type),
            })
        })
        .collect();

    Ok(SearchPage {
        components,
        page: non_blank(result.page_number)
            .and_then(|p| p.parse().ok())
            .unwrap_or(request.page),
        page_size: non_blank(result.page_size)
            .and_then(|p| p.parse().ok())
            .unwrap_or(request.page_size),
        total: non_blank(result.count).and_then(|c| c.parse().ok()),
    })
}

pub fn parse_details_response(xml: &str, code: &str) -> TgaResult<ComponentDetails> {
    let envelope: Envelope<DetailsBody> = quick_xml::de::from_str(xml)?;

    if let Some(fault) = envelope.body.fault {
        return Err(fault_error(fault, Some(code)));
    }

    let response = envelope
        .body
        .response
        .ok_or_else(|| TgaError::Malformed("missing GetDetailsResponse element".to_string()))?;

    let details = response
        .result
        .ok_or_else(|| TgaError::component_not_found(code))?;

    let resolved_code = non_blank(details.code).ok_or_else(|| TgaError::component_not_found(code))?;

    let releases = details
        .releases
        .map(|r| r.releases)
        .unwrap_or_default()
        .into_iter()
        .map(|release| Release {
            release_number: non_blank(release.number),
            release_date: non_blank(release.date),
            files: release
                .files
                .map(|f| f.files)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|file| {
                    Some(ReleaseFile {
                        filename: non_blank(file.filename)?,
                        relative_path: non_blank(file.relative_path),
                    })
                })
                .collect(),
        })
        .collect();

    Ok(ComponentDetails {
        title: non_blank(details.title).unwrap_or_else(|| resolved_code.clone()),
        code: resolved_code,
        releases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_RESPONSE: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <SearchResponse xmlns="http://training.gov.au/services/12/">
      <SearchResult xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
        <Count>2</Count>
        <PageNumber>1</PageNumber>
        <PageSize>50</PageSize>
        <Results>
          <TrainingComponentSummary>
            <Code>PUAAMS101</Code>
            <ComponentType>Unit</ComponentType>
            <Title>Coordinate standard operating procedures &amp; checks</Title>
          </TrainingComponentSummary>
          <TrainingComponentSummary>
            <Code>PUAAMS102</Code>
            <Title>Second unit</Title>
            <CurrencyStatus>Current</CurrencyStatus>
          </TrainingComponentSummary>
        </Results>
      </SearchResult>
    </SearchResponse>
  </s:Body>
</s:Envelope>"#;

    const DETAILS_RESPONSE: &str = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <GetDetailsResponse xmlns="http://training.gov.au/services/12/">
      <GetDetailsResult>
        <Code>PUAAMS101</Code>
        <Title>Coordinate standard operating procedures</Title>
        <Releases>
          <Release>
            <Files>
              <ReleaseFile><Filename>PUAAMS101_AssessmentRequirements_R1.xml</Filename></ReleaseFile>
              <ReleaseFile><Filename>PUAAMS101_R1.xml</Filename><RelativePath>PUA/PUAAMS101_R1.xml</RelativePath></ReleaseFile>
            </Files>
            <ReleaseDate>2019-05-21T00:00:00</ReleaseDate>
            <ReleaseNumber>1</ReleaseNumber>
          </Release>
        </Releases>
      </GetDetailsResult>
    </GetDetailsResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn test_search_envelope_shape() {
        let request = SearchRequest::new([ComponentKind::Unit]).filter("PUA<&>").page(3, 25);
        let xml = search_envelope(&request);

        assert!(xml.contains("<ser:Filter>PUA&lt;&amp;&gt;</ser:Filter>"));
        assert!(xml.contains("<ser:IncludeUnit>true</ser:IncludeUnit>"));
        assert!(xml.contains("<ser:IncludeTrainingPackage>false</ser:IncludeTrainingPackage>"));
        assert!(xml.contains("<ser:PageNumber>3</ser:PageNumber>"));
        assert!(xml.contains("<ser:PageSize>25</ser:PageSize>"));
        assert!(xml.contains(SERVICE_NS));
    }

    #[test]
    fn test_details_envelope_shape() {
        let xml = details_envelope("BSBWHS211", DetailOptions::default());
        assert!(xml.contains("<ser:Code>BSBWHS211</ser:Code>"));
        assert!(xml.contains("<ser:ShowFiles>true</ser:ShowFiles>"));
        assert!(xml.contains("<ser:ShowReleases>true</ser:ShowReleases>"));
        assert!(xml.contains("<ser:ShowContacts>false</ser:ShowContacts>"));
    }

    #[test]
    fn test_soap_action() {
        assert_eq!(
            soap_action("Search"),
            "http://training.gov.au/services/12/ITrainingComponentService/Search"
        );
    }

    #[test]
    fn test_parse_search_response() {
        let request = SearchRequest::new([ComponentKind::Unit]).page(1, 50);
        let page = parse_search_response(SEARCH_RESPONSE, &request).unwrap();

        assert_eq!(page.total, Some(2));
        assert_eq!(page.components.len(), 2);
        assert_eq!(page.components[0].code, "PUAAMS101");
        assert_eq!(
            page.components[0].title,
            "Coordinate standard operating procedures & checks"
        );
        assert_eq!(page.components[0].component_type.as_deref(), Some("Unit"));
        assert_eq!(page.components[1].status.as_deref(), Some("Current"));
    }

    #[test]
    fn test_parse_empty_search_result() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <SearchResponse xmlns="http://training.gov.au/services/12/"><SearchResult><Count>0</Count></SearchResult></SearchResponse>
        </s:Body></s:Envelope>"#;
        let request = SearchRequest::new([ComponentKind::TrainingPackage]);
        let page = parse_search_response(xml, &request).unwrap();
        assert!(page.components.is_empty());
        assert_eq!(page.total, Some(0));
    }

    #[test]
    fn test_parse_details_response() {
        let details = parse_details_response(DETAILS_RESPONSE, "PUAAMS101").unwrap();

        assert_eq!(details.code, "PUAAMS101");
        assert_eq!(details.releases.len(), 1);
        let release = &details.releases[0];
        assert_eq!(release.release_number.as_deref(), Some("1"));
        assert_eq!(release.release_date.as_deref(), Some("2019-05-21T00:00:00"));
        assert_eq!(release.files.len(), 2);
        assert_eq!(release.files[1].relative_path.as_deref(), Some("PUA/PUAAMS101_R1.xml"));

        let files = details.latest_files();
        assert_eq!(files.main.as_deref(), Some("PUAAMS101_R1.xml"));
        assert_eq!(files.assessment.as_deref(), Some("PUAAMS101_AssessmentRequirements_R1.xml"));
    }

    #[test]
    fn test_missing_details_result_is_not_found() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <GetDetailsResponse xmlns="http://training.gov.au/services/12/"></GetDetailsResponse>
        </s:Body></s:Envelope>"#;
        let err = parse_details_response(xml, "NOPE999").unwrap_err();
        assert!(matches!(err, TgaError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_fault_mapping() {
        let not_found = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <s:Fault><faultcode>s:Client</faultcode><faultstring>Training component NOPE999 does not exist</faultstring></s:Fault>
        </s:Body></s:Envelope>"#;
        let err = parse_details_response(not_found, "NOPE999").unwrap_err();
        assert!(matches!(err, TgaError::NotFound(_)));

        let other = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body>
            <s:Fault><faultcode>s:Server</faultcode><faultstring>Object reference not set</faultstring></s:Fault>
        </s:Body></s:Envelope>"#;
        let err = parse_details_response(other, "BSBWHS211").unwrap_err();
        assert!(matches!(err, TgaError::Malformed(_)));
        assert!(is_fault(other));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let request = SearchRequest::new([ComponentKind::Unit]);
        let err = parse_search_response("<html><body>gateway error</body></html>", &request).unwrap_err();
        assert!(matches!(err, TgaError::Malformed(_)));
    }
}
