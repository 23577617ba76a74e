//! Element / performance-criteria extraction from unit XML
//!
//! Unit documents embed an HTML-style table whose header row reads
//! "Elements | Performance criteria". After the header and one explanatory
//! row, each data row may open a new element (cells 1-2) and may carry a
//! performance criterion for the open element (cells 3-4):
//!
//! ```text
//! | Elements              | Performance criteria          |
//! | Elements describe ... | Performance criteria describe |
//! | 1 | Prepare for work  | 1.1 | Confirm work order      |
//! |   |                   | 1.2 | Select tools            |
//! | 2 | Complete the work | 2.1 | ...                     |
//! ```
//!
//! The document is read with a tolerant HTML5 tree builder, so unknown XML
//! wrapper elements around the table do not matter.

use regex::Regex;
use scraper::{ElementRef, Html};

use super::models::{ParsedCriterion, ParsedElement};

/// Rows before the first data row: the header and the explanatory row
const HEADER_ROWS: usize = 2;

/// Compiled patterns for the element table
#[derive(Debug, Clone)]
pub struct ElementTableParser {
    bare_number: Regex,
    element_word: Regex,
    letter_number: Regex,
    pc_number: Regex,
}

impl ElementTableParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bare_number: Regex::new(r"^[1-9][0-9]*$")?,
            element_word: Regex::new(r"(?i)^element\s+([1-9][0-9]*)$")?,
            letter_number: Regex::new(r"^[A-Z][1-9][0-9]*$")?,
            pc_number: Regex::new(
                r"^(?:[0-9]+\.[0-9]+(?:\.[0-9]+)?|[A-Z][0-9]+\.[0-9]+)$",
            )?,
        })
    }

    /// Extract the ordered element list from raw unit XML.
    ///
    /// Returns an empty vector when the document has no elements table.
    pub fn parse(&self, xml: &[u8]) -> Vec<ParsedElement> {
        let source = String::from_utf8_lossy(xml);
        let document = Html::parse_document(&source);

        let Some(table) = descendants_named(document.root_element(), "table")
            .find(|table| is_elements_table(*table))
        else {
            tracing::debug!("No elements table found in unit document");
            return Vec::new();
        };

        let mut elements: Vec<ParsedElement> = Vec::new();

        for row in table_rows(table).skip(HEADER_ROWS) {
            let cells = cell_texts(row);
            if cells.len() < 2 {
                continue;
            }

            if let Some(number) = self.element_number(&cells[0]) {
                elements.push(ParsedElement::new(number, cells[1].clone()));
            }

            if let Some(criterion) = self.criterion(&cells) {
                match elements.last_mut() {
                    Some(open) => open.performance_criteria.push(criterion),
                    None => tracing::debug!(
                        pc_number = %criterion.pc_number,
                        "Performance criterion before any element, dropped"
                    ),
                }
            }
        }

        elements
    }

    fn element_number(&self, cell: &str) -> Option<String> {
        if self.bare_number.is_match(cell) || self.letter_number.is_match(cell) {
            return Some(cell.to_string());
        }
        self.element_word
            .captures(cell)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Cells 3-4 as a criterion, when cell 3 is a criterion ordinal
    fn criterion(&self, cells: &[String]) -> Option<ParsedCriterion> {
        if cells.len() < 4 || !self.pc_number.is_match(&cells[2]) {
            return None;
        }
        Some(ParsedCriterion {
            pc_number: cells[2].clone(),
            pc_text: cells[3].clone(),
        })
    }
}

/// Convenience wrapper building a parser for a single document
pub fn parse_elements(xml: &[u8]) -> Result<Vec<ParsedElement>, regex::Error> {
    Ok(ElementTableParser::new()?.parse(xml))
}

fn descendants_named<'a>(
    root: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name().eq_ignore_ascii_case(name))
}

/// Rows owned by `table` itself, directly or through its row groups.
/// Rows of tables nested in a cell are not included.
fn table_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    child_elements(table).flat_map(|child| match child.value().name() {
        "tr" => vec![child],
        "thead" | "tbody" | "tfoot" => child_elements(child)
            .filter(|row| row.value().name() == "tr")
            .collect(),
        _ => Vec::new(),
    })
}

fn child_elements<'a>(parent: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    parent.children().filter_map(ElementRef::wrap)
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// A table qualifies when its first row has an "Elements" cell next to a
/// "Performance criteria" cell (either order, any letter case), or a single
/// cell naming both.
fn is_elements_table(table: ElementRef<'_>) -> bool {
    let mut rows = table_rows(table);
    let Some(header) = rows.next() else {
        return false;
    };
    if rows.next().is_none() {
        return false;
    }

    let cells: Vec<String> = cell_texts(header).iter().map(|c| c.to_uppercase()).collect();
    let element = |c: &String| c.contains("ELEMENT");
    let performance = |c: &String| c.contains("PERFORMANCE");

    cells.iter().any(|c| element(c) && performance(c))
        || cells.windows(2).any(|pair| {
            (element(&pair[0]) && performance(&pair[1])) || (performance(&pair[0]) && element(&pair[1]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_xml(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Unit><Code>TSTUNT101</Code><Content>
<table>
  <tr><td>Elements</td><td>Performance criteria</td></tr>
  <tr><td>Elements describe the essential outcomes.</td><td>Performance criteria describe the performance needed.</td></tr>
  {rows}
</table>
</Content></Unit>"#
        )
    }

    fn parse(xml: &str) -> Vec<ParsedElement> {
        ElementTableParser::new().unwrap().parse(xml.as_bytes())
    }

    #[test]
    fn test_element_row_with_inline_criteria() {
        let xml = unit_xml(
            r#"<tr><td>1</td><td>Prepare for work</td><td>1.1</td><td>Confirm work order</td></tr>
               <tr><td></td><td></td><td>1.2</td><td>Select tools</td></tr>
               <tr><td>2</td><td>Complete work</td><td>2.1</td><td>Do the task</td></tr>"#,
        );

        let elements = parse(&xml);

        assert_eq!(
            elements,
            vec![
                ParsedElement::new("1", "Prepare for work")
                    .with_criterion("1.1", "Confirm work order")
                    .with_criterion("1.2", "Select tools"),
                ParsedElement::new("2", "Complete work").with_criterion("2.1", "Do the task"),
            ]
        );
    }

    #[test]
    fn test_single_row_element_and_criterion() {
        let xml = unit_xml(r#"<tr><td>1</td><td>Plan</td><td>1.1</td><td>Identify scope</td></tr>"#);
        let elements = parse(&xml);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].performance_criteria.len(), 1);
    }

    #[test]
    fn test_ordinals_are_kept_verbatim() {
        let xml = unit_xml(
            r#"<tr><td>A1</td><td>Lettered element</td><td>A1.2</td><td>Lettered criterion</td></tr>
               <tr><td>Element 3</td><td>Worded element</td><td>3.1.2</td><td>Three level criterion</td></tr>"#,
        );

        let elements = parse(&xml);

        assert_eq!(elements[0].element_number, "A1");
        assert_eq!(elements[0].performance_criteria[0].pc_number, "A1.2");
        assert_eq!(elements[1].element_number, "3");
        assert_eq!(elements[1].performance_criteria[0].pc_number, "3.1.2");
    }

    #[test]
    fn test_missing_table_yields_empty() {
        let xml = r#"<Unit><Code>TSTUNT101</Code><Title>No table here</Title></Unit>"#;
        assert!(parse(xml).is_empty());
    }

    #[test]
    fn test_unrelated_tables_are_ignored() {
        let xml = format!(
            "<Unit><table><tr><td>Range</td><td>Statement</td></tr><tr><td>1</td><td>x</td></tr></table>{}</Unit>",
            unit_xml(r#"<tr><td>1</td><td>Real element</td></tr>"#)
        );
        let elements = parse(&xml);
        assert_eq!(elements, vec![ParsedElement::new("1", "Real element")]);
    }

    #[test]
    fn test_rows_of_nested_tables_are_ignored() {
        let xml = r#"<table>
            <thead><tr><th>Elements</th><th>Performance criteria</th></tr></thead>
            <tbody>
              <tr><td>explanation</td><td>explanation</td></tr>
              <tr><td>1</td><td>Outer</td><td>1.1</td><td>Outer criterion</td></tr>
              <tr><td colspan="4"><table>
                <tr><td>9</td><td>Inner</td><td>9.1</td><td>Inner criterion</td></tr>
              </table></td></tr>
              <tr><td>2</td><td>Second</td></tr>
            </tbody>
        </table>"#;

        assert_eq!(
            parse(xml),
            vec![
                ParsedElement::new("1", "Outer").with_criterion("1.1", "Outer criterion"),
                ParsedElement::new("2", "Second"),
            ]
        );
    }

    #[test]
    fn test_uppercase_header_is_recognized() {
        let xml = r#"<table>
            <tr><td>ELEMENT</td><td>PERFORMANCE CRITERIA</td></tr>
            <tr><td>explanation</td><td>explanation</td></tr>
            <tr><td>1</td><td>Upper</td><td>1.1</td><td>Criterion</td></tr>
        </table>"#;
        assert_eq!(parse(xml).len(), 1);
    }

    #[test]
    fn test_header_variants_are_recognized() {
        let reversed = r#"<table>
            <tr><td>Performance criteria</td><td>Elements</td></tr>
            <tr><td>explanation</td><td>explanation</td></tr>
            <tr><td>1</td><td>Reversed</td><td>1.1</td><td>Criterion</td></tr>
        </table>"#;
        assert_eq!(parse(reversed).len(), 1);

        let combined = r#"<table>
            <tr><td>Elements and performance criteria</td></tr>
            <tr><td>explanation</td><td>explanation</td></tr>
            <tr><td>1</td><td>Combined</td></tr>
        </table>"#;
        assert_eq!(parse(combined).len(), 1);
    }

    #[test]
    fn test_malformed_criterion_number_is_not_recorded() {
        let xml = unit_xml(
            r#"<tr><td>1</td><td>Element</td><td>1.</td><td>Missing minor number</td></tr>
               <tr><td></td><td></td><td>one.two</td><td>Words</td></tr>"#,
        );
        let elements = parse(&xml);
        assert_eq!(elements.len(), 1);
        assert!(elements[0].performance_criteria.is_empty());
    }

    #[test]
    fn test_criterion_before_any_element_is_dropped() {
        let xml = unit_xml(
            r#"<tr><td></td><td></td><td>1.1</td><td>Orphan</td></tr>
               <tr><td>1</td><td>First</td></tr>"#,
        );
        let elements = parse(&xml);
        assert_eq!(elements, vec![ParsedElement::new("1", "First")]);
    }

    #[test]
    fn test_whitespace_is_trimmed_but_internal_spacing_kept() {
        let xml = unit_xml(
            "<tr><td>\n  1 </td><td>  Work   safely\n</td><td> 1.1</td><td>Follow  procedures </td></tr>",
        );
        let elements = parse(&xml);
        assert_eq!(elements[0].element_number, "1");
        assert_eq!(elements[0].element_text, "Work   safely");
        assert_eq!(elements[0].performance_criteria[0].pc_text, "Follow  procedures");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let xml = unit_xml(r#"<tr><td>Note only</td></tr><tr><td>1</td><td>After note</td></tr>"#);
        assert_eq!(parse(&xml).len(), 1);
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let xml = unit_xml(r#"<tr><td>1</td><td>A</td><td>1.1</td><td>B</td></tr>"#);
        assert_eq!(parse(&xml), parse(&xml));
        assert_eq!(parse_elements(xml.as_bytes()).unwrap(), parse(&xml));
    }
}
