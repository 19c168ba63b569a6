use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use super::dates::DateResolver;
use super::elements::Element;
use super::lines::{ElementLineScanner, LineReading};
use super::scores::ScoreScanner;
use super::types::{DocumentMetadata, ScoreCategory, SectionBody};

const TEST_ID_LABEL: &str = r"(?:Test[ \t]*ID|Barcode)";
const TEST_DATE_LABEL: &str = r"Test[ \t]*date";
const CREATED_LABEL: &str = r"Created";
const ARRIVED_LABEL: &str = r"Arrived[ \t]+in[ \t]+the[ \t]+laboratory";
const EVALUATED_LABEL: &str = r"Evaluated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextBlock {
    Recommendations,
    Dosing,
}

/// Reads labeled metadata from a whole report and measurements from one
/// section span.
#[derive(Debug)]
pub struct SectionInterpreter {
    dates: DateResolver,
    lines: ElementLineScanner,
    scores: ScoreScanner,
    test_id: Regex,
    test_date: Regex,
    created: Regex,
    arrived: Regex,
    evaluated: Regex,
    any_label: Regex,
    recommendations_marker: Regex,
    dosing_marker: Regex,
}

impl SectionInterpreter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dates: DateResolver::new()?,
            lines: ElementLineScanner::new()?,
            scores: ScoreScanner::new()?,
            test_id: labeled_field(TEST_ID_LABEL)?,
            test_date: labeled_field(TEST_DATE_LABEL)?,
            created: labeled_field(CREATED_LABEL)?,
            arrived: labeled_field(ARRIVED_LABEL)?,
            evaluated: labeled_field(EVALUATED_LABEL)?,
            any_label: Regex::new(&format!(
                r"(?i)\b(?:{TEST_ID_LABEL}|{TEST_DATE_LABEL}|{CREATED_LABEL}|{ARRIVED_LABEL}|{EVALUATED_LABEL})\b"
            ))
            .context("failed to compile metadata label alternation regex")?,
            recommendations_marker: block_marker(r"Recommendations?")?,
            dosing_marker: block_marker(r"Dosing(?:[ \t]+instructions?)?")?,
        })
    }

    pub fn dates(&self) -> &DateResolver {
        &self.dates
    }

    pub fn metadata(&self, text: &str) -> DocumentMetadata {
        let test_id = self
            .field_values(&self.test_id, text)
            .filter_map(|value| value.split_whitespace().next())
            .find(|value| !value.chars().all(|character| character == '-'))
            .map(ToOwned::to_owned);

        DocumentMetadata {
            test_id,
            test_date: self.labeled_date(&self.test_date, text),
            sample_date: self.labeled_date(&self.created, text),
            received_date: self.labeled_date(&self.arrived, text),
            evaluated_date: self.labeled_date(&self.evaluated, text),
        }
    }

    pub fn body(&self, text: &str) -> SectionBody {
        let scores = ScoreCategory::ALL
            .iter()
            .filter_map(|category| {
                self.scores
                    .scan(text, *category)
                    .map(|score| (*category, score))
            })
            .collect::<BTreeMap<_, _>>();

        let table = self.table_span(text);
        let mut elements = BTreeMap::new();
        let mut statuses = BTreeMap::new();
        for element in Element::ALL {
            let reading = self.element_reading(table, element);
            if let Some(value) = reading.value {
                elements.insert(element, value);
            }
            if let Some(status) = reading.status {
                statuses.insert(element, status);
            }
        }

        SectionBody {
            scores,
            elements,
            statuses,
            recommendations: self.text_block(text, TextBlock::Recommendations),
            dosing_instructions: self.text_block(text, TextBlock::Dosing),
        }
    }

    /// Reads the first line opened by the element's label that carries a
    /// value or a status. Only the text after the label is scanned, so the
    /// digits inside `NO3` or `PO4` never count as the measurement.
    fn element_reading(&self, text: &str, element: Element) -> LineReading {
        text.lines()
            .filter_map(|line| element.strip_label(line))
            .map(|rest| self.lines.scan(rest))
            .find(|reading| !reading.is_empty())
            .unwrap_or_default()
    }

    /// Text ahead of the first recommendations or dosing marker. Prose in
    /// those blocks may open with a symbol ("As a precaution ...").
    fn table_span<'a>(&self, text: &'a str) -> &'a str {
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            if self.recommendations_marker.is_match(content) || self.dosing_marker.is_match(content) {
                return &text[..offset];
            }
            offset += line.len();
        }
        text
    }

    /// First occurrence of the label that resolves to a date; a label
    /// followed by prose ("Created by ...") does not hide a later one.
    fn labeled_date(&self, pattern: &Regex, text: &str) -> Option<NaiveDate> {
        self.field_values(pattern, text)
            .find_map(|value| self.dates.resolve(Some(value)))
    }

    /// Values following each occurrence of a label. Layout extraction keeps
    /// side-by-side columns on one line, so a value stops at the next label.
    fn field_values<'a>(
        &'a self,
        pattern: &'a Regex,
        text: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        pattern
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .map(|value| {
                let value = value.as_str();
                let end = self
                    .any_label
                    .find(value)
                    .map(|next| next.start())
                    .unwrap_or(value.len());
                value[..end].trim()
            })
            .filter(|value| !value.is_empty())
    }

    fn text_block(&self, text: &str, block: TextBlock) -> Option<Vec<String>> {
        let (own, other) = match block {
            TextBlock::Recommendations => (&self.recommendations_marker, &self.dosing_marker),
            TextBlock::Dosing => (&self.dosing_marker, &self.recommendations_marker),
        };

        let mut lines = text.lines();
        let inline = lines.by_ref().find_map(|line| own.captures(line))?;

        let mut entries = Vec::new();
        if let Some(rest) = inline.get(1).map(|value| value.as_str().trim()) {
            if !rest.is_empty() {
                entries.push(rest.to_string());
            }
        }

        for line in lines {
            if other.is_match(line) || own.is_match(line) {
                break;
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                entries.push(trimmed.to_string());
            }
        }

        if entries.is_empty() { None } else { Some(entries) }
    }
}

fn labeled_field(label: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)\b{label}\b[ \t]*:?[ \t]*([^\n]*)"))
        .with_context(|| format!("failed to compile metadata label regex: {label}"))
}

fn block_marker(label: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?i)^[ \t]*{label}[ \t]*(?::[ \t]*(.*))?$"))
        .with_context(|| format!("failed to compile text block marker regex: {label}"))
}
