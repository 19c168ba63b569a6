use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::ReportError;
use super::extract::TextExtractor;
use super::section::SectionInterpreter;
use super::segment::Segmenter;
use super::types::{DocumentMetadata, LAB_NAME, ParsedRecord, RecordDraft};
use super::validate::validate_record;

/// Stateless report parser. One instance can be shared across threads; each
/// call works only on its own input.
#[derive(Debug)]
pub struct ReportParser {
    segmenter: Segmenter,
    interpreter: SectionInterpreter,
}

impl ReportParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            segmenter: Segmenter::new()?,
            interpreter: SectionInterpreter::new()?,
        })
    }

    /// Extracts the file's text and parses it. The file name doubles as the
    /// last-resort source of the test date.
    pub fn parse_file(
        &self,
        extractor: &dyn TextExtractor,
        path: &Path,
    ) -> Result<Vec<ParsedRecord>, ReportError> {
        let text = extractor.extract_text(path)?;
        self.parse_text(&text, Some(path))
    }

    /// Parses already-extracted report text. Either every section becomes a
    /// record or the whole document fails.
    pub fn parse_text(
        &self,
        text: &str,
        source: Option<&Path>,
    ) -> Result<Vec<ParsedRecord>, ReportError> {
        let mut metadata = self.interpreter.metadata(text);
        metadata.test_date = self.resolve_test_date(&metadata, text, source);
        if metadata.test_date.is_none() {
            return Err(ReportError::MissingTestDate {
                source_name: source
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "<text>".to_string()),
            });
        }

        let segments = self.segmenter.split(text)?;
        let drafts = segments
            .iter()
            .map(|segment| RecordDraft {
                lab_name: Some(LAB_NAME.to_string()),
                water_type: Some(segment.water_type),
                metadata: metadata.clone(),
                body: self.interpreter.body(segment.text),
            })
            .collect::<Vec<_>>();

        let records = drafts
            .into_iter()
            .map(validate_record)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            sections = records.len(),
            test_id = %metadata.test_id.as_deref().unwrap_or("-"),
            test_date = ?metadata.test_date,
            "parsed report"
        );
        Ok(records)
    }

    /// Explicit test date, then evaluated date, then any date in the body,
    /// then a `YYYY-MM-DD` file name prefix.
    fn resolve_test_date(
        &self,
        metadata: &DocumentMetadata,
        text: &str,
        source: Option<&Path>,
    ) -> Option<NaiveDate> {
        if let Some(date) = metadata.test_date.or(metadata.evaluated_date) {
            return Some(date);
        }

        let dates = self.interpreter.dates();
        if let Some(date) = dates.resolve(Some(text)) {
            debug!(%date, "test date taken from report body");
            return Some(date);
        }

        let date = source.and_then(|path| dates.from_file_name(path));
        if let Some(date) = date {
            debug!(%date, "test date taken from file name");
        }
        date
    }
}
