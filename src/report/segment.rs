use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use super::error::ReportError;
use super::types::WaterType;

/// One water sample's span of report text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub water_type: WaterType,
    pub text: &'a str,
}

#[derive(Debug)]
pub struct Segmenter {
    header: Regex,
}

impl Segmenter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: Regex::new(r"(?im)^[^\S\n]*Results\s+of\s+([a-z][a-z ]*?)[^\S\n]*water\b.*$")
                .context("failed to compile section header regex")?,
        })
    }

    /// Splits the report at each "Results of <kind> water" header. A report
    /// without any header is a single primary-type section; a header whose
    /// kind is not a known water type fails the whole report.
    pub fn split<'a>(&self, text: &'a str) -> Result<Vec<Segment<'a>>, ReportError> {
        let mut headers = Vec::new();
        for captures in self.header.captures_iter(text) {
            let (Some(line), Some(kind)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let water_type = WaterType::from_header_kind(kind.as_str()).ok_or_else(|| {
                ReportError::UnrecognizedWaterType {
                    kind: kind.as_str().split_whitespace().collect::<Vec<&str>>().join(" "),
                }
            })?;
            headers.push((line.start(), line.end(), water_type));
        }

        if headers.is_empty() {
            debug!("no section headers found; treating report as one section");
            return Ok(vec![Segment {
                water_type: WaterType::PRIMARY,
                text,
            }]);
        }

        Ok(headers
            .iter()
            .enumerate()
            .map(|(index, (_, body_start, water_type))| {
                let body_end = headers
                    .get(index + 1)
                    .map(|(next_start, _, _)| *next_start)
                    .unwrap_or(text.len());
                Segment {
                    water_type: *water_type,
                    text: &text[*body_start..body_end],
                }
            })
            .collect())
    }
}
