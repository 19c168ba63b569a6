use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::{Captures, Regex};

/// Recognizes the three date spellings the lab prints.
#[derive(Debug)]
pub struct DateResolver {
    iso: Regex,
    month_first: Regex,
    day_first: Regex,
    file_prefix: Regex,
}

#[derive(Debug, Clone, Copy)]
enum FieldOrder {
    YearMonthDay,
    MonthDayYear,
    DayMonthYear,
}

impl DateResolver {
    pub fn new() -> Result<Self> {
        Ok(Self {
            iso: Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b")
                .context("failed to compile ISO date regex")?,
            month_first: Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b")
                .context("failed to compile MM/DD/YYYY date regex")?,
            day_first: Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b")
                .context("failed to compile DD.MM.YYYY date regex")?,
            file_prefix: Regex::new(r"^(\d{4})-(\d{2})-(\d{2})")
                .context("failed to compile file name date regex")?,
        })
    }

    /// Resolves a date token, or the first date embedded in a longer text.
    ///
    /// Formats are tried in order ISO, `MM/DD/YYYY`, `DD.MM.YYYY`; the first
    /// format that occurs in the input decides. A `-` placeholder, blank input
    /// and impossible calendar dates all resolve to `None`.
    pub fn resolve(&self, token: Option<&str>) -> Option<NaiveDate> {
        let text = token?.trim();
        if text.is_empty() || text.chars().all(|character| character == '-') {
            return None;
        }

        let candidates = [
            (&self.iso, FieldOrder::YearMonthDay),
            (&self.month_first, FieldOrder::MonthDayYear),
            (&self.day_first, FieldOrder::DayMonthYear),
        ];

        candidates.iter().find_map(|(pattern, order)| {
            pattern
                .captures(text)
                .map(|captures| calendar_date(&captures, *order))
        })?
    }

    /// Reads a `YYYY-MM-DD` prefix from the file's base name.
    pub fn from_file_name(&self, path: &Path) -> Option<NaiveDate> {
        let name = path.file_name()?.to_str()?;
        let captures = self.file_prefix.captures(name)?;
        calendar_date(&captures, FieldOrder::YearMonthDay)
    }
}

fn calendar_date(captures: &Captures<'_>, order: FieldOrder) -> Option<NaiveDate> {
    let field = |index: usize| -> Option<u32> { captures.get(index)?.as_str().parse().ok() };

    let (year, month, day) = match order {
        FieldOrder::YearMonthDay => (field(1)?, field(2)?, field(3)?),
        FieldOrder::MonthDayYear => (field(3)?, field(1)?, field(2)?),
        FieldOrder::DayMonthYear => (field(3)?, field(2)?, field(1)?),
    };

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}
