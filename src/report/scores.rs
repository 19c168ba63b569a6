use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use super::types::ScoreCategory;

#[derive(Debug)]
pub struct ScoreScanner {
    patterns: Vec<(ScoreCategory, Regex)>,
}

impl ScoreScanner {
    pub fn new() -> Result<Self> {
        let patterns = ScoreCategory::ALL
            .iter()
            .map(|category| {
                score_pattern(category.label())
                    .map(|pattern| (*category, pattern))
                    .with_context(|| format!("failed to compile score regex for {}", category.label()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// First `<label>[:] <integer>` occurrence for the category. `Some(0)` is
    /// a real score; `None` means the label never carried a number.
    pub fn scan(&self, text: &str, category: ScoreCategory) -> Option<u8> {
        let (_, pattern) = self
            .patterns
            .iter()
            .find(|(candidate, _)| *candidate == category)?;
        let raw = pattern.captures(text)?.get(1)?.as_str();

        match raw.parse::<u32>() {
            Ok(score) if score <= 100 => u8::try_from(score).ok(),
            _ => {
                debug!(category = category.label(), raw, "ignoring out-of-range score");
                None
            }
        }
    }
}

fn score_pattern(label: &str) -> Result<Regex, regex::Error> {
    let words = label
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<String>>()
        .join(r"\s+");
    Regex::new(&format!(r"(?i)\b{words}\s*:?\s*(\d+)\b"))
}
