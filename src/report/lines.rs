use anyhow::{Context, Result};
use regex::Regex;

use super::types::ElementStatus;

/// Status phrases in match order. Every multi-word phrase precedes the bare
/// "normal" it contains, otherwise "Above Normal" would read as NORMAL.
const STATUS_PHRASES: [(&str, ElementStatus); 7] = [
    ("above normal", ElementStatus::AboveNormal),
    ("below normal", ElementStatus::BelowNormal),
    ("critically low", ElementStatus::CriticallyLow),
    ("critically high", ElementStatus::CriticallyHigh),
    ("slightly low", ElementStatus::SlightlyLow),
    ("slightly high", ElementStatus::SlightlyHigh),
    ("normal", ElementStatus::Normal),
];

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineReading {
    pub value: Option<f64>,
    pub status: Option<ElementStatus>,
}

impl LineReading {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.status.is_none()
    }
}

#[derive(Debug)]
pub struct ElementLineScanner {
    magnitude: Regex,
}

impl ElementLineScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // A dash run is the lab's "not measured" sentinel; it competes with
            // numbers for the leftmost position.
            magnitude: Regex::new(r"-{2,}|\d+(?:\.\d+)?(?:[eE][-+]?\d+)?|\.\d+(?:[eE][-+]?\d+)?")
                .context("failed to compile element magnitude regex")?,
        })
    }

    pub fn scan(&self, line: &str) -> LineReading {
        LineReading {
            value: self.magnitude(line),
            status: match_status(line),
        }
    }

    fn magnitude(&self, line: &str) -> Option<f64> {
        let token = self.magnitude.find(line)?.as_str();
        if token.starts_with('-') {
            return None;
        }
        token.parse::<f64>().ok()
    }
}

pub fn match_status(line: &str) -> Option<ElementStatus> {
    // Layout extraction pads columns, so "Above    Normal" is common.
    let normalized = line
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_ascii_lowercase();

    STATUS_PHRASES
        .iter()
        .find(|(phrase, _)| normalized.contains(phrase))
        .map(|(_, status)| *status)
}
