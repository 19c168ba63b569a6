use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::elements::Element;

/// Vendor identifier stamped on every record.
pub const LAB_NAME: &str = "ATI Aquaristik";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterType {
    Saltwater,
    RoWater,
}

impl WaterType {
    /// Type assumed when a report carries no section header.
    pub const PRIMARY: WaterType = WaterType::Saltwater;

    pub fn as_str(self) -> &'static str {
        match self {
            WaterType::Saltwater => "saltwater",
            WaterType::RoWater => "ro_water",
        }
    }

    /// Maps the `<kind>` of a "Results of <kind> water" header.
    pub fn from_header_kind(kind: &str) -> Option<Self> {
        let normalized = kind
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .to_ascii_lowercase();
        match normalized.as_str() {
            "salt" | "sea" => Some(WaterType::Saltwater),
            "osmosis" | "reverse osmosis" | "ro" => Some(WaterType::RoWater),
            _ => None,
        }
    }
}

impl fmt::Display for WaterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    Normal,
    BelowNormal,
    AboveNormal,
    SlightlyLow,
    SlightlyHigh,
    CriticallyLow,
    CriticallyHigh,
}

impl ElementStatus {
    pub const ALL: [ElementStatus; 7] = [
        ElementStatus::Normal,
        ElementStatus::BelowNormal,
        ElementStatus::AboveNormal,
        ElementStatus::SlightlyLow,
        ElementStatus::SlightlyHigh,
        ElementStatus::CriticallyLow,
        ElementStatus::CriticallyHigh,
    ];

    /// Reads back a stored tag such as `SLIGHTLY_LOW`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == tag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementStatus::Normal => "NORMAL",
            ElementStatus::BelowNormal => "BELOW_NORMAL",
            ElementStatus::AboveNormal => "ABOVE_NORMAL",
            ElementStatus::SlightlyLow => "SLIGHTLY_LOW",
            ElementStatus::SlightlyHigh => "SLIGHTLY_HIGH",
            ElementStatus::CriticallyLow => "CRITICALLY_LOW",
            ElementStatus::CriticallyHigh => "CRITICALLY_HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    MajorElements,
    MinorElements,
    Pollutants,
    BaseElements,
    Overall,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 5] = [
        ScoreCategory::MajorElements,
        ScoreCategory::MinorElements,
        ScoreCategory::Pollutants,
        ScoreCategory::BaseElements,
        ScoreCategory::Overall,
    ];

    /// Label printed in the report's quality assessment block.
    pub fn label(self) -> &'static str {
        match self {
            ScoreCategory::MajorElements => "Major Elements",
            ScoreCategory::MinorElements => "Minor Elements",
            ScoreCategory::Pollutants => "Pollutants",
            ScoreCategory::BaseElements => "Base Elements",
            ScoreCategory::Overall => "Overall",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ScoreCategory::MajorElements => "score_major_elements",
            ScoreCategory::MinorElements => "score_minor_elements",
            ScoreCategory::Pollutants => "score_pollutants",
            ScoreCategory::BaseElements => "score_base_elements",
            ScoreCategory::Overall => "score_overall",
        }
    }
}

/// One water sample's results, as handed to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub lab_name: String,
    pub test_id: Option<String>,
    pub sample_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub evaluated_date: Option<NaiveDate>,
    pub test_date: NaiveDate,
    pub water_type: WaterType,
    pub scores: BTreeMap<ScoreCategory, u8>,
    pub elements: BTreeMap<Element, f64>,
    pub statuses: BTreeMap<Element, ElementStatus>,
    pub recommendations: Option<Vec<String>>,
    pub dosing_instructions: Option<Vec<String>>,
}

/// Metadata read once per document and shared by all of its records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub test_id: Option<String>,
    pub test_date: Option<NaiveDate>,
    pub sample_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub evaluated_date: Option<NaiveDate>,
}

/// Everything interpreted from one section's text span.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBody {
    pub scores: BTreeMap<ScoreCategory, u8>,
    pub elements: BTreeMap<Element, f64>,
    pub statuses: BTreeMap<Element, ElementStatus>,
    pub recommendations: Option<Vec<String>>,
    pub dosing_instructions: Option<Vec<String>>,
}

/// A record before the required-field checks have run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub lab_name: Option<String>,
    pub water_type: Option<WaterType>,
    pub metadata: DocumentMetadata,
    pub body: SectionBody,
}
