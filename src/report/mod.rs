//! Parser for ATI ICP water-analysis reports.
//!
//! Text comes from an external extractor (`pdftotext`); everything after
//! that is pure string processing. A report is read in two phases:
//! document-wide metadata (test id, dates) once, then each water-sample
//! section independently. The two are merged into one [`ParsedRecord`] per
//! section, and any fatal condition fails the whole document.

mod dates;
mod elements;
mod error;
mod extract;
mod lines;
mod pipeline;
mod scores;
mod section;
mod segment;
mod types;
mod validate;

pub use elements::Element;
pub use error::ErrorKind;
pub use extract::{Pdftotext, PlainTextFile, TextExtractor};
pub use pipeline::ReportParser;
pub use types::{ElementStatus, ParsedRecord, ScoreCategory, WaterType};
