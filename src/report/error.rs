use thiserror::Error;

/// Fatal conditions that abort the parse of a whole document.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{program} not found; install poppler-utils to extract PDF text")]
    ToolMissing { program: String },

    #[error("failed to extract text from PDF {path}: {detail}")]
    ExtractionFailed { path: String, detail: String },

    #[error("missing required fields: {}", fields.join(", "))]
    MissingRequiredFields { fields: Vec<&'static str> },

    #[error("could not extract test date from document body or file name ({source_name})")]
    MissingTestDate { source_name: String },

    #[error("no element data found for water type {water_type}")]
    NoElementData { water_type: String },

    #[error("unrecognized water type in section header: {kind} water")]
    UnrecognizedWaterType { kind: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Extraction,
    Structural,
    Content,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Extraction => "extraction",
            ErrorKind::Structural => "structural",
            ErrorKind::Content => "content",
        }
    }
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::ToolMissing { .. } | ReportError::ExtractionFailed { .. } => {
                ErrorKind::Extraction
            }
            ReportError::MissingRequiredFields { .. } | ReportError::MissingTestDate { .. } => {
                ErrorKind::Structural
            }
            ReportError::NoElementData { .. } | ReportError::UnrecognizedWaterType { .. } => {
                ErrorKind::Content
            }
        }
    }
}
