use serde::Serialize;

use crate::report::ParsedRecord;

/// Output of `parse`: one entry per input file.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub source: String,
    pub records: Vec<ParsedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolVersions {
    pub pdftotext: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub db_path: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestCounts {
    pub input_count: usize,
    pub documents_stored: usize,
    pub documents_skipped: usize,
    pub documents_failed: usize,
    pub records_inserted: usize,
    pub tests_total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Stored,
    AlreadyStored,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub path: String,
    pub sha256: Option<String>,
    pub status: DocumentStatus,
    pub records: usize,
    pub water_types: Vec<String>,
    pub error_kind: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub db_schema_version: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub tool_versions: ToolVersions,
    pub paths: IngestPaths,
    pub counts: IngestCounts,
    pub documents: Vec<DocumentOutcome>,
    pub warnings: Vec<String>,
}
