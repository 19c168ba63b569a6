use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::commands::extractor_for;
use crate::model::{
    DocumentOutcome, DocumentStatus, IngestCounts, IngestPaths, IngestRunManifest, ToolVersions,
};
use crate::report::{ErrorKind, Pdftotext, ReportParser, TextExtractor};
use crate::store::{self, DB_SCHEMA_VERSION, SourceDocument};
use crate::util::{
    emit_json_pretty, ensure_directory, file_name_of, now_utc_string, sha256_file,
    utc_compact_string,
};

pub fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let ingest_manifest_path = args.ingest_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "ingest_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let db_path = args.resolved_db_path();
    if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    info!(cache_root = %cache_root.display(), run_id = %run_id, "starting ingest");

    let tool_versions = ToolVersions {
        pdftotext: if args.source.from_text {
            None
        } else {
            Pdftotext::new(args.source.pdftotext.clone()).version()
        },
    };

    let mut connection = store::open(&db_path)?;
    let parser = ReportParser::new()?;
    let extractor = extractor_for(&args.source);

    let mut counts = IngestCounts {
        input_count: args.source.inputs.len(),
        ..IngestCounts::default()
    };
    let mut documents = Vec::with_capacity(args.source.inputs.len());
    let mut warnings = Vec::new();

    for path in &args.source.inputs {
        let outcome = ingest_document(&mut connection, &parser, extractor.as_ref(), path)?;
        match outcome.status {
            DocumentStatus::Stored => {
                counts.documents_stored += 1;
                counts.records_inserted += outcome.records;
            }
            DocumentStatus::AlreadyStored => counts.documents_skipped += 1,
            DocumentStatus::Failed => {
                counts.documents_failed += 1;
                warnings.push(format!(
                    "{}: {}",
                    outcome.path,
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }
        documents.push(outcome);
    }

    counts.tests_total = store::count_tests(&connection)?;

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id,
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: if counts.documents_failed == 0 {
            "completed".to_string()
        } else {
            "completed_with_failures".to_string()
        },
        started_at,
        updated_at: now_utc_string(),
        command: render_ingest_command(&args),
        tool_versions,
        paths: IngestPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            db_path: db_path.display().to_string(),
        },
        counts,
        documents,
        warnings,
    };

    emit_json_pretty(Some(ingest_manifest_path.as_path()), &manifest)?;
    info!(path = %ingest_manifest_path.display(), "wrote ingest manifest");
    info!(
        stored = manifest.counts.documents_stored,
        skipped = manifest.counts.documents_skipped,
        failed = manifest.counts.documents_failed,
        records = manifest.counts.records_inserted,
        tests_total = manifest.counts.tests_total,
        "ingest completed"
    );

    Ok(())
}

/// Parses and stores one report. Parse failures are reported in the outcome;
/// only database and filesystem errors abort the run.
fn ingest_document(
    connection: &mut Connection,
    parser: &ReportParser,
    extractor: &dyn TextExtractor,
    path: &Path,
) -> Result<DocumentOutcome> {
    let mut outcome = DocumentOutcome {
        path: path.display().to_string(),
        sha256: None,
        status: DocumentStatus::Failed,
        records: 0,
        water_types: Vec::new(),
        error_kind: None,
        error: None,
    };

    let sha256 = match sha256_file(path) {
        Ok(sha256) => sha256,
        Err(error) => {
            warn!(path = %path.display(), error = %error, "skipping unreadable report");
            outcome.error_kind = Some(ErrorKind::Extraction.as_str().to_string());
            outcome.error = Some(format!("{error:#}"));
            return Ok(outcome);
        }
    };
    outcome.sha256 = Some(sha256.clone());

    if store::is_document_stored(connection, &sha256)? {
        info!(path = %path.display(), sha256 = %sha256, "report already stored");
        outcome.status = DocumentStatus::AlreadyStored;
        return Ok(outcome);
    }

    let records = match parser.parse_file(extractor, path) {
        Ok(records) => records,
        Err(error) => {
            warn!(
                path = %path.display(),
                kind = error.kind().as_str(),
                error = %error,
                "report rejected"
            );
            outcome.error_kind = Some(error.kind().as_str().to_string());
            outcome.error = Some(error.to_string());
            return Ok(outcome);
        }
    };

    let source = SourceDocument {
        filename: file_name_of(path),
        sha256,
    };
    outcome.records = store::insert_document(connection, &records, &source)?;
    outcome.water_types = records
        .iter()
        .map(|record| record.water_type.to_string())
        .collect();
    outcome.status = DocumentStatus::Stored;

    info!(
        path = %path.display(),
        records = outcome.records,
        test_date = ?records.first().map(|record| record.test_date),
        "stored report"
    );

    Ok(outcome)
}

fn render_ingest_command(args: &IngestArgs) -> String {
    let mut command = vec![
        "icp-report".to_string(),
        "ingest".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
    ];

    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.ingest_manifest_path {
        command.push("--ingest-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.source.from_text {
        command.push("--from-text".to_string());
    } else if args.source.pdftotext != "pdftotext" {
        command.push("--pdftotext".to_string());
        command.push(args.source.pdftotext.clone());
    }
    for input in &args.source.inputs {
        command.push("--input".to_string());
        command.push(input.display().to_string());
    }

    command.join(" ")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;
    use crate::report::PlainTextFile;

    const REPORT: &str = "\
Test ID: 987654321
Evaluated: 03/20/2024
Results of Salt water
Ca            415 mg/l Normal
Results of Osmosis water
Ca            0.5 mg/l Normal
";

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("icp-report-ingest-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("fixture dir");
        let path = dir.join(name);
        fs::write(&path, contents).expect("fixture written");
        path
    }

    fn memory_store() -> Connection {
        let connection = Connection::open_in_memory().expect("in-memory database opens");
        store::ensure_schema(&connection).expect("schema applies");
        connection
    }

    #[test]
    fn ingest_document_stores_sections_then_skips_duplicates() {
        let mut connection = memory_store();
        let parser = ReportParser::new().expect("parser patterns compile");
        let path = fixture("two_sections.txt", REPORT);

        let first = ingest_document(&mut connection, &parser, &PlainTextFile, &path)
            .expect("ingest runs");
        assert_eq!(first.status, DocumentStatus::Stored);
        assert_eq!(first.records, 2);
        assert_eq!(first.water_types, vec!["saltwater", "ro_water"]);

        let second = ingest_document(&mut connection, &parser, &PlainTextFile, &path)
            .expect("ingest runs");
        assert_eq!(second.status, DocumentStatus::AlreadyStored);
        assert_eq!(store::count_tests(&connection).expect("count"), 2);
    }

    #[test]
    fn ingest_document_records_rejected_reports_without_storing() {
        let mut connection = memory_store();
        let parser = ReportParser::new().expect("parser patterns compile");
        let path = fixture("no_date.txt", "Results of Salt water\nCa 410 mg/l Normal\n");

        let outcome = ingest_document(&mut connection, &parser, &PlainTextFile, &path)
            .expect("ingest runs");

        assert_eq!(outcome.status, DocumentStatus::Failed);
        assert_eq!(outcome.error_kind.as_deref(), Some("structural"));
        assert_eq!(store::count_tests(&connection).expect("count"), 0);
    }

    #[test]
    fn render_ingest_command_lists_inputs() {
        let args = IngestArgs {
            source: crate::cli::SourceArgs {
                inputs: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
                from_text: true,
                pdftotext: "pdftotext".to_string(),
            },
            cache_root: PathBuf::from(".cache/icp-report"),
            db_path: None,
            ingest_manifest_path: None,
        };

        assert_eq!(
            render_ingest_command(&args),
            "icp-report ingest --cache-root .cache/icp-report --from-text --input a.txt --input b.txt"
        );
    }
}
