use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::process::Command;

use super::error::ReportError;

/// Turns a report file into plain text.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ReportError>;
}

/// Spawns poppler's `pdftotext` in layout mode and reads its stdout.
#[derive(Debug, Clone)]
pub struct Pdftotext {
    program: String,
}

impl Pdftotext {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// First line of `pdftotext -v`, or `None` when the tool is absent.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.program).arg("-v").output().ok()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let source = if stdout.trim().is_empty() {
            stderr.trim()
        } else {
            stdout.trim()
        };

        source
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
    }
}

impl TextExtractor for Pdftotext {
    fn extract_text(&self, path: &Path) -> Result<String, ReportError> {
        let output = Command::new(&self.program)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output()
            .map_err(|error| match error.kind() {
                IoErrorKind::NotFound => ReportError::ToolMissing {
                    program: self.program.clone(),
                },
                _ => ReportError::ExtractionFailed {
                    path: path.display().to_string(),
                    detail: format!("failed to execute {}: {error}", self.program),
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::ExtractionFailed {
                path: path.display().to_string(),
                detail: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{0000}', ""))
    }
}

/// Reads text that was extracted ahead of time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFile;

impl TextExtractor for PlainTextFile {
    fn extract_text(&self, path: &Path) -> Result<String, ReportError> {
        fs::read_to_string(path).map_err(|error| ReportError::ExtractionFailed {
            path: path.display().to_string(),
            detail: error.to_string(),
        })
    }
}
