use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Writes pretty JSON to `path`, or to stdout when no path is given.
pub fn emit_json_pretty<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value).context("failed to serialize json")?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                ensure_directory(parent)?;
            }
            let mut file = File::create(path)
                .with_context(|| format!("failed to create json file: {}", path.display()))?;
            file.write_all(&data)
                .and_then(|_| file.write_all(b"\n"))
                .with_context(|| format!("failed to write json file: {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&data)
                .and_then(|_| stdout.write_all(b"\n"))
                .context("failed to write json to stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_compact_string_has_no_separators() {
        let ts = DateTime::parse_from_rfc3339("2024-01-15T08:30:05Z")
            .expect("valid timestamp")
            .with_timezone(&Utc);
        assert_eq!(utc_compact_string(ts), "20240115T083005Z");
    }

    #[test]
    fn file_name_of_prefers_base_name() {
        assert_eq!(file_name_of(Path::new("/uploads/2024-01-15_ati.pdf")), "2024-01-15_ati.pdf");
    }

    #[test]
    fn sha256_file_hashes_contents() {
        let path = std::env::temp_dir().join(format!("icp-report-hash-{}.txt", std::process::id()));
        fs::write(&path, b"abc").expect("fixture written");
        let digest = sha256_file(&path).expect("file hashes");
        let _ = fs::remove_file(&path);

        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
