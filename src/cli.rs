use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "icp-report",
    version,
    about = "Parse ATI ICP water-analysis reports into structured test records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse reports and print the records as JSON.
    Parse(ParseArgs),
    /// Parse reports and store the records in the local test database.
    Ingest(IngestArgs),
    /// Summarize the stored tests.
    Status(StatusArgs),
}

/// Options shared by every command that reads report files.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Inputs are already-extracted plain text, not PDFs.
    #[arg(long, default_value_t = false)]
    pub from_text: bool,

    #[arg(long, default_value = "pdftotext")]
    pub pdftotext: String,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value = ".cache/icp-report")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub ingest_manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/icp-report")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

impl IngestArgs {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.cache_root.join(crate::store::DEFAULT_DB_FILE))
    }
}

impl StatusArgs {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.cache_root.join(crate::store::DEFAULT_DB_FILE))
    }
}
