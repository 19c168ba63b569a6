pub mod ingest;
pub mod parse;
pub mod status;

use crate::cli::SourceArgs;
use crate::report::{Pdftotext, PlainTextFile, TextExtractor};

/// Picks the extractor the source flags ask for.
pub(crate) fn extractor_for(source: &SourceArgs) -> Box<dyn TextExtractor> {
    if source.from_text {
        Box::new(PlainTextFile)
    } else {
        Box::new(Pdftotext::new(source.pdftotext.clone()))
    }
}
