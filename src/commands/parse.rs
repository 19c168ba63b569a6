use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ParseArgs;
use crate::commands::extractor_for;
use crate::model::ParsedDocument;
use crate::report::ReportParser;
use crate::util::emit_json_pretty;

pub fn run(args: ParseArgs) -> Result<()> {
    let parser = ReportParser::new()?;
    let extractor = extractor_for(&args.source);

    let mut documents = Vec::with_capacity(args.source.inputs.len());
    for path in &args.source.inputs {
        let records = parser
            .parse_file(extractor.as_ref(), path)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        for record in &records {
            info!(
                path = %path.display(),
                water_type = %record.water_type,
                test_date = %record.test_date,
                elements = record.elements.len(),
                statuses = record.statuses.len(),
                "parsed section"
            );
        }

        documents.push(ParsedDocument {
            source: path.display().to_string(),
            records,
        });
    }

    emit_json_pretty(args.output.as_deref(), &documents)?;
    if let Some(output) = &args.output {
        info!(path = %output.display(), documents = documents.len(), "wrote parsed reports");
    }

    Ok(())
}
