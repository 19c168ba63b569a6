use super::error::ReportError;
use super::types::{ParsedRecord, RecordDraft, WaterType};

/// Accepts a draft as a record, or reports why the document is unusable.
pub fn validate_record(draft: RecordDraft) -> Result<ParsedRecord, ReportError> {
    let lab_name = draft.lab_name.filter(|name| !name.trim().is_empty());
    let test_date = draft.metadata.test_date;

    let mut missing = Vec::new();
    if lab_name.is_none() {
        missing.push("lab_name");
    }
    if test_date.is_none() {
        missing.push("test_date");
    }

    let (Some(lab_name), Some(test_date)) = (lab_name, test_date) else {
        return Err(ReportError::MissingRequiredFields { fields: missing });
    };

    let body = draft.body;
    if body.elements.is_empty() && body.statuses.is_empty() {
        return Err(ReportError::NoElementData {
            water_type: draft
                .water_type
                .map(|water_type| water_type.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }
    let water_type = draft.water_type.unwrap_or(WaterType::PRIMARY);

    Ok(ParsedRecord {
        lab_name,
        test_id: draft.metadata.test_id,
        sample_date: draft.metadata.sample_date,
        received_date: draft.metadata.received_date,
        evaluated_date: draft.metadata.evaluated_date,
        test_date,
        water_type,
        scores: body.scores,
        elements: body.elements,
        statuses: body.statuses,
        recommendations: body.recommendations,
        dosing_instructions: body.dosing_instructions,
    })
}
