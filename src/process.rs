//! The process layer: coercion and validation in one call.
//!
//! This is the surface embedding applications consume: hand in raw tabular
//! data and a dictionary, get back the typed data plus one merged error
//! report. Validation errors on a field that already failed coercion are
//! suppressed; the coercion failure is the root cause and restriction checks
//! against an absent value would only add noise.

use std::collections::{HashMap, HashSet};

use crate::parse::{parse_dataset, parse_record, parse_schema_data, RawDataset};
use crate::types::dictionary::Dictionary;
use crate::types::report::{
    DictionaryValidationResult, InvalidRecord, RecordError, SchemaValidationResult,
};
use crate::types::schema::Schema;
use crate::types::value::{DataRecord, UnprocessedDataRecord};
use crate::validation::{
    validate_dataset, validate_record, validate_schema_data, Dataset, ValidationContext,
};

/// Typed data plus the merged parse/validation report for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDataset {
    pub valid: bool,
    pub data: Dataset,
    pub result: DictionaryValidationResult,
}

/// Coerce and validate one record.
pub fn process_record(
    raw: &UnprocessedDataRecord,
    schema: &Schema,
    context: &ValidationContext<'_>,
) -> crate::Result<(DataRecord, Vec<RecordError>)> {
    let parsed = parse_record(raw, schema);
    let failed = coercion_failures(&parsed.errors);
    let mut errors = parsed.errors;
    for error in validate_record(&parsed.record, schema, context)? {
        if !failed.contains(error.field_name()) {
            errors.push(error);
        }
    }
    Ok((parsed.record, errors))
}

/// Coerce and validate one schema's records, including the dataset-wide
/// `unique`/`uniqueKey` pass.
pub fn process_schema_data(
    raw_records: &[UnprocessedDataRecord],
    schema: &Schema,
    context: &ValidationContext<'_>,
) -> crate::Result<(Vec<DataRecord>, SchemaValidationResult)> {
    let parsed = parse_schema_data(raw_records, schema);
    let validation = validate_schema_data(&parsed.records, schema, context)?;
    let combined = combine(parsed.invalid_records, validation);
    Ok((parsed.records, combined))
}

/// Coerce and validate a full raw dataset against a dictionary.
///
/// Structural invariants of the dictionary are checked first; a malformed
/// dictionary is an authoring-time fault and surfaces as `Err`, never as a
/// data error.
pub fn process_dataset(
    raw: &RawDataset,
    dictionary: &Dictionary,
    context: &ValidationContext<'_>,
) -> crate::Result<ProcessedDataset> {
    dictionary.validate_structure()?;

    let parsed = parse_dataset(raw, dictionary);
    let data = parsed.data();
    let mut result = validate_dataset(&data, dictionary, context)?;

    for (name, parse_result) in parsed.schemas {
        let validation = result.schemas.remove(&name).unwrap_or_default();
        result
            .schemas
            .insert(name, combine(parse_result.invalid_records, validation));
    }
    result.unrecognized_schemas = parsed.unrecognized_schemas;
    result.recompute_validity();

    Ok(ProcessedDataset {
        valid: result.valid,
        data,
        result,
    })
}

/// Merge coercion errors with validation errors, coercion first, suppressing
/// validation errors on fields whose coercion already failed.
fn combine(
    parse_errors: Vec<InvalidRecord>,
    mut validation: SchemaValidationResult,
) -> SchemaValidationResult {
    let failed_by_index: HashMap<usize, HashSet<String>> = parse_errors
        .iter()
        .map(|invalid| (invalid.record_index, coercion_failures(&invalid.errors)))
        .collect();

    for invalid in &mut validation.invalid_records {
        if let Some(failed) = failed_by_index.get(&invalid.record_index) {
            invalid.errors.retain(|e| !failed.contains(e.field_name()));
        }
    }
    validation.invalid_records.retain(|r| !r.errors.is_empty());

    let mut combined = SchemaValidationResult {
        valid: true,
        invalid_records: parse_errors,
    };
    combined.merge(validation.invalid_records);
    combined
}

fn coercion_failures(errors: &[RecordError]) -> HashSet<String> {
    errors
        .iter()
        .filter(|e| matches!(e, RecordError::InvalidValueType { .. }))
        .map(|e| e.field_name().to_string())
        .collect()
}
