//! The parse layer: raw records to typed records.
//!
//! Applies type coercion across whole records, schemas, and datasets.
//! Parsing never fails hard: independently-valid fields are always
//! converted, and every coercion failure is reported as an
//! `INVALID_VALUE_TYPE` error alongside the partial result.

use std::collections::BTreeMap;

use tracing::debug;

use crate::coerce::coerce_field_value;
use crate::types::dictionary::Dictionary;
use crate::types::report::{
    DatasetParseResult, InvalidRecord, RecordError, RecordParseResult, SchemaParseResult,
};
use crate::types::schema::Schema;
use crate::types::value::{RawValue, UnprocessedDataRecord};

/// A raw dataset: schema name to raw record array.
pub type RawDataset = BTreeMap<String, Vec<UnprocessedDataRecord>>;

/// Coerce one raw record against a schema.
///
/// Keys absent from the schema are reported as `UNRECOGNIZED_FIELD` and
/// dropped from the typed record (there is no declared type to coerce them
/// to). Declared fields with absent or whitespace-only scalar input are
/// simply omitted.
pub fn parse_record(raw: &UnprocessedDataRecord, schema: &Schema) -> RecordParseResult {
    let mut result = RecordParseResult::default();

    let mut unrecognized: Vec<&String> = raw
        .keys()
        .filter(|name| !schema.has_field(name))
        .collect();
    unrecognized.sort();
    for name in unrecognized {
        result.errors.push(RecordError::UnrecognizedField {
            field_name: name.clone(),
            value: raw.get(name).map(RawValue::to_data_value),
        });
    }

    for field in &schema.fields {
        let Some(raw_value) = raw.get(&field.name) else {
            continue;
        };
        let coerced = coerce_field_value(raw_value, field);
        if coerced.valid {
            if let Some(value) = coerced.value {
                result.record.insert(field.name.clone(), value);
            }
        } else {
            result.errors.push(RecordError::InvalidValueType {
                field_name: field.name.clone(),
                value: coerced.value,
            });
        }
    }

    result
}

/// Coerce one schema's raw records. The typed output is index-aligned with
/// the input.
pub fn parse_schema_data(
    raw_records: &[UnprocessedDataRecord],
    schema: &Schema,
) -> SchemaParseResult {
    debug!(schema = %schema.name, records = raw_records.len(), "parsing schema data");

    let mut records = Vec::with_capacity(raw_records.len());
    let mut invalid_records = Vec::new();
    for (record_index, raw) in raw_records.iter().enumerate() {
        let parsed = parse_record(raw, schema);
        records.push(parsed.record);
        if !parsed.errors.is_empty() {
            invalid_records.push(InvalidRecord {
                record_index,
                errors: parsed.errors,
            });
        }
    }

    SchemaParseResult {
        valid: invalid_records.is_empty(),
        records,
        invalid_records,
    }
}

/// Coerce a full raw dataset. Keys matching no schema are reported as
/// unrecognized and excluded from the typed output.
pub fn parse_dataset(raw: &RawDataset, dictionary: &Dictionary) -> DatasetParseResult {
    let mut result = DatasetParseResult::default();
    for (name, raw_records) in raw {
        match dictionary.schema(name) {
            Some(schema) => {
                result
                    .schemas
                    .insert(name.clone(), parse_schema_data(raw_records, schema));
            }
            None => result.unrecognized_schemas.push(name.clone()),
        }
    }
    result.valid =
        result.unrecognized_schemas.is_empty() && result.schemas.values().all(|s| s.valid);
    result
}
