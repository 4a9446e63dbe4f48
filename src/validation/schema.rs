//! Whole-dataset validation for one schema.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::types::report::{RecordError, SchemaValidationResult};
use crate::types::schema::Schema;
use crate::types::value::{DataRecord, DataValue, ValueKey};

use super::{validate_record, ValidationContext};

/// Validate an array of records against one schema: the per-record pass,
/// then the dataset-wide `unique` and `uniqueKey` constraints.
///
/// Dataset errors land on every member of a colliding group, merged with the
/// per-record errors at the same index. All errors across all records are
/// collected before returning; there is no early exit.
pub fn validate_schema_data(
    records: &[DataRecord],
    schema: &Schema,
    context: &ValidationContext<'_>,
) -> crate::Result<SchemaValidationResult> {
    debug!(schema = %schema.name, records = records.len(), "validating schema data");

    let mut per_record: Vec<Vec<RecordError>> = Vec::with_capacity(records.len());
    for record in records {
        per_record.push(validate_record(record, schema, context)?);
    }

    check_unique_fields(records, schema, &mut per_record);
    check_unique_key(records, schema, &mut per_record);

    Ok(SchemaValidationResult::from_record_errors(per_record))
}

/// Group records by each `unique`-restricted field's value; every member of a
/// group larger than one is flagged. Absent values do not participate: a
/// missing value is not a duplicate.
fn check_unique_fields(
    records: &[DataRecord],
    schema: &Schema,
    per_record: &mut [Vec<RecordError>],
) {
    for field in schema.fields.iter().filter(|f| f.has_unique_restriction()) {
        let mut groups: HashMap<ValueKey, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            let Some(value) = record.get(&field.name) else {
                continue;
            };
            groups
                .entry(ValueKey::of(Some(value)))
                .or_default()
                .push(index);
        }

        let mut duplicated: Vec<&Vec<usize>> =
            groups.values().filter(|indices| indices.len() > 1).collect();
        duplicated.sort_by_key(|indices| indices[0]);
        for indices in duplicated {
            for &index in indices {
                per_record[index].push(RecordError::InvalidByUnique {
                    field_name: field.name.clone(),
                    value: records[index].get(&field.name).cloned(),
                });
            }
        }
    }
}

/// Group records by the composite tuple over the schema's `uniqueKey`
/// fields. Missing fields take the canonical null marker, so fully-empty
/// composite keys do collide.
fn check_unique_key(records: &[DataRecord], schema: &Schema, per_record: &mut [Vec<RecordError>]) {
    let Some(unique_key) = schema
        .restrictions
        .as_ref()
        .and_then(|r| r.unique_key.as_ref())
    else {
        return;
    };

    let mut groups: HashMap<Vec<ValueKey>, Vec<usize>> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let key: Vec<ValueKey> = unique_key
            .iter()
            .map(|field| ValueKey::of(record.get(field)))
            .collect();
        groups.entry(key).or_default().push(index);
    }

    let mut duplicated: Vec<&Vec<usize>> =
        groups.values().filter(|indices| indices.len() > 1).collect();
    duplicated.sort_by_key(|indices| indices[0]);
    for indices in duplicated {
        for &index in indices {
            let value: BTreeMap<String, Option<DataValue>> = unique_key
                .iter()
                .map(|field| (field.clone(), records[index].get(field).cloned()))
                .collect();
            per_record[index].push(RecordError::InvalidByUniqueKey {
                field_name: unique_key.join(", "),
                unique_key_fields: unique_key.clone(),
                value,
                matching_records: indices.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::restriction::RestrictionSet;
    use crate::types::schema::{SchemaField, ValueType};

    fn record(entries: &[(&str, DataValue)]) -> DataRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_unique_flags_every_member() {
        let schema = Schema::new("sample").with_field(
            SchemaField::new("id", ValueType::String)
                .with_restrictions(RestrictionSet::new().with_unique(true)),
        );
        let records = vec![
            record(&[("id", DataValue::String("dup".into()))]),
            record(&[("id", DataValue::String("solo".into()))]),
            record(&[("id", DataValue::String("dup".into()))]),
        ];
        let result =
            validate_schema_data(&records, &schema, &ValidationContext::new()).unwrap();
        assert!(!result.valid);
        assert_eq!(result.invalid_records.len(), 2);
        assert_eq!(result.invalid_records[0].record_index, 0);
        assert_eq!(result.invalid_records[1].record_index, 2);
    }

    #[test]
    fn test_unique_skips_absent_values() {
        let schema = Schema::new("sample").with_field(
            SchemaField::new("id", ValueType::String)
                .with_restrictions(RestrictionSet::new().with_unique(true)),
        );
        let records = vec![DataRecord::new(), DataRecord::new()];
        let result =
            validate_schema_data(&records, &schema, &ValidationContext::new()).unwrap();
        assert!(result.valid);
    }

    #[test]
    fn test_unique_key_missing_fields_collide() {
        let schema = Schema::new("sample")
            .with_field(SchemaField::new("a", ValueType::String))
            .with_field(SchemaField::new("b", ValueType::Integer))
            .with_unique_key(["a", "b"]);
        let records = vec![DataRecord::new(), DataRecord::new()];
        let result =
            validate_schema_data(&records, &schema, &ValidationContext::new()).unwrap();
        assert!(!result.valid);
        for invalid in &result.invalid_records {
            match &invalid.errors[0] {
                RecordError::InvalidByUniqueKey {
                    matching_records, ..
                } => assert_eq!(matching_records, &vec![0, 1]),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }
}
