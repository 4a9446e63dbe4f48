//! Full-dataset validation against a dictionary.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::types::dictionary::Dictionary;
use crate::types::report::{DictionaryValidationResult, InvalidRecord, RecordError};
use crate::types::schema::ForeignKeyGroup;
use crate::types::value::{DataRecord, DataValue, ValueKey};

use super::{schema::validate_schema_data, ValidationContext};

/// A typed dataset: schema name to record array.
pub type Dataset = BTreeMap<String, Vec<DataRecord>>;

/// Validate a named map of record arrays against a full dictionary.
///
/// Dataset keys matching no schema are reported as unrecognized; every
/// recognized schema runs the schema validator, then each declared
/// `foreignKey` group is checked against an index built once over the
/// referenced schema's rows.
pub fn validate_dataset(
    dataset: &Dataset,
    dictionary: &Dictionary,
    context: &ValidationContext<'_>,
) -> crate::Result<DictionaryValidationResult> {
    debug!(
        dictionary = %dictionary.name,
        version = %dictionary.version,
        schemas = dataset.len(),
        "validating dataset"
    );

    let mut result = DictionaryValidationResult::default();

    for (name, records) in dataset {
        match dictionary.schema(name) {
            Some(schema) => {
                let schema_result = validate_schema_data(records, schema, context)?;
                result.schemas.insert(name.clone(), schema_result);
            }
            None => result.unrecognized_schemas.push(name.clone()),
        }
    }

    for (name, records) in dataset {
        let Some(schema) = dictionary.schema(name) else {
            continue;
        };
        for group in schema.foreign_key_groups() {
            let errors = check_foreign_key_group(records, group, dataset);
            if let Some(schema_result) = result.schemas.get_mut(name) {
                schema_result.merge(errors);
            }
        }
    }

    result.recompute_validity();
    Ok(result)
}

/// Check one composite foreign-key group for every candidate record.
///
/// The foreign tuple index is built once per group and reused across all
/// candidates. A record whose local fields are all absent/empty skips the
/// check entirely.
fn check_foreign_key_group(
    records: &[DataRecord],
    group: &ForeignKeyGroup,
    dataset: &Dataset,
) -> Vec<InvalidRecord> {
    let foreign_rows: &[DataRecord] = dataset
        .get(&group.schema)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let index: HashSet<Vec<ValueKey>> = foreign_rows
        .iter()
        .map(|row| {
            group
                .mappings
                .iter()
                .map(|mapping| ValueKey::of(row.get(&mapping.foreign)))
                .collect()
        })
        .collect();

    let mut errors = Vec::new();
    for (record_index, record) in records.iter().enumerate() {
        let all_empty = group
            .mappings
            .iter()
            .all(|mapping| is_absent_or_empty(record.get(&mapping.local)));
        if all_empty {
            continue;
        }

        let key: Vec<ValueKey> = group
            .mappings
            .iter()
            .map(|mapping| ValueKey::of(record.get(&mapping.local)))
            .collect();
        if index.contains(&key) {
            continue;
        }

        let local_fields: Vec<String> =
            group.mappings.iter().map(|m| m.local.clone()).collect();
        let value: BTreeMap<String, Option<DataValue>> = group
            .mappings
            .iter()
            .map(|m| (m.local.clone(), record.get(&m.local).cloned()))
            .collect();
        errors.push(InvalidRecord {
            record_index,
            errors: vec![RecordError::InvalidByForeignKey {
                field_name: local_fields.join(", "),
                foreign_key_fields: local_fields,
                value,
                foreign_schema: group.schema.clone(),
            }],
        });
    }
    errors
}

fn is_absent_or_empty(value: Option<&DataValue>) -> bool {
    value.is_none_or(DataValue::is_empty)
}
