//! Single-record validation.

use crate::types::report::RecordError;
use crate::types::schema::Schema;
use crate::types::value::DataRecord;

use super::{validate_field, ValidationContext};

/// Validate one full record against a schema.
///
/// Every key absent from the schema yields one `UNRECOGNIZED_FIELD` error;
/// every declared field runs through the field validator, present or not.
/// The record is valid iff the returned list is empty.
pub fn validate_record(
    record: &DataRecord,
    schema: &Schema,
    context: &ValidationContext<'_>,
) -> crate::Result<Vec<RecordError>> {
    let mut errors = Vec::new();

    let mut unrecognized: Vec<&String> = record
        .keys()
        .filter(|name| !schema.has_field(name))
        .collect();
    unrecognized.sort();
    for name in unrecognized {
        errors.push(RecordError::UnrecognizedField {
            field_name: name.clone(),
            value: record.get(name).cloned(),
        });
    }

    for field in &schema.fields {
        if let Some(error) = validate_field(record.get(&field.name), record, field, context)? {
            errors.push(error);
        }
    }

    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::restriction::RestrictionSet;
    use crate::types::schema::{SchemaField, ValueType};
    use crate::types::value::DataValue;

    fn sample_schema() -> Schema {
        Schema::new("sample")
            .with_field(
                SchemaField::new("id", ValueType::String)
                    .with_restrictions(RestrictionSet::new().with_required(true)),
            )
            .with_field(SchemaField::new("count", ValueType::Integer))
    }

    #[test]
    fn test_unrecognized_fields_flagged_once_each() {
        let record = DataRecord::from([
            ("id".to_string(), DataValue::String("a".into())),
            ("bogus".to_string(), DataValue::String("x".into())),
            ("extra".to_string(), DataValue::Integer(1)),
        ]);
        let errors = validate_record(&record, &sample_schema(), &ValidationContext::new()).unwrap();
        let unrecognized: Vec<&str> = errors
            .iter()
            .filter(|e| matches!(e, RecordError::UnrecognizedField { .. }))
            .map(|e| e.field_name())
            .collect();
        assert_eq!(unrecognized, vec!["bogus", "extra"]);
    }

    #[test]
    fn test_declared_fields_validated_even_when_absent() {
        let errors =
            validate_record(&DataRecord::new(), &sample_schema(), &ValidationContext::new())
                .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_name(), "id");
        assert!(matches!(errors[0], RecordError::InvalidByRestriction { .. }));
    }

    #[test]
    fn test_valid_record_has_no_errors() {
        let record = DataRecord::from([
            ("id".to_string(), DataValue::String("a".into())),
            ("count".to_string(), DataValue::Integer(2)),
        ]);
        let errors = validate_record(&record, &sample_schema(), &ValidationContext::new()).unwrap();
        assert!(errors.is_empty());
    }
}
