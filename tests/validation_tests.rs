mod common;

use common::*;
use datadict::*;

#[test]
fn test_unrecognized_fields_produce_one_error_each() {
    let schema = fruit_schema();
    let record = typed_record(&[
        ("fruit", DataValue::String("Apple".into())),
        ("color", DataValue::String("red".into())),
        ("weight", DataValue::Integer(12)),
    ]);

    let errors = validate_record(&record, &schema, &ValidationContext::new()).unwrap();
    let mut unrecognized: Vec<&str> = errors
        .iter()
        .filter(|e| matches!(e, RecordError::UnrecognizedField { .. }))
        .map(|e| e.field_name())
        .collect();
    unrecognized.sort();
    assert_eq!(unrecognized, vec!["color", "weight"]);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_regex_restriction_reports_array_positions() {
    let schema = fruit_schema();
    let record = typed_record(&[(
        "labels",
        DataValue::StringArray(vec!["que".into(), "not_q".into()]),
    )]);

    let errors = validate_record(&record, &schema, &ValidationContext::new()).unwrap();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        RecordError::InvalidByRestriction {
            field_name, errors, ..
        } => {
            assert_eq!(field_name, "labels");
            assert_eq!(errors[0].invalid_items, Some(vec![1]));
            assert!(matches!(errors[0].restriction, ResolvedRestriction::Regex(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_code_list_restriction_on_typed_value() {
    let schema = fruit_schema();
    let valid = typed_record(&[("fruit", DataValue::String("banana".into()))]);
    assert!(validate_record(&valid, &schema, &ValidationContext::new())
        .unwrap()
        .is_empty());

    let invalid = typed_record(&[("fruit", DataValue::String("kiwi".into()))]);
    let errors = validate_record(&invalid, &schema, &ValidationContext::new()).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], RecordError::InvalidByRestriction { .. }));
}

#[test]
fn test_nested_conditional_gate_open() {
    let schema = nested_conditional_schema();

    // Gate matches and the numeric sibling is >= 0: the conditional field
    // must be alphabetic only.
    let alpha = typed_record(&[
        ("gate_text", DataValue::String("some repeated text here".into())),
        ("score", DataValue::Integer(4)),
        ("fieldStringNestedConditional", DataValue::String("Valid".into())),
    ]);
    assert!(validate_record(&alpha, &schema, &ValidationContext::new())
        .unwrap()
        .is_empty());

    let digits = typed_record(&[
        ("gate_text", DataValue::String("some repeated text here".into())),
        ("score", DataValue::Integer(4)),
        ("fieldStringNestedConditional", DataValue::String("nope123".into())),
    ]);
    let errors = validate_record(&digits, &schema, &ValidationContext::new()).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field_name(), "fieldStringNestedConditional");
}

#[test]
fn test_nested_conditional_gate_closed() {
    let schema = nested_conditional_schema();

    // Gate fails: the conditional field must be empty.
    let with_value = typed_record(&[
        ("gate_text", DataValue::String("something else".into())),
        ("fieldStringNestedConditional", DataValue::String("oops".into())),
    ]);
    let errors = validate_record(&with_value, &schema, &ValidationContext::new()).unwrap();
    assert_eq!(errors.len(), 1);

    let without_value =
        typed_record(&[("gate_text", DataValue::String("something else".into()))]);
    assert!(
        validate_record(&without_value, &schema, &ValidationContext::new())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_nested_conditional_inner_gate_closed() {
    let schema = nested_conditional_schema();

    // Outer gate matches but the numeric sibling is negative: the inner
    // conditional has no else branch, so nothing applies.
    let record = typed_record(&[
        ("gate_text", DataValue::String("repeated text".into())),
        ("score", DataValue::Integer(-3)),
        ("fieldStringNestedConditional", DataValue::String("anything 123".into())),
    ]);
    assert!(validate_record(&record, &schema, &ValidationContext::new())
        .unwrap()
        .is_empty());
}

#[test]
fn test_named_validator_through_registry() {
    use std::sync::Arc;

    let schema = Schema::new("sample").with_field(
        SchemaField::new("even", ValueType::Integer)
            .with_restrictions(RestrictionSet::new().with_validator("even-number")),
    );
    let registry = ValidatorRegistry::new().with_validator(
        "even-number",
        Arc::new(|value: Option<&DataValue>, _record: &DataRecord| match value {
            Some(DataValue::Integer(i)) if i % 2 == 0 => ValidatorOutcome::valid(),
            None => ValidatorOutcome::valid(),
            _ => ValidatorOutcome::invalid("value must be an even number"),
        }),
    );
    let context = ValidationContext::with_registry(&registry);

    let ok = typed_record(&[("even", DataValue::Integer(4))]);
    assert!(validate_record(&ok, &schema, &context).unwrap().is_empty());

    let bad = typed_record(&[("even", DataValue::Integer(3))]);
    let errors = validate_record(&bad, &schema, &context).unwrap();
    match &errors[0] {
        RecordError::InvalidByRestriction { errors, .. } => {
            assert_eq!(errors[0].message, "value must be an even number");
        }
        other => panic!("unexpected error {other:?}"),
    }

    // Without a registry the named validator is a schema-authoring fault
    let result = validate_record(&bad, &schema, &ValidationContext::new());
    assert!(matches!(
        result,
        Err(DictionaryError::UnknownValidator { .. })
    ));
}

#[test]
fn test_validation_is_idempotent() {
    let schema = fruit_schema();
    let record = typed_record(&[
        ("fruit", DataValue::String("Apple".into())),
        ("labels", DataValue::StringArray(vec!["quick".into()])),
    ]);
    let first = validate_record(&record, &schema, &ValidationContext::new()).unwrap();
    let second = validate_record(&record, &schema, &ValidationContext::new()).unwrap();
    assert!(first.is_empty());
    assert_eq!(first, second);
}
