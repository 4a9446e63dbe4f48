//! Single-field validation.

use crate::types::report::{RecordError, RestrictionViolation};
use crate::types::restriction::{RangeRule, ResolvedRestriction, ScalarValue};
use crate::types::schema::SchemaField;
use crate::types::value::{DataRecord, DataValue};

use super::{compile_full_match, resolve_restrictions, ValidationContext};

/// Validate one field value against its declared type and its resolved
/// restrictions.
///
/// A wrong runtime shape short-circuits with `INVALID_VALUE_TYPE`, since
/// restriction checks are meaningless on a mistyped value. Otherwise every
/// resolved rule is evaluated independently and all failures are collected
/// into one `INVALID_BY_RESTRICTION` error. `Ok(None)` means the field is
/// valid.
pub fn validate_field(
    value: Option<&DataValue>,
    record: &DataRecord,
    field: &SchemaField,
    context: &ValidationContext<'_>,
) -> crate::Result<Option<RecordError>> {
    if let Some(v) = value {
        if !v.conforms_to(field.value_type, field.is_array) {
            return Ok(Some(RecordError::InvalidValueType {
                field_name: field.name.clone(),
                value: Some(v.clone()),
            }));
        }
    }

    let Some(restrictions) = &field.restrictions else {
        return Ok(None);
    };

    let mut violations = Vec::new();
    for rule in resolve_restrictions(restrictions, record)? {
        if let Some(violation) = check_rule(&rule, value, record, context)? {
            violations.push(violation);
        }
    }

    if violations.is_empty() {
        Ok(None)
    } else {
        Ok(Some(RecordError::InvalidByRestriction {
            field_name: field.name.clone(),
            value: value.cloned(),
            errors: violations,
        }))
    }
}

fn check_rule(
    rule: &ResolvedRestriction,
    value: Option<&DataValue>,
    record: &DataRecord,
    context: &ValidationContext<'_>,
) -> crate::Result<Option<RestrictionViolation>> {
    match rule {
        ResolvedRestriction::Required => Ok(check_required(rule, value)),
        ResolvedRestriction::CodeList(entries) => Ok(check_code_list(rule, value, entries)),
        ResolvedRestriction::Regex(pattern) => check_regex(rule, value, pattern),
        ResolvedRestriction::Range(range) => Ok(check_range(rule, value, range)),
        // Uniqueness is a dataset-wide constraint, evaluated by the schema
        // validator over all records at once.
        ResolvedRestriction::Unique => Ok(None),
        ResolvedRestriction::Validator(name) => check_validator(rule, name, value, record, context),
    }
}

fn check_required(
    rule: &ResolvedRestriction,
    value: Option<&DataValue>,
) -> Option<RestrictionViolation> {
    match value {
        None => Some(RestrictionViolation::new(
            rule.clone(),
            "A required value is missing",
        )),
        Some(v) if v.is_empty() => Some(RestrictionViolation::new(
            rule.clone(),
            "A required value is empty",
        )),
        Some(DataValue::StringArray(items)) => {
            let empty: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_empty())
                .map(|(i, _)| i)
                .collect();
            if empty.is_empty() {
                None
            } else {
                Some(
                    RestrictionViolation::new(rule.clone(), "A required value has empty entries")
                        .with_invalid_items(empty),
                )
            }
        }
        Some(_) => None,
    }
}

fn check_code_list(
    rule: &ResolvedRestriction,
    value: Option<&DataValue>,
    entries: &[ScalarValue],
) -> Option<RestrictionViolation> {
    let message = "The value is not an entry of the code list";
    match value {
        None => None,
        Some(DataValue::String(s)) => {
            (!string_in_list(s, entries)).then(|| RestrictionViolation::new(rule.clone(), message))
        }
        Some(DataValue::Integer(i)) => (!number_in_list(*i as f64, entries))
            .then(|| RestrictionViolation::new(rule.clone(), message)),
        Some(DataValue::Number(n)) => (!number_in_list(*n, entries))
            .then(|| RestrictionViolation::new(rule.clone(), message)),
        Some(DataValue::StringArray(items)) => {
            invalid_positions(items.iter().map(|s| string_in_list(s, entries)))
                .map(|positions| items_violation(rule, message, positions))
        }
        Some(DataValue::IntegerArray(items)) => {
            invalid_positions(items.iter().map(|i| number_in_list(*i as f64, entries)))
                .map(|positions| items_violation(rule, message, positions))
        }
        Some(DataValue::NumberArray(items)) => {
            invalid_positions(items.iter().map(|n| number_in_list(*n, entries)))
                .map(|positions| items_violation(rule, message, positions))
        }
        // Code lists hold strings and numbers only
        Some(DataValue::Boolean(_)) | Some(DataValue::BooleanArray(_)) => None,
    }
}

fn check_regex(
    rule: &ResolvedRestriction,
    value: Option<&DataValue>,
    pattern: &str,
) -> crate::Result<Option<RestrictionViolation>> {
    let re = compile_full_match(pattern)?;
    let message = format!("The value must match the regular expression '{pattern}'");
    Ok(match value {
        Some(DataValue::String(s)) => {
            (!re.is_match(s)).then(|| RestrictionViolation::new(rule.clone(), message.clone()))
        }
        Some(DataValue::StringArray(items)) => {
            invalid_positions(items.iter().map(|s| re.is_match(s)))
                .map(|positions| items_violation(rule, &message, positions))
        }
        // Non-string values and absent values pass through
        _ => None,
    })
}

fn check_range(
    rule: &ResolvedRestriction,
    value: Option<&DataValue>,
    range: &RangeRule,
) -> Option<RestrictionViolation> {
    let message = format!("The value must be within the range {range}");
    match value {
        Some(DataValue::Integer(i)) => (!range.contains(*i as f64))
            .then(|| RestrictionViolation::new(rule.clone(), message.clone())),
        Some(DataValue::Number(n)) => {
            (!range.contains(*n)).then(|| RestrictionViolation::new(rule.clone(), message.clone()))
        }
        Some(DataValue::IntegerArray(items)) => {
            invalid_positions(items.iter().map(|i| range.contains(*i as f64)))
                .map(|positions| items_violation(rule, &message, positions))
        }
        Some(DataValue::NumberArray(items)) => {
            invalid_positions(items.iter().map(|n| range.contains(*n)))
                .map(|positions| items_violation(rule, &message, positions))
        }
        // Non-numeric values and absent values pass through
        _ => None,
    }
}

fn check_validator(
    rule: &ResolvedRestriction,
    name: &str,
    value: Option<&DataValue>,
    record: &DataRecord,
    context: &ValidationContext<'_>,
) -> crate::Result<Option<RestrictionViolation>> {
    let validator = context
        .registry
        .and_then(|registry| registry.get(name))
        .ok_or_else(|| crate::DictionaryError::UnknownValidator {
            name: name.to_string(),
        })?;
    let outcome = validator.validate(value, record);
    if outcome.valid {
        Ok(None)
    } else {
        let message = outcome
            .message
            .unwrap_or_else(|| format!("The value was rejected by validator '{name}'"));
        Ok(Some(RestrictionViolation::new(rule.clone(), message)))
    }
}

fn string_in_list(value: &str, entries: &[ScalarValue]) -> bool {
    entries.iter().any(|entry| {
        matches!(entry, ScalarValue::String(e) if e.trim().eq_ignore_ascii_case(value.trim()))
    })
}

fn number_in_list(value: f64, entries: &[ScalarValue]) -> bool {
    entries.iter().any(|entry| match entry {
        ScalarValue::Integer(i) => *i as f64 == value,
        ScalarValue::Number(n) => *n == value,
        _ => false,
    })
}

/// 0-based positions of the failing elements, `None` when all pass.
fn invalid_positions(results: impl Iterator<Item = bool>) -> Option<Vec<usize>> {
    let positions: Vec<usize> = results
        .enumerate()
        .filter(|(_, ok)| !ok)
        .map(|(i, _)| i)
        .collect();
    (!positions.is_empty()).then_some(positions)
}

fn items_violation(
    rule: &ResolvedRestriction,
    message: &str,
    positions: Vec<usize>,
) -> RestrictionViolation {
    RestrictionViolation::new(rule.clone(), message).with_invalid_items(positions)
}
