//! Type coercion: raw string input to typed field values.
//!
//! Coercion is independent of restriction validation and never fails hard:
//! every attempt returns a [`CoercedValue`] carrying success/failure plus the
//! attempted value, so callers can report exactly what the input was.

use crate::types::restriction::ScalarValue;
use crate::types::schema::{SchemaField, ValueType};
use crate::types::value::{DataValue, RawValue};

/// Separator applied to raw array input when the field declares none.
pub const DEFAULT_DELIMITER: &str = ",";

/// Outcome of one coercion attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedValue {
    pub valid: bool,
    /// The converted value on success (`None` for absent input), or the
    /// attempted raw input on failure.
    pub value: Option<DataValue>,
}

impl CoercedValue {
    fn of(value: DataValue) -> Self {
        Self {
            valid: true,
            value: Some(value),
        }
    }

    fn absent() -> Self {
        Self {
            valid: true,
            value: None,
        }
    }

    fn invalid(attempted: DataValue) -> Self {
        Self {
            valid: false,
            value: Some(attempted),
        }
    }
}

/// Convert one raw field value to the field's declared type.
///
/// Whitespace-only input converts to absent for scalar fields and to an
/// empty array for array fields. String values are canonicalized against the
/// field's `codeList` entries case/trim-insensitively.
pub fn coerce_field_value(raw: &RawValue, field: &SchemaField) -> CoercedValue {
    if field.is_array {
        coerce_array(raw, field)
    } else {
        coerce_scalar(raw, field)
    }
}

fn coerce_scalar(raw: &RawValue, field: &SchemaField) -> CoercedValue {
    let RawValue::Single(s) = raw else {
        // Array input supplied for a scalar field
        return CoercedValue::invalid(raw.to_data_value());
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CoercedValue::absent();
    }
    match convert_element(trimmed, field) {
        Some(value) => CoercedValue::of(value),
        None => CoercedValue::invalid(DataValue::String(s.clone())),
    }
}

fn coerce_array(raw: &RawValue, field: &SchemaField) -> CoercedValue {
    let elements: Vec<String> = match raw {
        RawValue::Single(s) => {
            if s.trim().is_empty() {
                return CoercedValue::of(empty_array(field.value_type));
            }
            let delimiter = field.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER);
            let parts: Vec<&str> = s.split(delimiter).collect();
            // A leading/trailing delimiter or two adjacent delimiters yield
            // an empty element; that is a conversion failure, not a silent
            // drop.
            if parts.iter().any(|p| p.is_empty()) {
                return CoercedValue::invalid(DataValue::String(s.clone()));
            }
            parts.into_iter().map(|p| p.trim().to_string()).collect()
        }
        RawValue::Multiple(items) => items.iter().map(|p| p.trim().to_string()).collect(),
    };

    match field.value_type {
        ValueType::String => {
            let values = elements
                .iter()
                .map(|e| canonicalize(e, field))
                .collect::<Vec<_>>();
            CoercedValue::of(DataValue::StringArray(values))
        }
        ValueType::Boolean => match elements.iter().map(|e| parse_boolean(e)).collect() {
            Some(values) => CoercedValue::of(DataValue::BooleanArray(values)),
            None => CoercedValue::invalid(raw.to_data_value()),
        },
        ValueType::Integer => match elements.iter().map(|e| parse_integer(e)).collect() {
            Some(values) => CoercedValue::of(DataValue::IntegerArray(values)),
            None => CoercedValue::invalid(raw.to_data_value()),
        },
        ValueType::Number => match elements.iter().map(|e| parse_number(e)).collect() {
            Some(values) => CoercedValue::of(DataValue::NumberArray(values)),
            None => CoercedValue::invalid(raw.to_data_value()),
        },
    }
}

fn convert_element(trimmed: &str, field: &SchemaField) -> Option<DataValue> {
    match field.value_type {
        ValueType::String => Some(DataValue::String(canonicalize(trimmed, field))),
        ValueType::Boolean => parse_boolean(trimmed).map(DataValue::Boolean),
        ValueType::Integer => parse_integer(trimmed).map(DataValue::Integer),
        ValueType::Number => parse_number(trimmed).map(DataValue::Number),
    }
}

fn empty_array(value_type: ValueType) -> DataValue {
    match value_type {
        ValueType::String => DataValue::StringArray(Vec::new()),
        ValueType::Boolean => DataValue::BooleanArray(Vec::new()),
        ValueType::Integer => DataValue::IntegerArray(Vec::new()),
        ValueType::Number => DataValue::NumberArray(Vec::new()),
    }
}

fn parse_boolean(trimmed: &str) -> Option<bool> {
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_number(trimmed: &str) -> Option<f64> {
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_integer(trimmed: &str) -> Option<i64> {
    let n = parse_number(trimmed)?;
    // "180.00" converts to 180; "100.01" is not an integer
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Rewrite a string value to the casing of the matching `codeList` entry, if
/// the field carries one anywhere in its restriction tree. Non-matching
/// values pass through unchanged; the mismatch is a validation concern, not a
/// coercion concern.
fn canonicalize(trimmed: &str, field: &SchemaField) -> String {
    let Some(restrictions) = &field.restrictions else {
        return trimmed.to_string();
    };
    for list in restrictions.code_lists() {
        for entry in list {
            if let ScalarValue::String(canonical) = entry {
                if canonical.trim().eq_ignore_ascii_case(trimmed) {
                    return canonical.trim().to_string();
                }
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::restriction::RestrictionSet;

    fn string_field() -> SchemaField {
        SchemaField::new("f", ValueType::String)
    }

    #[test]
    fn test_whitespace_only_is_absent() {
        let result = coerce_field_value(&"   ".into(), &string_field());
        assert!(result.valid);
        assert_eq!(result.value, None);
    }

    #[test]
    fn test_whitespace_only_array_is_empty() {
        let result = coerce_field_value(&"  ".into(), &string_field().array());
        assert_eq!(result.value, Some(DataValue::StringArray(vec![])));
    }

    #[test]
    fn test_boolean_case_insensitive() {
        let field = SchemaField::new("f", ValueType::Boolean);
        let result = coerce_field_value(&"TrUe".into(), &field);
        assert_eq!(result.value, Some(DataValue::Boolean(true)));
        let result = coerce_field_value(&"yes".into(), &field);
        assert!(!result.valid);
    }

    #[test]
    fn test_integer_requires_zero_fraction() {
        let field = SchemaField::new("f", ValueType::Integer);
        let result = coerce_field_value(&"180.00".into(), &field);
        assert_eq!(result.value, Some(DataValue::Integer(180)));
        let result = coerce_field_value(&"100.01".into(), &field);
        assert!(!result.valid);
        assert_eq!(result.value, Some(DataValue::String("100.01".into())));
    }

    #[test]
    fn test_number_rejects_nan_and_infinity() {
        let field = SchemaField::new("f", ValueType::Number);
        assert!(!coerce_field_value(&"NaN".into(), &field).valid);
        assert!(!coerce_field_value(&"Infinity".into(), &field).valid);
        assert_eq!(
            coerce_field_value(&"1.5e3".into(), &field).value,
            Some(DataValue::Number(1500.0))
        );
    }

    #[test]
    fn test_array_split_and_trim() {
        let field = SchemaField::new("f", ValueType::Integer).array();
        let result = coerce_field_value(&"1, 2 ,3".into(), &field);
        assert_eq!(result.value, Some(DataValue::IntegerArray(vec![1, 2, 3])));
    }

    #[test]
    fn test_array_rejects_empty_elements() {
        let field = string_field().array();
        assert!(!coerce_field_value(&"a,,b".into(), &field).valid);
        assert!(!coerce_field_value(&",a,b".into(), &field).valid);
        assert!(!coerce_field_value(&"a,b,".into(), &field).valid);
    }

    #[test]
    fn test_custom_delimiter() {
        let field = string_field().array().with_delimiter("|");
        let result = coerce_field_value(&"x|y".into(), &field);
        assert_eq!(
            result.value,
            Some(DataValue::StringArray(vec!["x".into(), "y".into()]))
        );
    }

    #[test]
    fn test_code_list_canonicalization() {
        let field = string_field().with_restrictions(
            RestrictionSet::new().with_code_list(["Apple", "Banana", "Carrot", "Donut"]),
        );
        let result = coerce_field_value(&"banana".into(), &field);
        assert_eq!(result.value, Some(DataValue::String("Banana".into())));
        // Non-matching values keep the trimmed original
        let result = coerce_field_value(&" kiwi ".into(), &field);
        assert_eq!(result.value, Some(DataValue::String("kiwi".into())));
    }

    #[test]
    fn test_array_for_scalar_field_fails() {
        let raw: RawValue = vec!["a", "b"].into();
        let result = coerce_field_value(&raw, &string_field());
        assert!(!result.valid);
    }
}
