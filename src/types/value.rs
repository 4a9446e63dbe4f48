//! Typed record values.
//!
//! Field values are represented as an explicit tagged type with one variant
//! per (scalar|array) x (string|number|integer|boolean) combination, so a
//! mismatched shape is visible at construction rather than discovered through
//! ad-hoc runtime checks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::schema::ValueType;

/// A typed field value inside a [`DataRecord`].
///
/// Absent values are represented by the field being missing from the record,
/// not by a variant of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    BooleanArray(Vec<bool>),
    IntegerArray(Vec<i64>),
    NumberArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl DataValue {
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DataValue::BooleanArray(_)
                | DataValue::IntegerArray(_)
                | DataValue::NumberArray(_)
                | DataValue::StringArray(_)
        )
    }

    /// Number of elements for array variants, `None` for scalars.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            DataValue::BooleanArray(v) => Some(v.len()),
            DataValue::IntegerArray(v) => Some(v.len()),
            DataValue::NumberArray(v) => Some(v.len()),
            DataValue::StringArray(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Runtime type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Boolean(_) => "boolean",
            DataValue::Integer(_) => "integer",
            DataValue::Number(_) => "number",
            DataValue::String(_) => "string",
            DataValue::BooleanArray(_) => "boolean[]",
            DataValue::IntegerArray(_) => "integer[]",
            DataValue::NumberArray(_) => "number[]",
            DataValue::StringArray(_) => "string[]",
        }
    }

    /// Whether this value's runtime shape conforms to a declared field type.
    ///
    /// An integer value conforms to a `number` declaration (the coercion pass
    /// may hand back either representation for whole numbers), but not the
    /// other way around.
    pub fn conforms_to(&self, value_type: ValueType, is_array: bool) -> bool {
        match (self, value_type, is_array) {
            (DataValue::Boolean(_), ValueType::Boolean, false) => true,
            (DataValue::Integer(_), ValueType::Integer, false) => true,
            (DataValue::Integer(_), ValueType::Number, false) => true,
            (DataValue::Number(_), ValueType::Number, false) => true,
            (DataValue::String(_), ValueType::String, false) => true,
            (DataValue::BooleanArray(_), ValueType::Boolean, true) => true,
            (DataValue::IntegerArray(_), ValueType::Integer, true) => true,
            (DataValue::IntegerArray(_), ValueType::Number, true) => true,
            (DataValue::NumberArray(_), ValueType::Number, true) => true,
            (DataValue::StringArray(_), ValueType::String, true) => true,
            _ => false,
        }
    }

    /// The scalar string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The scalar numeric value, widening integers to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Integer(i) => Some(*i as f64),
            DataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether the value is an empty string or an empty array.
    pub fn is_empty(&self) -> bool {
        match self {
            DataValue::String(s) => s.is_empty(),
            other => other.array_len() == Some(0),
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{item}")?;
            }
            write!(f, "]")
        }

        match self {
            DataValue::Boolean(b) => write!(f, "{b}"),
            DataValue::Integer(i) => write!(f, "{i}"),
            DataValue::Number(n) => write!(f, "{n}"),
            DataValue::String(s) => write!(f, "{s}"),
            DataValue::BooleanArray(v) => join(f, v),
            DataValue::IntegerArray(v) => join(f, v),
            DataValue::NumberArray(v) => join(f, v),
            DataValue::StringArray(v) => join(f, v),
        }
    }
}

/// A raw, pre-coercion field value as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Single(String),
    Multiple(Vec<String>),
}

impl RawValue {
    /// The raw value carried over as an untyped string value, used when a
    /// coercion attempt fails and the original input must be reported back.
    pub fn to_data_value(&self) -> DataValue {
        match self {
            RawValue::Single(s) => DataValue::String(s.clone()),
            RawValue::Multiple(v) => DataValue::StringArray(v.clone()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Single(s.to_string())
    }
}

impl From<Vec<&str>> for RawValue {
    fn from(v: Vec<&str>) -> Self {
        RawValue::Multiple(v.into_iter().map(str::to_string).collect())
    }
}

/// One typed record: field name to typed value, absent fields omitted.
pub type DataRecord = HashMap<String, DataValue>;

/// One raw record prior to type coercion.
pub type UnprocessedDataRecord = HashMap<String, RawValue>;

/// A hashable key deriving deep equality over field values.
///
/// Used for `unique`/`uniqueKey` grouping and foreign-key index lookups.
/// Whole-number floats normalize to the integer key so `1` and `1.0` group
/// together regardless of which numeric variant a caller supplied; NaN never
/// reaches this point (coercion rejects it).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(u64),
    String(String),
    Array(Vec<ValueKey>),
}

impl ValueKey {
    /// Key for a possibly-absent field value. Absent maps to the canonical
    /// null marker.
    pub fn of(value: Option<&DataValue>) -> Self {
        match value {
            None => ValueKey::Null,
            Some(DataValue::Boolean(b)) => ValueKey::Boolean(*b),
            Some(DataValue::Integer(i)) => ValueKey::Integer(*i),
            Some(DataValue::Number(n)) => Self::of_number(*n),
            Some(DataValue::String(s)) => ValueKey::String(s.clone()),
            Some(DataValue::BooleanArray(v)) => {
                ValueKey::Array(v.iter().map(|b| ValueKey::Boolean(*b)).collect())
            }
            Some(DataValue::IntegerArray(v)) => {
                ValueKey::Array(v.iter().map(|i| ValueKey::Integer(*i)).collect())
            }
            Some(DataValue::NumberArray(v)) => {
                ValueKey::Array(v.iter().map(|n| Self::of_number(*n)).collect())
            }
            Some(DataValue::StringArray(v)) => {
                ValueKey::Array(v.iter().map(|s| ValueKey::String(s.clone())).collect())
            }
        }
    }

    fn of_number(n: f64) -> Self {
        if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
            ValueKey::Integer(n as i64)
        } else {
            ValueKey::Number(n.to_bits())
        }
    }
}
