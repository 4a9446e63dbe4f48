//! Validation and parse result types.
//!
//! The engine never panics or errors on bad data: every operation returns a
//! result carrying the complete list of failures, so a caller can show both
//! the errors and everything that did succeed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::restriction::ResolvedRestriction;
use super::value::{DataRecord, DataValue};

/// Detail for one failing resolved rule on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestrictionViolation {
    pub restriction: ResolvedRestriction,
    pub message: String,
    /// 0-based positions of the offending elements, for array-valued fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_items: Option<Vec<usize>>,
}

impl RestrictionViolation {
    pub fn new(restriction: ResolvedRestriction, message: impl Into<String>) -> Self {
        Self {
            restriction,
            message: message.into(),
            invalid_items: None,
        }
    }

    pub fn with_invalid_items(mut self, items: Vec<usize>) -> Self {
        self.invalid_items = Some(items);
        self
    }
}

/// One validation error on one record, discriminated by reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum RecordError {
    #[serde(rename = "UNRECOGNIZED_FIELD", rename_all = "camelCase")]
    UnrecognizedField {
        field_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<DataValue>,
    },

    #[serde(rename = "INVALID_VALUE_TYPE", rename_all = "camelCase")]
    InvalidValueType {
        field_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<DataValue>,
    },

    #[serde(rename = "INVALID_BY_RESTRICTION", rename_all = "camelCase")]
    InvalidByRestriction {
        field_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<DataValue>,
        errors: Vec<RestrictionViolation>,
    },

    #[serde(rename = "INVALID_BY_UNIQUE", rename_all = "camelCase")]
    InvalidByUnique {
        field_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<DataValue>,
    },

    #[serde(rename = "INVALID_BY_UNIQUE_KEY", rename_all = "camelCase")]
    InvalidByUniqueKey {
        field_name: String,
        unique_key_fields: Vec<String>,
        value: BTreeMap<String, Option<DataValue>>,
        /// Indices of every record sharing this composite key, self included.
        matching_records: Vec<usize>,
    },

    #[serde(rename = "INVALID_BY_FOREIGNKEY", rename_all = "camelCase")]
    InvalidByForeignKey {
        field_name: String,
        foreign_key_fields: Vec<String>,
        value: BTreeMap<String, Option<DataValue>>,
        foreign_schema: String,
    },
}

impl RecordError {
    /// The field this error is anchored to. Composite-key errors report the
    /// joined field list.
    pub fn field_name(&self) -> &str {
        match self {
            RecordError::UnrecognizedField { field_name, .. }
            | RecordError::InvalidValueType { field_name, .. }
            | RecordError::InvalidByRestriction { field_name, .. }
            | RecordError::InvalidByUnique { field_name, .. }
            | RecordError::InvalidByUniqueKey { field_name, .. }
            | RecordError::InvalidByForeignKey { field_name, .. } => field_name,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            RecordError::UnrecognizedField { .. } => "UNRECOGNIZED_FIELD",
            RecordError::InvalidValueType { .. } => "INVALID_VALUE_TYPE",
            RecordError::InvalidByRestriction { .. } => "INVALID_BY_RESTRICTION",
            RecordError::InvalidByUnique { .. } => "INVALID_BY_UNIQUE",
            RecordError::InvalidByUniqueKey { .. } => "INVALID_BY_UNIQUE_KEY",
            RecordError::InvalidByForeignKey { .. } => "INVALID_BY_FOREIGNKEY",
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on field '{}'", self.reason(), self.field_name())
    }
}

/// All errors found on one record of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidRecord {
    pub record_index: usize,
    pub errors: Vec<RecordError>,
}

/// Result of validating one schema's records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaValidationResult {
    pub valid: bool,
    /// Records with at least one error, ordered by record index.
    #[serde(default)]
    pub invalid_records: Vec<InvalidRecord>,
}

impl SchemaValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            invalid_records: Vec::new(),
        }
    }

    pub fn from_record_errors(per_record: Vec<Vec<RecordError>>) -> Self {
        let invalid_records: Vec<InvalidRecord> = per_record
            .into_iter()
            .enumerate()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(record_index, errors)| InvalidRecord {
                record_index,
                errors,
            })
            .collect();
        Self {
            valid: invalid_records.is_empty(),
            invalid_records,
        }
    }

    /// Errors recorded for one record index, empty if the record is valid.
    pub fn errors_for(&self, record_index: usize) -> &[RecordError] {
        self.invalid_records
            .iter()
            .find(|r| r.record_index == record_index)
            .map(|r| r.errors.as_slice())
            .unwrap_or(&[])
    }

    /// Fold additional errors into this result, keeping index order.
    pub fn merge(&mut self, extra: Vec<InvalidRecord>) {
        for incoming in extra {
            if incoming.errors.is_empty() {
                continue;
            }
            match self
                .invalid_records
                .iter_mut()
                .find(|r| r.record_index == incoming.record_index)
            {
                Some(existing) => existing.errors.extend(incoming.errors),
                None => self.invalid_records.push(incoming),
            }
        }
        self.invalid_records.sort_by_key(|r| r.record_index);
        self.valid = self.invalid_records.is_empty();
    }
}

/// Result of validating a full dataset against a dictionary, nested by
/// schema name and record index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryValidationResult {
    pub valid: bool,
    /// Dataset keys that match no schema in the dictionary.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unrecognized_schemas: Vec<String>,
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaValidationResult>,
}

impl DictionaryValidationResult {
    pub fn recompute_validity(&mut self) {
        self.valid =
            self.unrecognized_schemas.is_empty() && self.schemas.values().all(|s| s.valid);
    }
}

/// Result of coercing one raw record: the typed record plus any per-field
/// coercion failures. Independently-valid fields are always converted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordParseResult {
    pub record: DataRecord,
    pub errors: Vec<RecordError>,
}

impl RecordParseResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of coercing one schema's raw records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaParseResult {
    pub valid: bool,
    /// Typed records, index-aligned with the raw input.
    pub records: Vec<DataRecord>,
    pub invalid_records: Vec<InvalidRecord>,
}

/// Result of coercing a full raw dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatasetParseResult {
    pub valid: bool,
    pub unrecognized_schemas: Vec<String>,
    pub schemas: BTreeMap<String, SchemaParseResult>,
}

impl DatasetParseResult {
    /// The typed dataset, one entry per recognized schema.
    pub fn data(&self) -> BTreeMap<String, Vec<DataRecord>> {
        self.schemas
            .iter()
            .map(|(name, result)| (name.clone(), result.records.clone()))
            .collect()
    }
}
