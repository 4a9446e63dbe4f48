//! datadict - schema-driven data dictionary validation and type coercion.
//!
//! This crate defines versioned, structured data dictionaries (collections
//! of record schemas with typed fields and declarative restrictions) and
//! validates/coerces tabular data against them. It is a pure function of
//! (definitions, data) -> (typed data, error report): no I/O, no persistent
//! state, and no panics on bad data.
//!
//! # Quick Start
//!
//! ```
//! use datadict::{
//!     Dictionary, RawDataset, RestrictionSet, Schema, SchemaField, ValidationContext, ValueType,
//! };
//!
//! let dictionary = Dictionary::new("clinical", "1.0").with_schema(
//!     Schema::new("donor").with_field(
//!         SchemaField::new("donor_id", ValueType::String)
//!             .with_restrictions(RestrictionSet::new().with_required(true)),
//!     ),
//! );
//!
//! let mut dataset = RawDataset::new();
//! dataset.insert(
//!     "donor".to_string(),
//!     vec![[("donor_id".to_string(), "D-1".into())].into_iter().collect()],
//! );
//!
//! let processed =
//!     datadict::process_dataset(&dataset, &dictionary, &ValidationContext::new()).unwrap();
//! assert!(processed.valid);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Dictionaries, schemas, restrictions, typed values, reports
//! - [`coerce`] - Raw string input to typed values
//! - [`validation`] - The field/record/schema/dictionary validators
//! - [`parse`] - Coercion over whole records, schemas, and datasets
//! - [`process`] - Coerce-and-validate in one call
//! - [`registry`] - Host-registered named validators

pub mod coerce;
pub mod error;
pub mod parse;
pub mod process;
pub mod registry;
pub mod types;
pub mod validation;

// Error exports
pub use error::{DictionaryError, Result};

// Type exports
pub use types::{
    Condition, ConditionClause, ConditionMatch, ConditionalRestriction, DataRecord, DataValue,
    DatasetParseResult, Dictionary, DictionaryValidationResult, ForeignKeyGroup,
    ForeignKeyMapping, InvalidRecord, RangeRule, RawValue, RecordError, RecordParseResult,
    ResolvedRestriction, RestrictionNode, RestrictionSet, RestrictionViolation, ScalarValue,
    Schema, SchemaField, SchemaParseResult, SchemaRestrictions, SchemaValidationResult,
    UnprocessedDataRecord, ValueKey, ValueType,
};

// Coercion exports
pub use coerce::{coerce_field_value, CoercedValue, DEFAULT_DELIMITER};

// Validation exports
pub use validation::{
    resolve_restrictions, validate_dataset, validate_field, validate_record,
    validate_schema_data, Dataset, ValidationContext,
};

// Parse and process exports
pub use parse::{parse_dataset, parse_record, parse_schema_data, RawDataset};
pub use process::{process_dataset, process_record, process_schema_data, ProcessedDataset};

// Registry exports
pub use registry::{ValidatorOutcome, ValidatorRegistry, ValueValidator};
