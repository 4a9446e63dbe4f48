//! Core type definitions: dictionaries, schemas, restrictions, typed values,
//! and validation/parse result types.

pub mod dictionary;
pub mod report;
pub mod restriction;
pub mod schema;
pub mod value;

pub use dictionary::Dictionary;
pub use report::{
    DatasetParseResult, DictionaryValidationResult, InvalidRecord, RecordError, RecordParseResult,
    RestrictionViolation, SchemaParseResult, SchemaValidationResult,
};
pub use restriction::{
    Condition, ConditionClause, ConditionMatch, ConditionalRestriction, RangeRule,
    ResolvedRestriction, RestrictionNode, RestrictionSet, ScalarValue,
};
pub use schema::{
    ForeignKeyGroup, ForeignKeyMapping, Schema, SchemaField, SchemaRestrictions, ValueType,
};
pub use value::{DataRecord, DataValue, RawValue, UnprocessedDataRecord, ValueKey};
