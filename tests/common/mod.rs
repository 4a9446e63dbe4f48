use datadict::*;

#[allow(dead_code)]
pub fn raw_record(entries: &[(&str, &str)]) -> UnprocessedDataRecord {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), RawValue::Single(v.to_string())))
        .collect()
}

#[allow(dead_code)]
pub fn typed_record(entries: &[(&str, DataValue)]) -> DataRecord {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Schema with a code-listed fruit field and a regex-restricted array field.
#[allow(dead_code)]
pub fn fruit_schema() -> Schema {
    Schema::new("fruit_basket")
        .with_field(
            SchemaField::new("fruit", ValueType::String).with_restrictions(
                RestrictionSet::new().with_code_list(["Apple", "Banana", "Carrot", "Donut"]),
            ),
        )
        .with_field(
            SchemaField::new("labels", ValueType::String)
                .array()
                .with_restrictions(RestrictionSet::new().with_regex("^q.*$")),
        )
}

/// Schema with a three-field composite unique key.
#[allow(dead_code)]
pub fn unique_key_schema() -> Schema {
    Schema::new("registrations")
        .with_field(SchemaField::new("numeric_id_1", ValueType::Integer))
        .with_field(SchemaField::new("string_id_2", ValueType::String))
        .with_field(SchemaField::new("array_string_id_3", ValueType::String).array())
        .with_unique_key(["numeric_id_1", "string_id_2", "array_string_id_3"])
}

/// Parent/child dictionary with a single-field foreign key.
#[allow(dead_code)]
pub fn foreign_key_dictionary() -> Dictionary {
    Dictionary::new("relations", "1.0")
        .with_schema(
            Schema::new("parent_schema_1")
                .with_field(SchemaField::new("id", ValueType::String)),
        )
        .with_schema(
            Schema::new("child_schema_1")
                .with_field(SchemaField::new("string-with-foreign-key", ValueType::String))
                .with_foreign_key(
                    ForeignKeyGroup::new("parent_schema_1")
                        .with_mapping("string-with-foreign-key", "id"),
                ),
        )
}

/// Schema with a two-level nested conditional:
/// - when `gate_text` contains "repeated text" and `score` is >= 0, the
///   conditional field must be alphabetic only;
/// - when `gate_text` does not match, the conditional field must be empty.
#[allow(dead_code)]
pub fn nested_conditional_schema() -> Schema {
    let inner = ConditionalRestriction::new(ConditionClause::new(vec![Condition::new(
        ["score"],
        ConditionMatch::Range {
            range: RangeRule::new().with_min(0.0),
        },
    )]))
    .with_then(RestrictionSet::new().with_regex("^[A-Za-z]*$"));

    let tree = ConditionalRestriction::new(ConditionClause::new(vec![Condition::new(
        ["gate_text"],
        ConditionMatch::Regex {
            regex: ".*repeated text.*".into(),
        },
    )]))
    .with_then(inner)
    .with_else(RestrictionSet::new().with_regex("^$"));

    Schema::new("conditional_sample")
        .with_field(SchemaField::new("gate_text", ValueType::String))
        .with_field(SchemaField::new("score", ValueType::Integer))
        .with_field(
            SchemaField::new("fieldStringNestedConditional", ValueType::String)
                .with_restrictions(tree),
        )
}
