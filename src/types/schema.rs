use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::restriction::RestrictionNode;
use crate::validation::compile_full_match;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Integer,
    Boolean,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Integer => write!(f, "integer"),
            ValueType::Boolean => write!(f, "boolean"),
        }
    }
}

/// One named, typed column definition within a [`Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value_type: ValueType,
    #[serde(default)]
    pub is_array: bool,
    /// Separator used when splitting raw array input. Defaults to `,`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<RestrictionNode>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            description: None,
            value_type,
            is_array: false,
            delimiter: None,
            restrictions: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_restrictions(mut self, restrictions: impl Into<RestrictionNode>) -> Self {
        self.restrictions = Some(restrictions.into());
        self
    }

    /// Whether a `unique` rule occurs anywhere in this field's restrictions.
    pub fn has_unique_restriction(&self) -> bool {
        self.restrictions
            .as_ref()
            .is_some_and(RestrictionNode::contains_unique)
    }

    fn validate(&self) -> crate::Result<()> {
        if self.name.is_empty() {
            return Err(crate::DictionaryError::schema("Field name cannot be empty"));
        }
        let Some(restrictions) = &self.restrictions else {
            return Ok(());
        };

        let mut result = Ok(());
        restrictions.for_each_set(&mut |set| {
            if result.is_err() {
                return;
            }
            if let Some(pattern) = &set.regex {
                if let Err(e) = compile_full_match(pattern) {
                    result = Err(e);
                    return;
                }
            }
            if let Some(range) = &set.range {
                if let Err(e) = range.validate() {
                    result = Err(e);
                }
            }
        });
        result?;

        let mut result = Ok(());
        restrictions.for_each_condition(&mut |condition| {
            if result.is_err() {
                return;
            }
            if condition.fields.is_empty() {
                result = Err(crate::DictionaryError::schema(format!(
                    "Condition on field '{}' names no fields",
                    self.name
                )));
                return;
            }
            if let super::restriction::ConditionMatch::Regex { regex } = &condition.match_rule {
                if let Err(e) = compile_full_match(regex) {
                    result = Err(e);
                }
            }
        });
        result
    }
}

/// One local/foreign column pairing inside a [`ForeignKeyGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyMapping {
    pub local: String,
    pub foreign: String,
}

/// One composite foreign-key constraint against another schema's data.
/// A schema may declare multiple independent groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyGroup {
    pub schema: String,
    pub mappings: Vec<ForeignKeyMapping>,
}

impl ForeignKeyGroup {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            mappings: Vec::new(),
        }
    }

    pub fn with_mapping(mut self, local: impl Into<String>, foreign: impl Into<String>) -> Self {
        self.mappings.push(ForeignKeyMapping {
            local: local.into(),
            foreign: foreign.into(),
        });
        self
    }

    pub fn local_fields(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.local.as_str()).collect()
    }
}

/// Schema-wide restrictions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRestrictions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<Vec<ForeignKeyGroup>>,
}

impl SchemaRestrictions {
    pub fn is_empty(&self) -> bool {
        self.unique_key.is_none() && self.foreign_key.is_none()
    }
}

/// A named record type: an ordered list of fields plus optional schema-wide
/// restrictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<SchemaRestrictions>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            restrictions: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_unique_key<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.restrictions
            .get_or_insert_with(SchemaRestrictions::default)
            .unique_key = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_foreign_key(mut self, group: ForeignKeyGroup) -> Self {
        self.restrictions
            .get_or_insert_with(SchemaRestrictions::default)
            .foreign_key
            .get_or_insert_with(Vec::new)
            .push(group);
        self
    }

    /// Look up a field definition by name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Foreign-key groups declared on this schema, empty if none.
    pub fn foreign_key_groups(&self) -> &[ForeignKeyGroup] {
        self.restrictions
            .as_ref()
            .and_then(|r| r.foreign_key.as_deref())
            .unwrap_or(&[])
    }

    /// Structural invariants local to this schema. Checked at
    /// schema-authoring time, not at data-validation time. Cross-schema
    /// foreign-key targets are checked by `Dictionary::validate_structure`.
    pub fn validate_structure(&self) -> crate::Result<()> {
        if self.name.is_empty() {
            return Err(crate::DictionaryError::schema("Schema name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(crate::DictionaryError::schema(format!(
                    "Schema '{}' declares field '{}' more than once",
                    self.name, field.name
                )));
            }
            field.validate()?;
        }

        if let Some(restrictions) = &self.restrictions {
            if let Some(unique_key) = &restrictions.unique_key {
                if unique_key.is_empty() {
                    return Err(crate::DictionaryError::schema(format!(
                        "Schema '{}' declares an empty uniqueKey",
                        self.name
                    )));
                }
                for name in unique_key {
                    if !self.has_field(name) {
                        return Err(crate::DictionaryError::schema(format!(
                            "uniqueKey of schema '{}' names unknown field '{}'",
                            self.name, name
                        )));
                    }
                }
            }
            if let Some(groups) = &restrictions.foreign_key {
                for group in groups {
                    if group.mappings.is_empty() {
                        return Err(crate::DictionaryError::schema(format!(
                            "foreignKey of schema '{}' against '{}' has no mappings",
                            self.name, group.schema
                        )));
                    }
                    for mapping in &group.mappings {
                        if !self.has_field(&mapping.local) {
                            return Err(crate::DictionaryError::schema(format!(
                                "foreignKey of schema '{}' names unknown local field '{}'",
                                self.name, mapping.local
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema({}, {} fields)", self.name, self.fields.len())
    }
}
