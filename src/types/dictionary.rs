use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::schema::Schema;

/// A named, versioned collection of schemas plus a reference table.
///
/// Reference placeholders (`#/path` lookups) are substituted by the caller
/// before a dictionary reaches this engine; the `references` table is carried
/// opaquely for round-tripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub schemas: Vec<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Dictionary {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            schemas: Vec::new(),
            references: None,
            created_at: None,
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_references(mut self, references: serde_json::Value) -> Self {
        self.references = Some(references);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schema(name).is_some()
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.name.as_str())
    }

    /// Structural invariants across the whole dictionary: schema-local
    /// invariants, unique schema names, and foreign-key targets resolving to
    /// existing schemas and fields. Schema-authoring-time faults, distinct
    /// from data-validation errors.
    pub fn validate_structure(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for schema in &self.schemas {
            if !seen.insert(schema.name.as_str()) {
                return Err(crate::DictionaryError::schema(format!(
                    "Dictionary '{}' declares schema '{}' more than once",
                    self.name, schema.name
                )));
            }
            schema.validate_structure()?;
        }

        for schema in &self.schemas {
            for group in schema.foreign_key_groups() {
                let Some(foreign) = self.schema(&group.schema) else {
                    return Err(crate::DictionaryError::schema(format!(
                        "foreignKey of schema '{}' references unknown schema '{}'",
                        schema.name, group.schema
                    )));
                };
                for mapping in &group.mappings {
                    if !foreign.has_field(&mapping.foreign) {
                        return Err(crate::DictionaryError::schema(format!(
                            "foreignKey of schema '{}' names unknown field '{}' in schema '{}'",
                            schema.name, mapping.foreign, group.schema
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dictionary({} v{})", self.name, self.version)
    }
}
