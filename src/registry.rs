//! Host-registered named validators.
//!
//! A schema may reference a validator by symbolic name through the
//! `validator` restriction. The embedding application registers the
//! implementations at schema-load time; the engine only resolves names
//! through this registry and never executes schema-supplied code.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::value::{DataRecord, DataValue};

/// Outcome of one named-validator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorOutcome {
    pub valid: bool,
    pub message: Option<String>,
}

impl ValidatorOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Capability interface for a host-supplied validator.
///
/// Receives the field value under validation (absent fields pass `None`) and
/// the surrounding record for cross-field checks. Implementations must be
/// pure with respect to the record: the engine shares it immutably.
pub trait ValueValidator: Send + Sync {
    fn validate(&self, value: Option<&DataValue>, record: &DataRecord) -> ValidatorOutcome;
}

impl<F> ValueValidator for F
where
    F: Fn(Option<&DataValue>, &DataRecord) -> ValidatorOutcome + Send + Sync,
{
    fn validate(&self, value: Option<&DataValue>, record: &DataRecord) -> ValidatorOutcome {
        self(value, record)
    }
}

/// Named validators available to one validation call.
#[derive(Default, Clone)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn ValueValidator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        validator: Arc<dyn ValueValidator>,
    ) -> &mut Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn with_validator(
        mut self,
        name: impl Into<String>,
        validator: Arc<dyn ValueValidator>,
    ) -> Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ValueValidator>> {
        self.validators.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_validator() {
        let mut registry = ValidatorRegistry::new();
        registry.register(
            "non-empty",
            Arc::new(|value: Option<&DataValue>, _record: &DataRecord| match value {
                Some(v) if !v.is_empty() => ValidatorOutcome::valid(),
                _ => ValidatorOutcome::invalid("value must not be empty"),
            }),
        );

        let record = DataRecord::new();
        let validator = registry.get("non-empty").unwrap();
        assert!(
            validator
                .validate(Some(&DataValue::String("x".into())), &record)
                .valid
        );
        assert!(!validator.validate(None, &record).valid);
        assert!(registry.get("missing").is_none());
    }
}
