//! The validation engine.
//!
//! Control flow is strictly bottom-up and synchronous:
//! dictionary -> schema -> record -> field -> restriction. Definitions are
//! read-only inputs; all working state (accumulated errors, built indices) is
//! local to one call, so repeated calls over the same input are idempotent.

use regex::Regex;

use crate::registry::ValidatorRegistry;

mod dictionary;
mod field;
mod record;
mod resolver;
mod schema;

pub use dictionary::{validate_dataset, Dataset};
pub use field::validate_field;
pub use record::validate_record;
pub use resolver::resolve_restrictions;
pub use schema::validate_schema_data;

/// Per-call validation context. Carries the optional named-validator
/// registry; there is no process-wide state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    pub registry: Option<&'a ValidatorRegistry>,
}

impl<'a> ValidationContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: &'a ValidatorRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }
}

/// Compile a restriction pattern as a full-value match.
///
/// Restriction regexes must match the entire value, so the pattern is
/// wrapped in non-capturing anchors before compilation.
pub fn compile_full_match(pattern: &str) -> crate::Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
        crate::DictionaryError::InvalidRegex {
            pattern: pattern.to_string(),
            source: Box::new(source),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_anchoring() {
        let re = compile_full_match("q.*").unwrap();
        assert!(re.is_match("que"));
        assert!(!re.is_match("not_q"));
        // Alternations must not escape the anchors
        let re = compile_full_match("a|b").unwrap();
        assert!(!re.is_match("xa"));
        assert!(re.is_match("b"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(compile_full_match("([unclosed").is_err());
    }
}
