//! Restriction resolution.
//!
//! Turns a field's possibly-nested restriction definition into the flat list
//! of rules that currently apply, given the surrounding record. Conditional
//! branches are selected by evaluating their conditions against sibling
//! field values; nesting depth is unbounded.

use crate::types::restriction::{
    Condition, ConditionClause, ConditionMatch, RangeRule, ResolvedRestriction, RestrictionNode,
    RestrictionSet, ScalarValue,
};
use crate::types::value::{DataRecord, DataValue};

use super::compile_full_match;

/// Resolve a restriction tree into concrete rules for one record.
///
/// Pure: the record is never mutated. All rules from one resolution pass are
/// applied independently by the field validator; resolution itself never
/// short-circuits siblings.
pub fn resolve_restrictions(
    node: &RestrictionNode,
    record: &DataRecord,
) -> crate::Result<Vec<ResolvedRestriction>> {
    let mut rules = Vec::new();
    resolve_into(node, record, &mut rules)?;
    Ok(rules)
}

fn resolve_into(
    node: &RestrictionNode,
    record: &DataRecord,
    rules: &mut Vec<ResolvedRestriction>,
) -> crate::Result<()> {
    match node {
        RestrictionNode::Simple(set) => {
            collect_rules(set, rules);
            Ok(())
        }
        RestrictionNode::List(nodes) => {
            for child in nodes {
                resolve_into(child, record, rules)?;
            }
            Ok(())
        }
        RestrictionNode::Conditional(conditional) => {
            let branch = if clause_holds(&conditional.condition, record)? {
                conditional.then.as_ref()
            } else {
                conditional.otherwise.as_ref()
            };
            match branch {
                Some(node) => resolve_into(node, record, rules),
                None => Ok(()),
            }
        }
    }
}

fn collect_rules(set: &RestrictionSet, rules: &mut Vec<ResolvedRestriction>) {
    if set.required == Some(true) {
        rules.push(ResolvedRestriction::Required);
    }
    if let Some(list) = &set.code_list {
        rules.push(ResolvedRestriction::CodeList(list.clone()));
    }
    if let Some(pattern) = &set.regex {
        if !pattern.is_empty() {
            rules.push(ResolvedRestriction::Regex(pattern.clone()));
        }
    }
    if let Some(range) = &set.range {
        rules.push(ResolvedRestriction::Range(range.clone()));
    }
    if set.unique == Some(true) {
        rules.push(ResolvedRestriction::Unique);
    }
    if let Some(name) = &set.validator {
        if !name.is_empty() {
            rules.push(ResolvedRestriction::Validator(name.clone()));
        }
    }
}

fn clause_holds(clause: &ConditionClause, record: &DataRecord) -> crate::Result<bool> {
    for condition in &clause.conditions {
        if !condition_holds(condition, record)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// AND across the condition's named fields: every one must satisfy the match.
fn condition_holds(condition: &Condition, record: &DataRecord) -> crate::Result<bool> {
    for field in &condition.fields {
        if !value_matches(record.get(field), &condition.match_rule)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether one field value satisfies a match predicate. Array values satisfy
/// it if any element does.
pub(crate) fn value_matches(
    value: Option<&DataValue>,
    match_rule: &ConditionMatch,
) -> crate::Result<bool> {
    match match_rule {
        ConditionMatch::Exists { exists } => Ok(is_present(value) == *exists),
        ConditionMatch::Regex { regex } => {
            let re = compile_full_match(regex)?;
            Ok(match value {
                Some(DataValue::String(s)) => re.is_match(s),
                Some(DataValue::StringArray(items)) => items.iter().any(|s| re.is_match(s)),
                _ => false,
            })
        }
        ConditionMatch::Range { range } => Ok(matches_range(value, range)),
        ConditionMatch::Value { value: expected } => Ok(matches_value(value, expected)),
    }
}

fn is_present(value: Option<&DataValue>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn matches_range(value: Option<&DataValue>, range: &RangeRule) -> bool {
    match value {
        Some(DataValue::Integer(i)) => range.contains(*i as f64),
        Some(DataValue::Number(n)) => range.contains(*n),
        Some(DataValue::IntegerArray(items)) => items.iter().any(|i| range.contains(*i as f64)),
        Some(DataValue::NumberArray(items)) => items.iter().any(|n| range.contains(*n)),
        _ => false,
    }
}

fn matches_value(value: Option<&DataValue>, expected: &ScalarValue) -> bool {
    fn eq_ci(a: &str, b: &str) -> bool {
        a.trim().eq_ignore_ascii_case(b.trim())
    }
    fn expected_number(expected: &ScalarValue) -> Option<f64> {
        match expected {
            ScalarValue::Integer(i) => Some(*i as f64),
            ScalarValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    match value {
        None => false,
        Some(DataValue::String(s)) => {
            matches!(expected, ScalarValue::String(e) if eq_ci(s, e))
        }
        Some(DataValue::StringArray(items)) => {
            matches!(expected, ScalarValue::String(e) if items.iter().any(|s| eq_ci(s, e)))
        }
        Some(DataValue::Boolean(b)) => matches!(expected, ScalarValue::Boolean(e) if e == b),
        Some(DataValue::BooleanArray(items)) => {
            matches!(expected, ScalarValue::Boolean(e) if items.contains(e))
        }
        Some(DataValue::Integer(i)) => expected_number(expected) == Some(*i as f64),
        Some(DataValue::Number(n)) => expected_number(expected) == Some(*n),
        Some(DataValue::IntegerArray(items)) => expected_number(expected)
            .is_some_and(|x| items.iter().any(|i| *i as f64 == x)),
        Some(DataValue::NumberArray(items)) => {
            expected_number(expected).is_some_and(|x| items.contains(&x))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::restriction::ConditionalRestriction;

    fn record(entries: &[(&str, DataValue)]) -> DataRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_simple_set_flattens() {
        let node: RestrictionNode = RestrictionSet::new()
            .with_required(true)
            .with_regex("^a+$")
            .into();
        let rules = resolve_restrictions(&node, &DataRecord::new()).unwrap();
        assert_eq!(
            rules,
            vec![
                ResolvedRestriction::Required,
                ResolvedRestriction::Regex("^a+$".into()),
            ]
        );
    }

    #[test]
    fn test_falsy_rules_are_skipped() {
        let node: RestrictionNode = RestrictionSet::new()
            .with_required(false)
            .with_unique(false)
            .with_regex("")
            .into();
        let rules = resolve_restrictions(&node, &DataRecord::new()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_conditional_selects_branch() {
        let node: RestrictionNode = ConditionalRestriction::new(ConditionClause::new(vec![
            Condition::new(["gate"], ConditionMatch::Value { value: "on".into() }),
        ]))
        .with_then(RestrictionSet::new().with_required(true))
        .with_else(RestrictionSet::new().with_regex("^x$"))
        .into();

        let on = record(&[("gate", DataValue::String("ON".into()))]);
        assert_eq!(
            resolve_restrictions(&node, &on).unwrap(),
            vec![ResolvedRestriction::Required]
        );

        let off = record(&[("gate", DataValue::String("off".into()))]);
        assert_eq!(
            resolve_restrictions(&node, &off).unwrap(),
            vec![ResolvedRestriction::Regex("^x$".into())]
        );
    }

    #[test]
    fn test_absent_branch_emits_nothing() {
        let node: RestrictionNode = ConditionalRestriction::new(ConditionClause::new(vec![
            Condition::new(["gate"], ConditionMatch::Exists { exists: true }),
        ]))
        .with_then(RestrictionSet::new().with_required(true))
        .into();
        let rules = resolve_restrictions(&node, &DataRecord::new()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_two_level_nesting() {
        // outer: gate exists; inner: count >= 10
        let inner = ConditionalRestriction::new(ConditionClause::new(vec![Condition::new(
            ["count"],
            ConditionMatch::Range {
                range: RangeRule::new().with_min(10.0),
            },
        )]))
        .with_then(RestrictionSet::new().with_regex("^[a-z]+$"))
        .with_else(RestrictionSet::new().with_required(true));

        let node: RestrictionNode = ConditionalRestriction::new(ConditionClause::new(vec![
            Condition::new(["gate"], ConditionMatch::Exists { exists: true }),
        ]))
        .with_then(inner)
        .into();

        let deep = record(&[
            ("gate", DataValue::String("present".into())),
            ("count", DataValue::Integer(12)),
        ]);
        assert_eq!(
            resolve_restrictions(&node, &deep).unwrap(),
            vec![ResolvedRestriction::Regex("^[a-z]+$".into())]
        );

        let shallow = record(&[
            ("gate", DataValue::String("present".into())),
            ("count", DataValue::Integer(3)),
        ]);
        assert_eq!(
            resolve_restrictions(&node, &shallow).unwrap(),
            vec![ResolvedRestriction::Required]
        );
    }

    #[test]
    fn test_multi_field_condition_is_and() {
        let node: RestrictionNode = ConditionalRestriction::new(ConditionClause::new(vec![
            Condition::new(["a", "b"], ConditionMatch::Exists { exists: true }),
        ]))
        .with_then(RestrictionSet::new().with_required(true))
        .into();

        let both = record(&[
            ("a", DataValue::String("x".into())),
            ("b", DataValue::String("y".into())),
        ]);
        assert_eq!(resolve_restrictions(&node, &both).unwrap().len(), 1);

        let one = record(&[("a", DataValue::String("x".into()))]);
        assert!(resolve_restrictions(&node, &one).unwrap().is_empty());
    }

    #[test]
    fn test_array_condition_matches_any_element() {
        let node: RestrictionNode = ConditionalRestriction::new(ConditionClause::new(vec![
            Condition::new(
                ["tags"],
                ConditionMatch::Regex {
                    regex: "important".into(),
                },
            ),
        ]))
        .with_then(RestrictionSet::new().with_required(true))
        .into();

        let hit = record(&[(
            "tags",
            DataValue::StringArray(vec!["misc".into(), "important".into()]),
        )]);
        assert_eq!(resolve_restrictions(&node, &hit).unwrap().len(), 1);

        let miss = record(&[("tags", DataValue::StringArray(vec!["misc".into()]))]);
        assert!(resolve_restrictions(&node, &miss).unwrap().is_empty());
    }
}
