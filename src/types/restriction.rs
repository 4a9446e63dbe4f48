//! Field restriction definitions.
//!
//! The wire grammar a schema author writes is duck-typed: a field's
//! `restrictions` value is either a bare restriction object, an array of
//! restriction nodes, or an if/then/else conditional whose branches recurse
//! into the same three shapes. [`RestrictionNode`] models that grammar as an
//! explicit tagged union with a single recursive resolver
//! (`validation::resolve_restrictions`) instead of runtime shape-sniffing.

use serde::{Deserialize, Serialize};

/// A scalar literal usable in `codeList` entries and condition value matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

/// Numeric bounds. Any subset may be present; all present bounds must hold.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RangeRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_max: Option<f64>,
}

impl RangeRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_exclusive_min(mut self, min: f64) -> Self {
        self.exclusive_min = Some(min);
        self
    }

    pub fn with_exclusive_max(mut self, max: f64) -> Self {
        self.exclusive_max = Some(max);
        self
    }

    /// Whether a numeric value satisfies every present bound.
    pub fn contains(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        if let Some(min) = self.exclusive_min {
            if value <= min {
                return false;
            }
        }
        if let Some(max) = self.exclusive_max {
            if value >= max {
                return false;
            }
        }
        true
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.exclusive_min.is_none()
            && self.exclusive_max.is_none()
    }

    /// Lowest declared lower bound and highest declared upper bound are
    /// required to leave the interval non-empty.
    pub fn validate(&self) -> crate::Result<()> {
        let lower = match (self.min, self.exclusive_min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let upper = match (self.max, self.exclusive_max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower > upper {
                return Err(crate::DictionaryError::restriction(format!(
                    "Range lower bound {lower} exceeds upper bound {upper}"
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for RangeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (lo, lo_excl) = match (self.exclusive_min, self.min) {
            (Some(m), _) => (Some(m), true),
            (None, m) => (m, false),
        };
        let (hi, hi_excl) = match (self.exclusive_max, self.max) {
            (Some(m), _) => (Some(m), true),
            (None, m) => (m, false),
        };
        match lo {
            Some(m) => write!(f, "{}{m}", if lo_excl { "(" } else { "[" })?,
            None => write!(f, "(-inf")?,
        }
        write!(f, ", ")?;
        match hi {
            Some(m) => write!(f, "{m}{}", if hi_excl { ")" } else { "]" }),
            None => write!(f, "+inf)"),
        }
    }
}

/// A bare restriction object: the leaf shape of the restriction grammar.
///
/// Every present member contributes one concrete rule during resolution.
/// `validator` references a host-registered named validator by symbolic name
/// (see `registry`); the engine never executes schema-supplied code.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RestrictionSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_list: Option<Vec<ScalarValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
}

impl RestrictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_code_list<I, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        self.code_list = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn with_range(mut self, range: RangeRule) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    pub fn with_validator(mut self, name: impl Into<String>) -> Self {
        self.validator = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_none()
            && self.code_list.is_none()
            && self.regex.is_none()
            && self.range.is_none()
            && self.unique.is_none()
            && self.validator.is_none()
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::String(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::String(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Integer(i)
    }
}

impl From<f64> for ScalarValue {
    fn from(n: f64) -> Self {
        ScalarValue::Number(n)
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Integer(i) => write!(f, "{i}"),
            ScalarValue::Number(n) => write!(f, "{n}"),
            ScalarValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// The predicate side of one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionMatch {
    /// Field presence. `exists: false` inverts the test.
    Exists { exists: bool },
    /// Full-match regular expression over string values.
    Regex { regex: String },
    /// Numeric bounds over number/integer values.
    Range { range: RangeRule },
    /// Equality against a literal, case/whitespace-insensitive for strings.
    Value { value: ScalarValue },
}

/// One condition: every named field's current record value must satisfy the
/// match predicate; array-valued fields satisfy it if any element does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub fields: Vec<String>,
    #[serde(rename = "match")]
    pub match_rule: ConditionMatch,
}

impl Condition {
    pub fn new<I, S>(fields: I, match_rule: ConditionMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            match_rule,
        }
    }
}

/// The `if` clause of a conditional: AND across its conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionClause {
    pub conditions: Vec<Condition>,
}

impl ConditionClause {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }
}

/// An if/then/else restriction. Branches recurse into [`RestrictionNode`];
/// an absent branch contributes nothing when selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalRestriction {
    #[serde(rename = "if")]
    pub condition: ConditionClause,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub then: Option<RestrictionNode>,
    #[serde(rename = "else", skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<RestrictionNode>,
}

impl ConditionalRestriction {
    pub fn new(condition: ConditionClause) -> Self {
        Self {
            condition,
            then: None,
            otherwise: None,
        }
    }

    pub fn with_then(mut self, node: impl Into<RestrictionNode>) -> Self {
        self.then = Some(node.into());
        self
    }

    pub fn with_else(mut self, node: impl Into<RestrictionNode>) -> Self {
        self.otherwise = Some(node.into());
        self
    }
}

/// A field's restriction definition: one bare set, a conditional, or an
/// ordered list of either. Nesting depth is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RestrictionNode {
    Conditional(Box<ConditionalRestriction>),
    List(Vec<RestrictionNode>),
    Simple(RestrictionSet),
}

impl RestrictionNode {
    /// Visit every restriction set in the tree, both branches of every
    /// conditional included.
    pub fn for_each_set<'a, F: FnMut(&'a RestrictionSet)>(&'a self, f: &mut F) {
        match self {
            RestrictionNode::Simple(set) => f(set),
            RestrictionNode::List(nodes) => {
                for node in nodes {
                    node.for_each_set(f);
                }
            }
            RestrictionNode::Conditional(cond) => {
                if let Some(then) = &cond.then {
                    then.for_each_set(f);
                }
                if let Some(otherwise) = &cond.otherwise {
                    otherwise.for_each_set(f);
                }
            }
        }
    }

    /// Visit every condition in the tree.
    pub fn for_each_condition<F: FnMut(&Condition)>(&self, f: &mut F) {
        match self {
            RestrictionNode::Simple(_) => {}
            RestrictionNode::List(nodes) => {
                for node in nodes {
                    node.for_each_condition(f);
                }
            }
            RestrictionNode::Conditional(cond) => {
                for condition in &cond.condition.conditions {
                    f(condition);
                }
                if let Some(then) = &cond.then {
                    then.for_each_condition(f);
                }
                if let Some(otherwise) = &cond.otherwise {
                    otherwise.for_each_condition(f);
                }
            }
        }
    }

    /// All `codeList` entries found anywhere in the tree. Used by the
    /// coercion pass to canonicalize string casing before any record context
    /// exists to resolve conditionals.
    pub fn code_lists(&self) -> Vec<&[ScalarValue]> {
        let mut lists = Vec::new();
        self.for_each_set(&mut |set| {
            if let Some(list) = &set.code_list {
                lists.push(list.as_slice());
            }
        });
        lists
    }

    /// Whether a `unique` rule occurs anywhere in the tree. Dataset-wide
    /// uniqueness cannot be gated per-record, so conditional placement does
    /// not matter.
    pub fn contains_unique(&self) -> bool {
        let mut found = false;
        self.for_each_set(&mut |set| {
            if set.unique == Some(true) {
                found = true;
            }
        });
        found
    }
}

impl From<RestrictionSet> for RestrictionNode {
    fn from(set: RestrictionSet) -> Self {
        RestrictionNode::Simple(set)
    }
}

impl From<ConditionalRestriction> for RestrictionNode {
    fn from(cond: ConditionalRestriction) -> Self {
        RestrictionNode::Conditional(Box::new(cond))
    }
}

impl From<Vec<RestrictionNode>> for RestrictionNode {
    fn from(nodes: Vec<RestrictionNode>) -> Self {
        RestrictionNode::List(nodes)
    }
}

/// One concrete, currently-applicable rule produced by restriction
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "rule", rename_all = "camelCase")]
pub enum ResolvedRestriction {
    Required,
    CodeList(Vec<ScalarValue>),
    Regex(String),
    Range(RangeRule),
    Unique,
    Validator(String),
}

impl std::fmt::Display for ResolvedRestriction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolvedRestriction::Required => write!(f, "required"),
            ResolvedRestriction::CodeList(_) => write!(f, "codeList"),
            ResolvedRestriction::Regex(pattern) => write!(f, "regex({pattern})"),
            ResolvedRestriction::Range(range) => write!(f, "range{range}"),
            ResolvedRestriction::Unique => write!(f, "unique"),
            ResolvedRestriction::Validator(name) => write!(f, "validator({name})"),
        }
    }
}
