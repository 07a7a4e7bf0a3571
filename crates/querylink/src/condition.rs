//! Per-operator conditions.
//!
//! A [`Condition`] is one filter checked against the kind of the value it
//! will be applied to. All type checking happens when the condition is
//! built, so evaluation never fails: a value that cannot be compared simply
//! does not match.

use std::cmp::Ordering;

use crate::error::{QueryLinkError, Result};
use crate::op::FilterOperator;
use crate::ordering::compare_values;
use crate::parse::parse_str;
use crate::value::{FieldValue, Value, ValueKind};

#[derive(Debug, Clone)]
enum Test {
    /// `Eq` and the ordering comparisons against a coerced literal.
    Compare(FilterOperator, Value),
    /// Substring containment.
    TextContains(String),
    /// Element containment; `None` when the literal can never equal an element.
    ListContains(Option<Value>),
    StartsWith(String),
    EndsWith(String),
    /// Set membership.
    In(Vec<Value>),
}

/// A type-checked filter predicate over a single value.
#[derive(Debug, Clone)]
pub struct Condition {
    test: Test,
    negated: bool,
}

impl Condition {
    /// Builds the condition for `field <op> literal`, where the field is
    /// read as values of `kind`.
    ///
    /// Fails with [`QueryLinkError::UnsupportedOperator`] if the operator
    /// cannot apply to the kind or the literal.
    pub fn new(field: &str, kind: &ValueKind, op: FilterOperator, literal: &Value) -> Result<Self> {
        let unsupported = |reason: String| QueryLinkError::UnsupportedOperator {
            field: field.to_string(),
            operator: op.as_str(),
            kind: kind.to_string(),
            reason,
        };

        let base = op.base();
        let test = match base {
            FilterOperator::Eq
            | FilterOperator::Gt
            | FilterOperator::Gte
            | FilterOperator::Lt
            | FilterOperator::Lte => {
                if base.is_ordering_op() && !kind.is_orderable() {
                    return Err(unsupported("kind has no ordering".to_string()));
                }
                if !kind.is_scalar() {
                    return Err(unsupported("collections cannot be compared".to_string()));
                }
                let coerced = coerce(literal, kind).ok_or_else(|| {
                    unsupported(format!("value of kind {} is not comparable", literal.kind()))
                })?;
                Test::Compare(base, coerced)
            }

            FilterOperator::Has => {
                if literal.is_array() {
                    return Err(unsupported("an array value needs the in operator".to_string()));
                }
                match kind {
                    ValueKind::Text => Test::TextContains(literal.to_string()),
                    ValueKind::List(element) => Test::ListContains(coerce(literal, element)),
                    _ => {
                        return Err(unsupported(
                            "field is neither text nor a collection".to_string(),
                        ))
                    }
                }
            }

            FilterOperator::In => {
                let items = literal
                    .as_array()
                    .ok_or_else(|| unsupported("value must be an array".to_string()))?;
                if !kind.is_scalar() {
                    return Err(unsupported("collections cannot be set members".to_string()));
                }
                // Elements that can never equal the field are dropped.
                Test::In(items.iter().filter_map(|item| coerce(item, kind)).collect())
            }

            FilterOperator::Sw | FilterOperator::Ew => {
                if *kind != ValueKind::Text {
                    return Err(unsupported("field is not text".to_string()));
                }
                if literal.is_array() {
                    return Err(unsupported("value must be scalar".to_string()));
                }
                let text = literal.to_string();
                if base == FilterOperator::Sw {
                    Test::StartsWith(text)
                } else {
                    Test::EndsWith(text)
                }
            }

            _ => return Err(unsupported("unsupported operator".to_string())),
        };

        Ok(Condition {
            test,
            negated: op.is_negated(),
        })
    }

    /// Returns `true` if the value satisfies the condition.
    ///
    /// `Null` fails every positive condition, so it passes the negated ones.
    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        if value.is_null() {
            return self.negated;
        }
        self.test.eval(value) != self.negated
    }
}

impl Test {
    fn eval(&self, value: &FieldValue<'_>) -> bool {
        match self {
            Test::Compare(op, literal) => compare_values(value, &literal.as_field())
                .map_or(false, |ordering| op.eval_ordering(ordering)),
            Test::TextContains(needle) => value
                .as_str()
                .map_or(false, |s| s.contains(needle.as_str())),
            Test::ListContains(None) => false,
            Test::ListContains(Some(literal)) => value
                .as_list()
                .map_or(false, |items| {
                    items.iter().any(|item| equals(item, literal))
                }),
            Test::StartsWith(prefix) => value
                .as_str()
                .map_or(false, |s| s.starts_with(prefix.as_str())),
            Test::EndsWith(suffix) => value
                .as_str()
                .map_or(false, |s| s.ends_with(suffix.as_str())),
            Test::In(items) => items.iter().any(|item| equals(value, item)),
        }
    }
}

fn equals(value: &FieldValue<'_>, literal: &Value) -> bool {
    compare_values(value, &literal.as_field()) == Some(Ordering::Equal)
}

/// Converts a scalar literal so it compares against values of `kind`.
///
/// Text fields compare against the literal's natural text form, integers
/// widen to floats, and text literals are re-parsed for typed fields.
/// Returns `None` when no conversion applies.
fn coerce(literal: &Value, kind: &ValueKind) -> Option<Value> {
    if literal.is_array() {
        return None;
    }
    match (kind, literal) {
        (ValueKind::Text, Value::Text(_)) => Some(literal.clone()),
        (ValueKind::Text, _) => Some(Value::Text(literal.to_string())),
        (ValueKind::Float, Value::Integer(n)) => Some(Value::Float(*n as f64)),
        (ValueKind::Integer, Value::Float(_)) => Some(literal.clone()),
        (_, Value::Text(text)) => {
            let parsed = parse_str(text);
            if parsed.is_array() || parsed.is_text() {
                None
            } else {
                coerce(&parsed, kind)
            }
        }
        _ if literal.kind() == *kind => Some(literal.clone()),
        _ => None,
    }
}
