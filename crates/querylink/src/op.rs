//! Filter operators and their query-string tokens.
//!
//! The [`FilterOperator`] enum is the single source of truth for the operator
//! token table used by both the codec and the compiler.

use std::cmp::Ordering;

/// Comparison operator of a filter definition.
///
/// Every operator has a short symbolic token used in the query-string form:
///
/// | Operator | Token | Meaning |
/// |----------|-------|---------|
/// | `Eq` | `=` | field equals value |
/// | `Neq` | `!=` | field differs from value |
/// | `Gt` | `>` | field greater than value |
/// | `Gte` | `>=` | field greater than or equal to value |
/// | `Lt` | `<` | field less than value |
/// | `Lte` | `<=` | field less than or equal to value |
/// | `Has` | `=*` | field (text or collection) contains value |
/// | `Nhas` | `!*` | negation of `Has` |
/// | `In` | `[]` | value (an array) contains field |
/// | `Nin` | `![]` | negation of `In` |
/// | `Sw` | `^` | field starts with value |
/// | `Nsw` | `!^` | negation of `Sw` |
/// | `Ew` | `$` | field ends with value |
/// | `New` | `!$` | negation of `Ew` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Text or collection contains the value.
    Has,
    /// Text or collection does not contain the value.
    Nhas,
    /// Array value contains the field.
    In,
    /// Array value does not contain the field.
    Nin,
    /// Text starts with the value.
    Sw,
    /// Text does not start with the value.
    Nsw,
    /// Text ends with the value.
    Ew,
    /// Text does not end with the value.
    New,
}

impl FilterOperator {
    /// All operators in declaration order.
    pub const ALL: [FilterOperator; 14] = [
        FilterOperator::Eq,
        FilterOperator::Neq,
        FilterOperator::Gt,
        FilterOperator::Gte,
        FilterOperator::Lt,
        FilterOperator::Lte,
        FilterOperator::Has,
        FilterOperator::Nhas,
        FilterOperator::In,
        FilterOperator::Nin,
        FilterOperator::Sw,
        FilterOperator::Nsw,
        FilterOperator::Ew,
        FilterOperator::New,
    ];

    /// Returns the query-string token of this operator.
    pub fn token(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Has => "=*",
            FilterOperator::Nhas => "!*",
            FilterOperator::In => "[]",
            FilterOperator::Nin => "![]",
            FilterOperator::Sw => "^",
            FilterOperator::Nsw => "!^",
            FilterOperator::Ew => "$",
            FilterOperator::New => "!$",
        }
    }

    /// Looks up the operator for an exact token.
    pub fn from_token(token: &str) -> Option<FilterOperator> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.token() == token)
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Has => "has",
            FilterOperator::Nhas => "nhas",
            FilterOperator::In => "in",
            FilterOperator::Nin => "nin",
            FilterOperator::Sw => "sw",
            FilterOperator::Nsw => "nsw",
            FilterOperator::Ew => "ew",
            FilterOperator::New => "new",
        }
    }

    /// Returns `true` for operators that negate another operator.
    ///
    /// `Neq` counts as the negation of `Eq`.
    pub fn is_negated(self) -> bool {
        self.base() != self
    }

    /// Returns the positive operator this one negates, or itself.
    pub fn base(self) -> FilterOperator {
        match self {
            FilterOperator::Neq => FilterOperator::Eq,
            FilterOperator::Nhas => FilterOperator::Has,
            FilterOperator::Nin => FilterOperator::In,
            FilterOperator::Nsw => FilterOperator::Sw,
            FilterOperator::New => FilterOperator::Ew,
            other => other,
        }
    }

    /// Returns `true` for the ordering comparisons `Gt`, `Gte`, `Lt`, `Lte`.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte
        )
    }

    /// Returns `true` for operators that only make sense on text fields.
    pub fn is_text_op(self) -> bool {
        matches!(self.base(), FilterOperator::Sw | FilterOperator::Ew)
    }

    /// Returns `true` for operators whose value may be rendered as a set.
    pub fn is_set_op(self) -> bool {
        matches!(self.base(), FilterOperator::Has | FilterOperator::In)
    }

    /// Evaluates a comparison given the ordering of field against value.
    ///
    /// Only meaningful for `Eq`, `Neq` and the ordering comparisons.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            FilterOperator::Eq => ordering == Ordering::Equal,
            FilterOperator::Neq => ordering != Ordering::Equal,
            FilterOperator::Gt => ordering == Ordering::Greater,
            FilterOperator::Gte => ordering != Ordering::Less,
            FilterOperator::Lt => ordering == Ordering::Less,
            FilterOperator::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_distinct() {
        let tokens: HashSet<&str> = FilterOperator::ALL.iter().map(|op| op.token()).collect();
        assert_eq!(tokens.len(), FilterOperator::ALL.len());
    }

    #[test]
    fn token_lookup_round_trips() {
        for op in FilterOperator::ALL {
            assert_eq!(FilterOperator::from_token(op.token()), Some(op));
        }
        assert_eq!(FilterOperator::from_token("=="), None);
        assert_eq!(FilterOperator::from_token(""), None);
    }

    #[test]
    fn negation_pairs() {
        assert_eq!(FilterOperator::Nin.base(), FilterOperator::In);
        assert_eq!(FilterOperator::New.base(), FilterOperator::Ew);
        assert!(FilterOperator::Neq.is_negated());
        assert!(!FilterOperator::Gt.is_negated());
        assert!(!FilterOperator::Has.is_negated());
    }

    #[test]
    fn op_classification() {
        assert!(FilterOperator::Gte.is_ordering_op());
        assert!(!FilterOperator::Eq.is_ordering_op());
        assert!(FilterOperator::Nsw.is_text_op());
        assert!(!FilterOperator::Has.is_text_op());
        assert!(FilterOperator::Nin.is_set_op());
        assert!(FilterOperator::Has.is_set_op());
        assert!(!FilterOperator::Lt.is_set_op());
    }

    #[test]
    fn op_eval_ordering() {
        assert!(FilterOperator::Eq.eval_ordering(Ordering::Equal));
        assert!(!FilterOperator::Eq.eval_ordering(Ordering::Less));

        assert!(FilterOperator::Neq.eval_ordering(Ordering::Greater));
        assert!(!FilterOperator::Neq.eval_ordering(Ordering::Equal));

        assert!(FilterOperator::Gt.eval_ordering(Ordering::Greater));
        assert!(!FilterOperator::Gt.eval_ordering(Ordering::Equal));

        assert!(FilterOperator::Gte.eval_ordering(Ordering::Equal));
        assert!(!FilterOperator::Gte.eval_ordering(Ordering::Less));

        assert!(FilterOperator::Lt.eval_ordering(Ordering::Less));
        assert!(!FilterOperator::Lt.eval_ordering(Ordering::Equal));

        assert!(FilterOperator::Lte.eval_ordering(Ordering::Equal));
        assert!(!FilterOperator::Lte.eval_ordering(Ordering::Greater));

        // Not an ordering operator
        assert!(!FilterOperator::Has.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn op_display_is_token() {
        assert_eq!(FilterOperator::Gte.to_string(), ">=");
        assert_eq!(FilterOperator::Nin.to_string(), "![]");
        assert_eq!(FilterOperator::Sw.as_str(), "sw");
    }
}
