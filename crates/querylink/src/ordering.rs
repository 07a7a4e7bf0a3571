//! Ordering types and value comparison.
//!
//! Provides [`Dir`] for sort direction, [`compare_values`] for the partial
//! comparison filters use, and [`sort_key_cmp`] for the total order sorting
//! uses.

use std::cmp::Ordering;

use crate::value::FieldValue;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compares two scalar values.
///
/// Integers and floats compare numerically with each other. Returns `None`
/// if the kinds don't match, either side is `Null` or a list, or a float is
/// NaN. Text compares by code point.
pub fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Option<Ordering> {
    match (a, b) {
        (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
        (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
        (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
        (FieldValue::Float(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
        (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
        (FieldValue::Duration(a), FieldValue::Duration(b)) => Some(a.cmp(b)),
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),

        // Type mismatch, null or collection - cannot compare
        _ => None,
    }
}

/// Total order over sort keys.
///
/// `Null` sorts before every value, booleans order `false < true`, and floats
/// use the IEEE 754 total order. Keys that cannot be compared are equal, so a
/// stable sort keeps their source order.
pub fn sort_key_cmp(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Less,
        (_, FieldValue::Null) => Ordering::Greater,

        (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
        (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
        (FieldValue::Float(a), FieldValue::Integer(b)) => a.total_cmp(&(*b as f64)),

        _ => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}
