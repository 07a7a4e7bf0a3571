//! Typed values for filter literals and record fields.
//!
//! [`Value`] is the owned, dynamically typed value carried by filter
//! definitions and produced by the value parser. [`FieldValue`] is the
//! borrowed view of a record field handed out by field accessors. Both share
//! the same set of kinds, described by [`ValueKind`].

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use uuid::Uuid;

/// Textual format of timestamps in their natural text form.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// The static type of a value or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit floating point.
    Float,
    /// Boolean.
    Boolean,
    /// UUID.
    Uuid,
    /// Signed time span.
    Duration,
    /// Date and time without timezone.
    Timestamp,
    /// Text.
    Text,
    /// Homogeneous literal array; `None` for the untyped empty array.
    Array(Option<Box<ValueKind>>),
    /// Collection field of the given element kind.
    List(Box<ValueKind>),
}

impl ValueKind {
    /// Returns `true` for single-valued kinds.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ValueKind::Array(_) | ValueKind::List(_))
    }

    /// Returns `true` for integer and float kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }

    /// Returns `true` if `Gt`/`Gte`/`Lt`/`Lte` are meaningful on this kind.
    pub fn is_orderable(&self) -> bool {
        self.is_scalar() && *self != ValueKind::Boolean
    }

    /// Returns `true` if values of this kind can serve as a sort key.
    pub fn is_sortable(&self) -> bool {
        self.is_scalar()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Integer => f.write_str("integer"),
            ValueKind::Float => f.write_str("float"),
            ValueKind::Boolean => f.write_str("boolean"),
            ValueKind::Uuid => f.write_str("uuid"),
            ValueKind::Duration => f.write_str("duration"),
            ValueKind::Timestamp => f.write_str("timestamp"),
            ValueKind::Text => f.write_str("text"),
            ValueKind::Array(None) => f.write_str("array"),
            ValueKind::Array(Some(inner)) => write!(f, "array of {}", inner),
            ValueKind::List(inner) => write!(f, "list of {}", inner),
        }
    }
}

/// Owned dynamically typed value.
///
/// Arrays produced by the value parser are homogeneous: every element has
/// the same kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Integer wide enough to hold every `i64` and `u64` exactly.
    Integer(i128),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Duration(#[cfg_attr(feature = "serde", serde(with = "duration_text"))] TimeDelta),
    Timestamp(NaiveDateTime),
    Text(String),
    Array(Vec<Value>),
}

impl Value {
    /// Returns the kind of this value.
    ///
    /// The element kind of an array is taken from its first element.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Duration(_) => ValueKind::Duration,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Text(_) => ValueKind::Text,
            Value::Array(items) => ValueKind::Array(items.first().map(|v| Box::new(v.kind()))),
        }
    }

    /// Returns `true` if this is an `Array` value.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` if this is a `Text` value.
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// Extracts the text, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the array elements, if this is an `Array` value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows this value as a [`FieldValue`].
    pub fn as_field(&self) -> FieldValue<'_> {
        match self {
            Value::Integer(n) => FieldValue::Integer(*n),
            Value::Float(n) => FieldValue::Float(*n),
            Value::Boolean(b) => FieldValue::Boolean(*b),
            Value::Uuid(u) => FieldValue::Uuid(*u),
            Value::Duration(d) => FieldValue::Duration(*d),
            Value::Timestamp(t) => FieldValue::Timestamp(*t),
            Value::Text(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.iter().map(Value::as_field).collect()),
        }
    }
}

impl fmt::Display for Value {
    /// Writes the natural text form, which the value parser reads back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            // Debug keeps a fractional part on integral floats ("2.0").
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Uuid(u) => write!(f, "{}", u.hyphenated()),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
            Value::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
            Value::Text(s) => f.write_str(s),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    match item {
                        // Nested arrays are delimited by their brackets.
                        Value::Array(_) => write!(f, "{}", item)?,
                        _ => f.write_str(&item.to_string().replace(',', "\\,"))?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Formats a duration as `[-][d.]hh:mm:ss[.fraction]`.
pub(crate) fn format_duration(duration: TimeDelta) -> String {
    let negative = duration < TimeDelta::zero();
    let secs = duration.num_seconds().unsigned_abs();
    let nanos = duration.subsec_nanos().unsigned_abs();

    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Serializes durations through their natural text form.
#[cfg(feature = "serde")]
mod duration_text {
    use chrono::TimeDelta;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        duration: &TimeDelta,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let text = String::deserialize(deserializer)?;
        crate::parse::parse_duration(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid duration '{}'", text)))
    }
}

/// Borrowed value of a record field, produced by a field accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i128),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    Duration(TimeDelta),
    Timestamp(NaiveDateTime),
    /// Text borrowed from the record.
    Text(&'a str),
    /// Elements of a collection field.
    List(Vec<FieldValue<'a>>),
    /// Absent optional field.
    Null,
}

impl<'a> FieldValue<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Extracts the text, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the collection elements, if present.
    pub fn as_list(&self) -> Option<&[FieldValue<'a>]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Copies this value into an owned [`Value`]; `Null` yields `None`.
    pub fn to_value(&self) -> Option<Value> {
        Some(match self {
            FieldValue::Integer(n) => Value::Integer(*n),
            FieldValue::Float(n) => Value::Float(*n),
            FieldValue::Boolean(b) => Value::Boolean(*b),
            FieldValue::Uuid(u) => Value::Uuid(*u),
            FieldValue::Duration(d) => Value::Duration(*d),
            FieldValue::Timestamp(t) => Value::Timestamp(*t),
            FieldValue::Text(s) => Value::Text((*s).to_string()),
            FieldValue::List(items) => {
                Value::Array(items.iter().filter_map(FieldValue::to_value).collect())
            }
            FieldValue::Null => return None,
        })
    }
}

/// Types that can be exposed as queryable record fields.
///
/// Implemented for the primitive numeric types up to 64 bits (and `i128`),
/// `bool`, `String`, `&str`, [`Uuid`], [`TimeDelta`], the chrono date/time
/// types, and for `Vec<T>` and `Option<T>` of those. `#[derive(Queryable)]` relies on this
/// trait to obtain the kind and the accessor of each field.
pub trait QueryValue {
    /// The static kind of values of this type.
    fn kind() -> ValueKind;

    /// Borrows the value for comparison.
    fn field_value(&self) -> FieldValue<'_>;
}

macro_rules! integer_query_value {
    ($($ty:ty),*) => {
        $(
            impl QueryValue for $ty {
                fn kind() -> ValueKind {
                    ValueKind::Integer
                }

                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Integer(*self as i128)
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Integer(n as i128)
                }
            }
        )*
    };
}

integer_query_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

impl QueryValue for f32 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self as f64)
    }
}

impl QueryValue for f64 {
    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self)
    }
}

impl QueryValue for bool {
    fn kind() -> ValueKind {
        ValueKind::Boolean
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Boolean(*self)
    }
}

impl QueryValue for String {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl QueryValue for Uuid {
    fn kind() -> ValueKind {
        ValueKind::Uuid
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Uuid(*self)
    }
}

impl QueryValue for TimeDelta {
    fn kind() -> ValueKind {
        ValueKind::Duration
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Duration(*self)
    }
}

impl QueryValue for NaiveDateTime {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Timestamp(*self)
    }
}

impl QueryValue for NaiveDate {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Timestamp(self.and_time(NaiveTime::MIN))
    }
}

impl QueryValue for DateTime<Utc> {
    fn kind() -> ValueKind {
        ValueKind::Timestamp
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Timestamp(self.naive_utc())
    }
}

impl<T: QueryValue> QueryValue for Vec<T> {
    fn kind() -> ValueKind {
        ValueKind::List(Box::new(T::kind()))
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(QueryValue::field_value).collect())
    }
}

impl<T: QueryValue> QueryValue for Option<T> {
    fn kind() -> ValueKind {
        T::kind()
    }

    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Some(value) => value.field_value(),
            None => FieldValue::Null,
        }
    }
}

impl QueryValue for &str {
    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

// Conversions from common types to Value

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Timestamp(t)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Timestamp(d.and_time(NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t.naive_utc())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::from(42).kind(), ValueKind::Integer);
        assert_eq!(Value::from(4.5).kind(), ValueKind::Float);
        assert_eq!(Value::from("x").kind(), ValueKind::Text);
        assert_eq!(
            Value::from(vec![1, 2]).kind(),
            ValueKind::Array(Some(Box::new(ValueKind::Integer)))
        );
        assert_eq!(Value::Array(vec![]).kind(), ValueKind::Array(None));
    }

    #[test]
    fn kind_capabilities() {
        assert!(ValueKind::Text.is_orderable());
        assert!(ValueKind::Timestamp.is_orderable());
        assert!(!ValueKind::Boolean.is_orderable());
        assert!(ValueKind::Boolean.is_sortable());
        assert!(!ValueKind::List(Box::new(ValueKind::Text)).is_sortable());
        assert!(ValueKind::Float.is_numeric());
        assert!(!ValueKind::Uuid.is_numeric());
    }

    #[test]
    fn kind_display() {
        assert_eq!(ValueKind::Integer.to_string(), "integer");
        assert_eq!(
            ValueKind::List(Box::new(ValueKind::Text)).to_string(),
            "list of text"
        );
        assert_eq!(ValueKind::Array(None).to_string(), "array");
    }

    #[test]
    fn natural_text_forms() {
        assert_eq!(Value::from(30).to_string(), "30");
        assert_eq!(Value::from(2.0).to_string(), "2.0");
        assert_eq!(Value::from(123.45).to_string(), "123.45");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(
            Value::from(Uuid::nil()).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(Value::from("Alice").to_string(), "Alice");
    }

    #[test]
    fn timestamp_text_form() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        let ts = date.and_hms_opt(12, 34, 56).unwrap();
        assert_eq!(Value::from(ts).to_string(), "2023-10-01T12:34:56");

        let ts = date.and_hms_milli_opt(12, 34, 56, 250).unwrap();
        assert_eq!(Value::from(ts).to_string(), "2023-10-01T12:34:56.250");
    }

    #[test]
    fn duration_text_form() {
        let d = TimeDelta::days(1)
            + TimeDelta::hours(2)
            + TimeDelta::minutes(3)
            + TimeDelta::seconds(4);
        assert_eq!(format_duration(d), "1.02:03:04");
        assert_eq!(format_duration(TimeDelta::minutes(90)), "01:30:00");
        assert_eq!(format_duration(-TimeDelta::seconds(5)), "-00:00:05");
        assert_eq!(
            format_duration(TimeDelta::milliseconds(1500)),
            "00:00:01.5"
        );
        assert_eq!(format_duration(TimeDelta::zero()), "00:00:00");
    }

    #[test]
    fn array_text_form_escapes_commas() {
        let value = Value::from(vec!["test1", "test,with,comma"]);
        assert_eq!(value.to_string(), "[test1,test\\,with\\,comma]");
    }

    #[test]
    fn nested_array_text_form() {
        let value = Value::Array(vec![Value::from(vec![1, 2]), Value::from(vec![3])]);
        assert_eq!(value.to_string(), "[[1,2],[3]]");
    }

    #[test]
    fn field_value_round_trip() {
        let value = Value::from(vec!["a", "b"]);
        let field = value.as_field();
        assert_eq!(
            field,
            FieldValue::List(vec![FieldValue::Text("a"), FieldValue::Text("b")])
        );
        assert_eq!(field.to_value(), Some(value));
        assert_eq!(FieldValue::Null.to_value(), None);
    }

    #[test]
    fn query_value_impls() {
        assert_eq!(<u8 as QueryValue>::kind(), ValueKind::Integer);
        assert_eq!(7u8.field_value(), FieldValue::Integer(7));
        assert_eq!(
            <Vec<String> as QueryValue>::kind(),
            ValueKind::List(Box::new(ValueKind::Text))
        );
        assert_eq!(<Option<f64> as QueryValue>::kind(), ValueKind::Float);
        assert_eq!(None::<f64>.field_value(), FieldValue::Null);
        assert_eq!(<&str as QueryValue>::kind(), ValueKind::Text);
        assert_eq!("abc".field_value(), FieldValue::Text("abc"));
        assert_eq!(
            u64::MAX.field_value(),
            FieldValue::Integer(u64::MAX as i128)
        );

        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(
            date.field_value(),
            FieldValue::Timestamp(date.and_hms_opt(0, 0, 0).unwrap())
        );
    }
}
