//! Heuristic parser recovering typed values from untyped text.
//!
//! [`parse`] tries a fixed list of interpretations in priority order and
//! returns the first that succeeds:
//!
//! 1. integer (up to 128 bits)
//! 2. finite floating-point number
//! 3. boolean (`true` / `false`, any case)
//! 4. UUID
//! 5. duration (`[-][d.]h:m[:s[.fraction]]`)
//! 6. timestamp (RFC 3339 or `YYYY-MM-DD[(T| )hh:mm[:ss[.fraction]]]`)
//! 7. bracket-delimited array
//! 8. the trimmed text itself
//!
//! The last interpretation always succeeds, so parsing never fails.
//!
//! # Arrays
//!
//! `[a,b,c]` is split on commas that are neither escaped as `\,` nor inside a
//! nested bracket pair. The same interpretation list is then tried across all
//! elements at once: the first interpretation every element accepts fixes the
//! element type, so arrays are always homogeneous.
//!
//! ```
//! use querylink::{parse_str, Value};
//!
//! assert_eq!(parse_str("[1, 2, 3]"), Value::from(vec![1i64, 2, 3]));
//! assert_eq!(
//!     parse_str(r"[test1, test\,with\,comma]"),
//!     Value::from(vec!["test1", "test,with,comma"]),
//! );
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::value::Value;

type Interpretation = fn(&str) -> Option<Value>;

/// Interpretations in priority order.
const INTERPRETATIONS: [(&str, Interpretation); 8] = [
    ("integer", parse_integer),
    ("float", parse_float),
    ("boolean", parse_boolean),
    ("uuid", parse_uuid),
    ("duration", parse_duration_value),
    ("timestamp", parse_timestamp_value),
    ("array", parse_array),
    ("text", parse_text),
];

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-)?(?:(\d+)\.)?(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,9}))?)?$")
        .expect("duration pattern is valid")
});

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses optional text; `None` yields `None`.
pub fn parse(text: Option<&str>) -> Option<Value> {
    text.map(parse_str)
}

/// Parses text into the most specific value it matches.
pub fn parse_str(text: &str) -> Value {
    for (name, interpret) in INTERPRETATIONS {
        if let Some(value) = interpret(text) {
            trace!("parsed '{}' as {}", text, name);
            return value;
        }
    }
    // The text interpretation always succeeds.
    Value::Text(text.trim().to_string())
}

fn parse_integer(s: &str) -> Option<Value> {
    s.trim().parse::<i128>().ok().map(Value::Integer)
}

fn parse_float(s: &str) -> Option<Value> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(Value::Float)
}

fn parse_boolean(s: &str) -> Option<Value> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(Value::Boolean(true))
    } else if s.eq_ignore_ascii_case("false") {
        Some(Value::Boolean(false))
    } else {
        None
    }
}

fn parse_uuid(s: &str) -> Option<Value> {
    Uuid::parse_str(s.trim()).ok().map(Value::Uuid)
}

fn parse_duration_value(s: &str) -> Option<Value> {
    parse_duration(s).map(Value::Duration)
}

fn parse_timestamp_value(s: &str) -> Option<Value> {
    parse_timestamp(s).map(Value::Timestamp)
}

fn parse_text(s: &str) -> Option<Value> {
    Some(Value::Text(s.trim().to_string()))
}

/// Parses `[-][d.]h:m[:s[.fraction]]`.
pub(crate) fn parse_duration(s: &str) -> Option<TimeDelta> {
    let caps = DURATION_PATTERN.captures(s.trim())?;
    let number = |i: usize| -> Option<i64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let days = number(2)?;
    let hours = number(3)?;
    let minutes = number(4)?;
    let seconds = number(5)?;
    if hours >= 24 || minutes >= 60 || seconds >= 60 {
        return None;
    }

    let nanos = match caps.get(6) {
        Some(m) => format!("{:0<9}", m.as_str()).parse::<i64>().ok()?,
        None => 0,
    };

    let total_secs = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    let duration =
        TimeDelta::try_seconds(total_secs)?.checked_add(&TimeDelta::nanoseconds(nanos))?;

    if caps.get(1).is_some() {
        Some(-duration)
    } else {
        Some(duration)
    }
}

/// Parses RFC 3339 (normalized to UTC) or an ISO-like local timestamp.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_array(s: &str) -> Option<Value> {
    let elements = array_elements(s)?;
    if elements.is_empty() {
        return Some(Value::Array(Vec::new()));
    }

    INTERPRETATIONS.iter().find_map(|(name, interpret)| {
        let items: Option<Vec<Value>> = elements.iter().map(|e| interpret(e.as_str())).collect();
        if items.is_some() {
            trace!("parsed array of {} elements as {}", elements.len(), name);
        }
        items.map(Value::Array)
    })
}

/// Reads text as text, without typed interpretation.
///
/// Bracketed text still splits into an array, whose elements are read the
/// same way. Text fields compare against this form of a decoded value, so
/// `007` or `1.50` keep the exact characters that were sent.
///
/// ```
/// use querylink::{parse::parse_as_text, Value};
///
/// assert_eq!(parse_as_text(" 007 "), Value::from("007"));
/// assert_eq!(parse_as_text("[1.50,TRUE]"), Value::from(vec!["1.50", "TRUE"]));
/// ```
pub fn parse_as_text(text: &str) -> Value {
    match array_elements(text) {
        Some(elements) => Value::Array(elements.iter().map(|e| parse_as_text(e)).collect()),
        None => Value::Text(text.trim().to_string()),
    }
}

/// Splits bracket-delimited text into its raw elements.
///
/// Returns `None` unless the trimmed text starts with `[` and ends with `]`.
/// An interior that is blank yields no elements.
fn array_elements(s: &str) -> Option<Vec<String>> {
    let s = s.trim();
    if s.len() < 2 || !s.starts_with('[') || !s.ends_with(']') {
        return None;
    }
    let elements = split_elements(&s[1..s.len() - 1]);
    if elements.len() == 1 && elements[0].trim().is_empty() {
        return Some(Vec::new());
    }
    Some(elements)
}

/// Splits an array interior on top-level unescaped commas.
///
/// `\,` is unescaped at the top level only; nested arrays keep their raw
/// text for the recursive parse.
fn split_elements(interior: &str) -> Vec<String> {
    let mut elements = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = interior.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                if depth > 0 {
                    current.push('\\');
                }
                current.push(',');
                chars.next();
            }
            '[' => {
                depth += 1;
                current.push(c);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => elements.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    elements.push(current);
    elements
}
