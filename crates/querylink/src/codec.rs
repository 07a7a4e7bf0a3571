//! Query-string encoding of definitions.
//!
//! Filters travel as repeated `filter[]` parameters whose value is the field
//! name, the operator token and the value text run together; sort keys travel
//! as one comma-separated `order` parameter where a leading `-` marks
//! descending order:
//!
//! ```text
//! filter[]=Name%3DAlice&filter[]=Age%3E%3D30&order=Date,-Name
//! ```
//!
//! Parameter names are configurable through [`QueryKeys`].
//!
//! When decoding, the first operator token in the filter text splits it; at
//! any position the longest token wins, so `Age>=30` is `Age`, `>=`, `30`.
//! Value text goes through the value parser, which recovers its type. The
//! text is kept too, and encoding writes it back unchanged.

use std::borrow::Cow;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::definitions::{Definitions, FilterDefinition, OrderDefinition};
use crate::error::{QueryLinkError, Result};
use crate::op::FilterOperator;

/// Operator tokens, longest first, as one alternation.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let mut tokens: Vec<&str> = FilterOperator::ALL.iter().map(|op| op.token()).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternation: Vec<String> = tokens.into_iter().map(regex::escape).collect();
    Regex::new(&alternation.join("|"))
        .expect("operator token pattern is valid")
});

/// Names of the query-string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryKeys {
    /// Parameter carrying filters, written with a `[]` suffix.
    pub filter: String,
    /// Parameter carrying sort keys.
    pub order: String,
}

impl QueryKeys {
    /// Creates parameter names.
    pub fn new(filter: impl Into<String>, order: impl Into<String>) -> Self {
        QueryKeys {
            filter: filter.into(),
            order: order.into(),
        }
    }

    fn filter_param(&self) -> String {
        format!("{}[]", self.filter)
    }
}

impl Default for QueryKeys {
    fn default() -> Self {
        QueryKeys::new("filter", "order")
    }
}

/// Encodes definitions with the default parameter names.
///
/// ```
/// use querylink::{encode, Definitions};
///
/// let defs = Definitions::new()
///     .eq("Name", "Alice")
///     .gt("Age", 30)
///     .order_asc("Date")
///     .order_desc("Name");
///
/// assert_eq!(
///     encode(&defs),
///     "filter[]=Name%3DAlice&filter[]=Age%3E30&order=Date,-Name"
/// );
/// ```
pub fn encode(definitions: &Definitions) -> String {
    encode_with(definitions, &QueryKeys::default())
}

/// Encodes definitions with custom parameter names.
///
/// Empty definitions encode as the empty string.
pub fn encode_with(definitions: &Definitions, keys: &QueryKeys) -> String {
    let filter_param = keys.filter_param();
    let mut out = definitions
        .filters()
        .iter()
        .map(|f| {
            let value = match f.text() {
                Some(text) => Cow::Borrowed(text),
                None => Cow::Owned(f.value().to_string()),
            };
            let text = format!("{}{}{}", f.field(), f.operator().token(), value);
            format!("{}={}", filter_param, urlencoding::encode(&text))
        })
        .collect::<Vec<_>>()
        .join("&");

    if !definitions.orders().is_empty() {
        if !out.is_empty() {
            out.push('&');
        }
        let orders: Vec<String> = definitions
            .orders()
            .iter()
            .map(|o| {
                let sign = if o.reversed() { "-" } else { "" };
                let field = format!("{}{}", sign, o.field());
                urlencoding::encode(&field).into_owned()
            })
            .collect();
        out.push_str(&keys.order);
        out.push('=');
        out.push_str(&orders.join(","));
    }

    out
}

/// Decodes definitions with the default parameter names.
///
/// ```
/// use querylink::{decode, FilterOperator, Value};
///
/// let defs = decode("?filter[]=Age>=30&order=-Date")?;
/// let filter = &defs.filters()[0];
/// assert_eq!(filter.field(), "Age");
/// assert_eq!(filter.operator(), FilterOperator::Gte);
/// assert_eq!(filter.value(), &Value::Integer(30));
/// assert!(defs.orders()[0].reversed());
/// # Ok::<(), querylink::QueryLinkError>(())
/// ```
pub fn decode(query: &str) -> Result<Definitions> {
    decode_with(query, &QueryKeys::default())
}

/// Decodes definitions with custom parameter names.
///
/// Parameters other than the filter and order keys are ignored, as are sort
/// keys left without a field name. Fails with
/// [`QueryLinkError::MalformedFilter`] if a filter has no operator token or
/// no field name, or if percent-decoding fails.
pub fn decode_with(query: &str, keys: &QueryKeys) -> Result<Definitions> {
    let filter_param = keys.filter_param();
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut definitions = Definitions::new();

    for param in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = param.split_once('=').unwrap_or((param, ""));
        let key = percent_decode(raw_key)?;
        let value = percent_decode(raw_value)?;

        if *key == *filter_param {
            let filter = decode_filter(&value)?;
            trace!(
                "decoded filter {} {} {}",
                filter.field(),
                filter.operator().as_str(),
                filter.value()
            );
            definitions.push_filter(filter);
        } else if *key == *keys.order {
            for part in value.split(',').map(str::trim) {
                let field = part.trim_start_matches(['-', '+']).trim();
                if field.is_empty() {
                    continue;
                }
                let order = OrderDefinition::new(field, part.starts_with('-'));
                trace!("decoded order {} {}", order.field(), order.dir());
                definitions.push_order(order);
            }
        } else {
            trace!("ignoring parameter {}", key);
        }
    }

    Ok(definitions)
}

/// Splits `<field><token><value>` at the first operator token.
fn decode_filter(text: &str) -> Result<FilterDefinition> {
    let malformed = |reason| QueryLinkError::MalformedFilter {
        input: text.to_string(),
        reason,
    };

    let token = TOKEN_PATTERN
        .find(text)
        .ok_or_else(|| malformed("no operator token"))?;
    let field = text[..token.start()].trim();
    if field.is_empty() {
        return Err(malformed("empty field name"));
    }
    let operator = FilterOperator::from_token(token.as_str())
        .ok_or_else(|| malformed("unknown operator"))?;

    Ok(FilterDefinition::from_text(field, operator, &text[token.end()..]))
}

/// Percent-decodes a query-string component, reading `+` as a space.
fn percent_decode(text: &str) -> Result<Cow<'_, str>> {
    if !text.contains(['%', '+']) {
        return Ok(Cow::Borrowed(text));
    }
    let spaced = text.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| Cow::Owned(decoded.into_owned()))
        .map_err(|_| QueryLinkError::MalformedFilter {
            input: text.to_string(),
            reason: "invalid percent-encoding",
        })
}
