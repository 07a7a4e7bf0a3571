//! Filter and order definitions.
//!
//! [`Definitions`] is the declarative description of a query: an ordered list
//! of filters, all of which must hold, and an ordered list of sort keys, the
//! first being the primary key and each later one breaking ties.
//!
//! Definitions are plain data. They carry no reference to a record type and
//! are only checked against one when compiled.

use crate::op::FilterOperator;
use crate::ordering::Dir;
use crate::parse::parse_str;
use crate::value::Value;

/// A single filter: a field name, an operator, and a literal value.
///
/// A filter read from text also keeps the text it was parsed from. Equality
/// ignores that text.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterDefinition {
    field: String,
    operator: FilterOperator,
    value: Value,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    text: Option<String>,
}

impl FilterDefinition {
    /// Creates a new filter definition.
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        FilterDefinition {
            field: field.into(),
            operator,
            value: value.into(),
            text: None,
        }
    }

    /// Creates a filter whose value is parsed from text.
    ///
    /// The trimmed text is kept, so text fields compare against exactly the
    /// characters given even when they also parse as a number, a boolean or
    /// a date.
    ///
    /// ```
    /// use querylink::{FilterDefinition, FilterOperator, Value};
    ///
    /// let filter = FilterDefinition::from_text("Code", FilterOperator::Eq, " 007 ");
    /// assert_eq!(filter.value(), &Value::Integer(7));
    /// assert_eq!(filter.text(), Some("007"));
    /// ```
    pub fn from_text(field: impl Into<String>, operator: FilterOperator, text: &str) -> Self {
        FilterDefinition {
            field: field.into(),
            operator,
            value: parse_str(text),
            text: Some(text.trim().to_string()),
        }
    }

    /// The field name the filter applies to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison operator.
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// The literal compared against.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The text the value was parsed from, if it was read from text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl PartialEq for FilterDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.operator == other.operator && self.value == other.value
    }
}

/// A single sort key: a field name and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderDefinition {
    field: String,
    reversed: bool,
}

impl OrderDefinition {
    /// Creates an ascending sort key.
    pub fn asc(field: impl Into<String>) -> Self {
        OrderDefinition::new(field, false)
    }

    /// Creates a descending sort key.
    pub fn desc(field: impl Into<String>) -> Self {
        OrderDefinition::new(field, true)
    }

    /// Creates a sort key, descending when `reversed` is set.
    pub fn new(field: impl Into<String>, reversed: bool) -> Self {
        OrderDefinition {
            field: field.into(),
            reversed,
        }
    }

    /// The field name to sort by.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns `true` for descending order.
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    /// The sort direction.
    pub fn dir(&self) -> Dir {
        if self.reversed {
            Dir::Desc
        } else {
            Dir::Asc
        }
    }
}

/// Ordered filters and sort keys describing a query.
///
/// # Example
///
/// ```
/// use querylink::{Definitions, FilterOperator};
///
/// let defs = Definitions::new()
///     .eq("Name", "Alice")
///     .gte("Age", 30)
///     .is_in("Role", vec!["admin", "owner"])
///     .order_desc("Date")
///     .order_asc("Name");
///
/// assert_eq!(defs.filters().len(), 3);
/// assert_eq!(defs.filters()[1].operator(), FilterOperator::Gte);
/// assert!(defs.orders()[0].reversed());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Definitions {
    #[cfg_attr(feature = "serde", serde(default))]
    filters: Vec<FilterDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    orders: Vec<OrderDefinition>,
}

impl Definitions {
    /// Creates empty definitions, which match every record in source order.
    pub fn new() -> Self {
        Definitions::default()
    }

    /// Creates definitions from prebuilt filters and orders.
    pub fn from_parts(filters: Vec<FilterDefinition>, orders: Vec<OrderDefinition>) -> Self {
        Definitions { filters, orders }
    }

    /// The filters in evaluation order.
    pub fn filters(&self) -> &[FilterDefinition] {
        &self.filters
    }

    /// The sort keys, primary first.
    pub fn orders(&self) -> &[OrderDefinition] {
        &self.orders
    }

    /// Returns `true` if there are neither filters nor orders.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.orders.is_empty()
    }

    /// Appends a prebuilt filter.
    pub fn push_filter(&mut self, filter: FilterDefinition) {
        self.filters.push(filter);
    }

    /// Appends a prebuilt sort key.
    pub fn push_order(&mut self, order: OrderDefinition) {
        self.orders.push(order);
    }

    // ========================================================================
    // Filter builders
    // ========================================================================

    /// Adds a filter.
    pub fn filter(
        mut self,
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(FilterDefinition::new(field, operator, value));
        self
    }

    /// Adds an equality filter.
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Eq, value)
    }

    /// Adds a not-equal filter.
    pub fn neq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Neq, value)
    }

    /// Adds a greater-than filter.
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Gt, value)
    }

    /// Adds a greater-than-or-equal filter.
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Gte, value)
    }

    /// Adds a less-than filter.
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Lt, value)
    }

    /// Adds a less-than-or-equal filter.
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Lte, value)
    }

    /// Adds a contains filter (substring for text, element for collections).
    pub fn has(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Has, value)
    }

    /// Adds a does-not-contain filter.
    pub fn nhas(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Nhas, value)
    }

    /// Adds a set membership filter; `values` should be an array.
    pub fn is_in(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::In, values)
    }

    /// Adds a set exclusion filter; `values` should be an array.
    pub fn not_in(self, field: impl Into<String>, values: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Nin, values)
    }

    /// Adds a starts-with filter.
    pub fn starts_with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Sw, value)
    }

    /// Adds a does-not-start-with filter.
    pub fn not_starts_with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Nsw, value)
    }

    /// Adds an ends-with filter.
    pub fn ends_with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::Ew, value)
    }

    /// Adds a does-not-end-with filter.
    pub fn not_ends_with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOperator::New, value)
    }

    // ========================================================================
    // Order builders
    // ========================================================================

    /// Adds an ascending sort key.
    pub fn order_asc(self, field: impl Into<String>) -> Self {
        self.order_by(field, false)
    }

    /// Adds a descending sort key.
    pub fn order_desc(self, field: impl Into<String>) -> Self {
        self.order_by(field, true)
    }

    /// Adds a sort key, descending when `reversed` is set.
    pub fn order_by(mut self, field: impl Into<String>, reversed: bool) -> Self {
        self.orders.push(OrderDefinition::new(field, reversed));
        self
    }
}
