//! Compiling definitions against a record type and applying them.
//!
//! [`compile`] resolves every field a [`Definitions`] names against the
//! record's [`Queryable`] registry, type checks every operator, and produces a
//! [`Compiled`] query holding one predicate per filter and one comparator per
//! sort key. No record is touched until the compiled query is applied, and a
//! definition that fails to compile yields no partial result.
//!
//! # Semantics
//!
//! ```text
//! match    = filter[0] ∧ filter[1] ∧ ... (empty = every record)
//! ordering = order[0], ties broken by order[1], ... (empty = source order)
//! ```
//!
//! Sorting is stable, so records with equal keys keep their source order.
//!
//! # Deferred composition
//!
//! [`Compiled::apply_to`] hands the predicate and comparators to any
//! [`QuerySource`] instead of executing them. [`Query`] is the in-memory
//! implementation: it records the composed work and runs it later.

use std::any::type_name;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::condition::Condition;
use crate::definitions::{Definitions, FilterDefinition};
use crate::error::{QueryLinkError, Result};
use crate::ordering::{sort_key_cmp, Dir};
use crate::overrides::{Override, Overrides};
use crate::parse::parse_as_text;
use crate::traits::{Field, Queryable};
use crate::value::{FieldValue, Value, ValueKind};

/// Shared record predicate.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Shared record comparator.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// How a compiled filter or sort key reads its value from a record.
enum Access<T> {
    Field(Field<T>),
    Override(Override<T>),
}

impl<T> Access<T> {
    fn kind(&self) -> &ValueKind {
        match self {
            Access::Field(field) => field.kind(),
            Access::Override(over) => over.kind(),
        }
    }

    fn with_value<R>(&self, record: &T, f: impl FnOnce(&FieldValue<'_>) -> R) -> R {
        match self {
            Access::Field(field) => f(&field.get(record)),
            Access::Override(over) => match over.value(record) {
                Some(value) => f(&value.as_field()),
                None => f(&FieldValue::Null),
            },
        }
    }
}

/// Resolves a field name, preferring an override when one is given.
///
/// The name must exist on the record even when overridden.
fn resolve<T: Queryable>(name: &str, over: Option<&Override<T>>) -> Result<Access<T>> {
    let field = T::field(name).ok_or_else(|| QueryLinkError::UnknownField {
        field: name.to_string(),
        record: type_name::<T>(),
    })?;
    Ok(match over {
        Some(over) => Access::Override(over.clone()),
        None => Access::Field(field),
    })
}

/// The literal a filter compares against a field of `kind`.
///
/// Text fields, and collections of text, read a filter decoded from text as
/// the exact characters sent, so `007` matches `"007"` rather than `7`.
fn literal_for<'d>(def: &'d FilterDefinition, kind: &ValueKind) -> Cow<'d, Value> {
    let text_field = match kind {
        ValueKind::Text => true,
        ValueKind::List(element) => **element == ValueKind::Text,
        _ => false,
    };
    match def.text() {
        Some(text) if text_field => Cow::Owned(parse_as_text(text)),
        _ => Cow::Borrowed(def.value()),
    }
}

/// A sort key compiled to an ascending comparator plus a direction.
struct SortKey<T> {
    cmp: Comparator<T>,
    dir: Dir,
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        SortKey {
            cmp: Arc::clone(&self.cmp),
            dir: self.dir,
        }
    }
}

/// Definitions compiled against the record type `T`.
///
/// Cheap to clone and safe to share across threads.
pub struct Compiled<T> {
    filters: Vec<Predicate<T>>,
    orders: Vec<SortKey<T>>,
}

impl<T: 'static> Compiled<T> {
    /// Returns `true` if the record passes every filter.
    pub fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|filter| filter(record))
    }

    /// Compares two records by the sort keys in order.
    ///
    /// Returns `Equal` when there are no sort keys.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for key in &self.orders {
            let ordering = key.dir.apply((key.cmp)(a, b));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Returns the conjunction of all filters as one predicate.
    pub fn predicate(&self) -> Predicate<T> {
        let filters = self.filters.clone();
        Arc::new(move |record: &T| filters.iter().all(|filter| filter(record)))
    }

    /// Returns all sort keys combined into one comparator.
    pub fn comparator(&self) -> Comparator<T> {
        let compiled = Compiled {
            filters: Vec::new(),
            orders: self.orders.clone(),
        };
        Arc::new(move |a: &T, b: &T| compiled.compare(a, b))
    }

    /// Returns `true` if there are neither filters nor sort keys.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.orders.is_empty()
    }

    /// Filters and orders a slice, leaving it untouched.
    pub fn apply<'a>(&self, source: &'a [T]) -> Vec<&'a T> {
        let mut results: Vec<&T> = source.iter().filter(|r| self.matches(r)).collect();
        if !self.orders.is_empty() {
            results.sort_by(|a, b| self.compare(a, b));
        }
        results
    }

    /// Filters and orders an owned collection.
    pub fn apply_owned(&self, source: Vec<T>) -> Vec<T> {
        let mut results: Vec<T> = source.into_iter().filter(|r| self.matches(r)).collect();
        if !self.orders.is_empty() {
            results.sort_by(|a, b| self.compare(a, b));
        }
        results
    }

    /// Composes the filters and sort keys into a deferred query source.
    ///
    /// The first sort key becomes the primary order, each later one a
    /// tie-breaker.
    pub fn apply_to<Q: QuerySource<T>>(&self, source: Q) -> Q {
        let mut source = if self.filters.is_empty() {
            source
        } else {
            source.filter(self.predicate())
        };
        for (i, key) in self.orders.iter().enumerate() {
            let cmp = Arc::clone(&key.cmp);
            source = match (i, key.dir) {
                (0, Dir::Asc) => source.order_by(cmp),
                (0, Dir::Desc) => source.order_by_descending(cmp),
                (_, Dir::Asc) => source.then_by(cmp),
                (_, Dir::Desc) => source.then_by_descending(cmp),
            };
        }
        source
    }
}

impl<T> Clone for Compiled<T> {
    fn clone(&self) -> Self {
        Compiled {
            filters: self.filters.clone(),
            orders: self.orders.clone(),
        }
    }
}

impl<T> fmt::Debug for Compiled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("record", &type_name::<T>())
            .field("filters", &self.filters.len())
            .field("orders", &self.orders.len())
            .finish()
    }
}

/// Compiles definitions against the record type `T`.
///
/// Fails with [`QueryLinkError::UnknownField`] if a definition names a field
/// `T` does not register, or [`QueryLinkError::UnsupportedOperator`] if an
/// operator or sort key does not fit the field's kind. Overrides substitute
/// how a named field is read.
pub fn compile<T: Queryable + 'static>(
    definitions: &Definitions,
    overrides: Option<&Overrides<T>>,
) -> Result<Compiled<T>> {
    let mut filters: Vec<Predicate<T>> = Vec::with_capacity(definitions.filters().len());
    for def in definitions.filters() {
        let over = overrides.and_then(|o| o.filter_override(def.field()));
        let access = resolve::<T>(def.field(), over)?;
        let literal = literal_for(def, access.kind());
        let condition = Condition::new(def.field(), access.kind(), def.operator(), &literal)?;
        debug!(
            "compiled filter {}{}{} on {} as {}{}",
            def.field(),
            def.operator(),
            def.value(),
            type_name::<T>(),
            access.kind(),
            if over.is_some() { " (override)" } else { "" }
        );
        filters.push(Arc::new(move |record: &T| {
            access.with_value(record, |value| condition.matches(value))
        }));
    }

    let mut orders = Vec::with_capacity(definitions.orders().len());
    for def in definitions.orders() {
        let over = overrides.and_then(|o| o.order_override(def.field()));
        let access = resolve::<T>(def.field(), over)?;
        if !access.kind().is_sortable() {
            return Err(QueryLinkError::UnsupportedOperator {
                field: def.field().to_string(),
                operator: "order",
                kind: access.kind().to_string(),
                reason: "collections cannot be sort keys".to_string(),
            });
        }
        debug!(
            "compiled order {} {} on {}{}",
            def.field(),
            def.dir(),
            type_name::<T>(),
            if over.is_some() { " (override)" } else { "" }
        );
        let cmp: Comparator<T> = Arc::new(move |a: &T, b: &T| {
            access.with_value(a, |ka| access.with_value(b, |kb| sort_key_cmp(ka, kb)))
        });
        orders.push(SortKey { cmp, dir: def.dir() });
    }

    Ok(Compiled { filters, orders })
}

/// Compiles definitions and applies them to a slice.
///
/// # Example
///
/// ```
/// use querylink::{apply, Definitions, Field, Queryable, QueryValue};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Queryable for Person {
///     fn field(name: &str) -> Option<Field<Self>> {
///         match name {
///             "Name" => Some(Field::of::<String>("Name", |p| p.name.field_value())),
///             "Age" => Some(Field::of::<u32>("Age", |p| p.age.field_value())),
///             _ => None,
///         }
///     }
///
///     fn field_names() -> &'static [&'static str] {
///         &["Name", "Age"]
///     }
/// }
///
/// let people = vec![
///     Person { name: "Alice".into(), age: 30 },
///     Person { name: "Bob".into(), age: 25 },
///     Person { name: "Charlie".into(), age: 35 },
/// ];
///
/// let defs = Definitions::new().gte("Age", 30).order_desc("Age");
/// let results = apply(&people, &defs, None)?;
///
/// let names: Vec<&str> = results.iter().map(|p| p.name.as_str()).collect();
/// assert_eq!(names, ["Charlie", "Alice"]);
/// # Ok::<(), querylink::QueryLinkError>(())
/// ```
pub fn apply<'a, T: Queryable + 'static>(
    source: &'a [T],
    definitions: &Definitions,
    overrides: Option<&Overrides<T>>,
) -> Result<Vec<&'a T>> {
    Ok(compile(definitions, overrides)?.apply(source))
}

/// Compiles definitions and applies them to an owned collection.
pub fn apply_owned<T: Queryable + 'static>(
    source: Vec<T>,
    definitions: &Definitions,
    overrides: Option<&Overrides<T>>,
) -> Result<Vec<T>> {
    Ok(compile(definitions, overrides)?.apply_owned(source))
}

/// Compiles definitions and composes them into a deferred query source.
pub fn apply_to<T: Queryable + 'static, Q: QuerySource<T>>(
    source: Q,
    definitions: &Definitions,
    overrides: Option<&Overrides<T>>,
) -> Result<Q> {
    Ok(compile(definitions, overrides)?.apply_to(source))
}

/// A composable query that accepts predicates and comparators.
///
/// `order_by` establishes the primary order, replacing any previous one;
/// `then_by` adds a tie-breaker after the existing keys.
pub trait QuerySource<T>: Sized {
    /// Keeps only records matching the predicate.
    fn filter(self, predicate: Predicate<T>) -> Self;

    /// Orders ascending by the comparator.
    fn order_by(self, cmp: Comparator<T>) -> Self;

    /// Breaks ties ascending by the comparator.
    fn then_by(self, cmp: Comparator<T>) -> Self;

    /// Orders descending by the comparator.
    fn order_by_descending(self, cmp: Comparator<T>) -> Self
    where
        T: 'static,
    {
        self.order_by(reversed(cmp))
    }

    /// Breaks ties descending by the comparator.
    fn then_by_descending(self, cmp: Comparator<T>) -> Self
    where
        T: 'static,
    {
        self.then_by(reversed(cmp))
    }
}

fn reversed<T: 'static>(cmp: Comparator<T>) -> Comparator<T> {
    Arc::new(move |a: &T, b: &T| cmp(a, b).reverse())
}

/// In-memory deferred query.
///
/// Records filters and sort keys as they are composed and executes them only
/// when run.
///
/// ```
/// use std::sync::Arc;
/// use querylink::{Query, QuerySource};
///
/// let query = Query::<i32>::new()
///     .filter(Arc::new(|n: &i32| n % 2 == 0))
///     .order_by_descending(Arc::new(|a: &i32, b: &i32| a.cmp(b)));
///
/// assert_eq!(query.run_owned(vec![1, 2, 3, 4]), vec![4, 2]);
/// ```
pub struct Query<T> {
    filters: Vec<Predicate<T>>,
    orders: Vec<Comparator<T>>,
}

impl<T> Query<T> {
    /// Creates a query that keeps every record in source order.
    pub fn new() -> Self {
        Query {
            filters: Vec::new(),
            orders: Vec::new(),
        }
    }

    /// Returns `true` if the record passes every recorded filter.
    pub fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|filter| filter(record))
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        for cmp in &self.orders {
            let ordering = cmp(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Runs the query against a slice.
    pub fn run<'a>(&self, source: &'a [T]) -> Vec<&'a T> {
        let mut results: Vec<&T> = source.iter().filter(|r| self.matches(r)).collect();
        if !self.orders.is_empty() {
            results.sort_by(|a, b| self.compare(a, b));
        }
        results
    }

    /// Runs the query against an owned collection.
    pub fn run_owned(&self, source: Vec<T>) -> Vec<T> {
        let mut results: Vec<T> = source.into_iter().filter(|r| self.matches(r)).collect();
        if !self.orders.is_empty() {
            results.sort_by(|a, b| self.compare(a, b));
        }
        results
    }
}

impl<T> QuerySource<T> for Query<T> {
    fn filter(mut self, predicate: Predicate<T>) -> Self {
        self.filters.push(predicate);
        self
    }

    fn order_by(mut self, cmp: Comparator<T>) -> Self {
        self.orders.clear();
        self.orders.push(cmp);
        self
    }

    fn then_by(mut self, cmp: Comparator<T>) -> Self {
        self.orders.push(cmp);
        self
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Query::new()
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            filters: self.filters.clone(),
            orders: self.orders.clone(),
        }
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters.len())
            .field("orders", &self.orders.len())
            .finish()
    }
}
