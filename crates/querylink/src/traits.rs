//! Traits for derive macro support.
//!
//! This module provides the [`Queryable`] trait which is implemented by the
//! `#[derive(Queryable)]` macro to expose a record's fields by name.

use std::fmt;

use crate::value::{FieldValue, QueryValue, ValueKind};

/// Accessor reading a field from a record.
pub type Accessor<T> = for<'a> fn(&'a T) -> FieldValue<'a>;

/// A named, typed field of a record type `T`.
pub struct Field<T> {
    name: &'static str,
    kind: ValueKind,
    accessor: Accessor<T>,
}

impl<T> Field<T> {
    /// Creates a field descriptor.
    pub fn new(name: &'static str, kind: ValueKind, accessor: Accessor<T>) -> Self {
        Field {
            name,
            kind,
            accessor,
        }
    }

    /// Creates a field descriptor whose kind is taken from the field type.
    pub fn of<V: QueryValue>(name: &'static str, accessor: Accessor<T>) -> Self {
        Field::new(name, V::kind(), accessor)
    }

    /// The query name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The static kind of the field.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The accessor function.
    pub fn accessor(&self) -> Accessor<T> {
        self.accessor
    }

    /// Reads the field from a record.
    pub fn get<'a>(&self, record: &'a T) -> FieldValue<'a> {
        (self.accessor)(record)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Field {
            name: self.name,
            kind: self.kind.clone(),
            accessor: self.accessor,
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Record types whose fields can be filtered and ordered by name.
///
/// This trait is typically derived using `#[derive(Queryable)]` from the
/// `querylink-macros` crate, but can also be implemented manually.
///
/// # Derive Usage
///
/// ```ignore
/// use querylink::{apply, Definitions};
/// use querylink_macros::Queryable;
///
/// #[derive(Queryable)]
/// #[query(rename_all = "PascalCase")]
/// struct Person {
///     name: String,
///     age: u32,
///     #[query(skip)]
///     password_hash: String,
/// }
///
/// let defs = Definitions::new().gte(Person::AGE, 30);
/// let adults = apply(&people, &defs, None)?;
/// ```
///
/// # Manual Implementation
///
/// ```
/// use querylink::{Field, FieldValue, Queryable, QueryValue};
///
/// struct Task {
///     title: String,
///     priority: u8,
/// }
///
/// impl Queryable for Task {
///     fn field(name: &str) -> Option<Field<Self>> {
///         match name {
///             "title" => Some(Field::of::<String>("title", |t| t.title.field_value())),
///             "priority" => Some(Field::of::<u8>("priority", |t| t.priority.field_value())),
///             _ => None,
///         }
///     }
///
///     fn field_names() -> &'static [&'static str] {
///         &["title", "priority"]
///     }
/// }
///
/// let task = Task { title: "Write docs".into(), priority: 3 };
/// assert_eq!(task.field_value("priority"), Some(FieldValue::Integer(3)));
/// assert_eq!(task.field_value("missing"), None);
/// ```
pub trait Queryable: Sized {
    /// Looks up a field by its query name.
    fn field(name: &str) -> Option<Field<Self>>;

    /// Query names of all registered fields, in declaration order.
    fn field_names() -> &'static [&'static str];

    /// Reads a field of this record by name.
    fn field_value(&self, name: &str) -> Option<FieldValue<'_>> {
        Self::field(name).map(|field| field.get(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestItem {
        name: String,
        count: i32,
        tags: Vec<String>,
    }

    impl Queryable for TestItem {
        fn field(name: &str) -> Option<Field<Self>> {
            match name {
                "name" => Some(Field::of::<String>("name", |r| r.name.field_value())),
                "count" => Some(Field::of::<i32>("count", |r| r.count.field_value())),
                "tags" => Some(Field::of::<Vec<String>>("tags", |r| r.tags.field_value())),
                _ => None,
            }
        }

        fn field_names() -> &'static [&'static str] {
            &["name", "count", "tags"]
        }
    }

    fn item() -> TestItem {
        TestItem {
            name: "test".to_string(),
            count: 42,
            tags: vec!["a".to_string()],
        }
    }

    #[test]
    fn queryable_manual_impl() {
        let item = item();

        assert_eq!(item.field_value("name"), Some(FieldValue::Text("test")));
        assert_eq!(item.field_value("count"), Some(FieldValue::Integer(42)));
        assert_eq!(
            item.field_value("tags"),
            Some(FieldValue::List(vec![FieldValue::Text("a")]))
        );
        assert_eq!(item.field_value("unknown"), None);
    }

    #[test]
    fn field_descriptor() {
        let field = TestItem::field("tags").unwrap();
        assert_eq!(field.name(), "tags");
        assert_eq!(field.kind(), &ValueKind::List(Box::new(ValueKind::Text)));

        let cloned = field.clone();
        assert_eq!(cloned.get(&item()), field.get(&item()));
        assert!(format!("{:?}", field).contains("tags"));
    }

    #[test]
    fn field_names_are_registered() {
        for name in TestItem::field_names() {
            assert!(TestItem::field(name).is_some());
        }
    }
}
