//! Per-field substitute values for filtering and ordering.
//!
//! An override replaces how a field is read when a definition names it: the
//! compiler calls the override function instead of the field accessor and
//! compares against the substitute's kind. Filter and order overrides are
//! registered independently.
//!
//! ```
//! use querylink::{Overrides, Queryable};
//! # use querylink::{Field, QueryValue};
//! # struct Entity { id: i64, name: String }
//! # impl Queryable for Entity {
//! #     fn field(name: &str) -> Option<Field<Self>> {
//! #         match name {
//! #             "Id" => Some(Field::of::<i64>("Id", |e| e.id.field_value())),
//! #             "Name" => Some(Field::of::<String>("Name", |e| e.name.field_value())),
//! #             _ => None,
//! #         }
//! #     }
//! #     fn field_names() -> &'static [&'static str] { &["Id", "Name"] }
//! # }
//!
//! let overrides = Overrides::<Entity>::new()
//!     .filter("Id", |e| e.id + 100)?
//!     .order("Name", |e| e.name.to_lowercase())?;
//!
//! assert!(overrides.filter_override("Id").is_some());
//! assert!(overrides.order_override("Id").is_none());
//! # Ok::<(), querylink::QueryLinkError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{QueryLinkError, Result};
use crate::value::{QueryValue, Value, ValueKind};

type Replace<T> = Arc<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// A substitute value function for one field.
pub struct Override<T> {
    field: String,
    kind: ValueKind,
    replace: Replace<T>,
}

impl<T> Override<T> {
    /// Creates an override from a function returning any [`QueryValue`].
    ///
    /// The kind of `V` becomes the kind the field is compared as.
    pub fn new<V, F>(field: impl Into<String>, f: F) -> Self
    where
        V: QueryValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Override {
            field: field.into(),
            kind: V::kind(),
            replace: Arc::new(move |record| f(record).field_value().to_value()),
        }
    }

    /// The field name this override applies to.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The kind of the substitute value.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Computes the substitute value; `None` stands for an absent value.
    pub fn value(&self, record: &T) -> Option<Value> {
        (self.replace)(record)
    }
}

impl<T> Clone for Override<T> {
    fn clone(&self) -> Self {
        Override {
            field: self.field.clone(),
            kind: self.kind.clone(),
            replace: Arc::clone(&self.replace),
        }
    }
}

impl<T> fmt::Debug for Override<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Override")
            .field("field", &self.field)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Filter and order overrides for a record type.
pub struct Overrides<T> {
    filter: HashMap<String, Override<T>>,
    order: HashMap<String, Override<T>>,
}

impl<T> Overrides<T> {
    /// Creates an empty override set.
    pub fn new() -> Self {
        Overrides {
            filter: HashMap::new(),
            order: HashMap::new(),
        }
    }

    /// Registers a filter override.
    ///
    /// Fails with [`QueryLinkError::DuplicateOverride`] if the field already
    /// has one.
    pub fn filter<V, F>(mut self, field: impl Into<String>, f: F) -> Result<Self>
    where
        V: QueryValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        insert(&mut self.filter, Override::new(field, f))?;
        Ok(self)
    }

    /// Registers an order override.
    ///
    /// Fails with [`QueryLinkError::DuplicateOverride`] if the field already
    /// has one.
    pub fn order<V, F>(mut self, field: impl Into<String>, f: F) -> Result<Self>
    where
        V: QueryValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        insert(&mut self.order, Override::new(field, f))?;
        Ok(self)
    }

    /// Looks up the filter override for a field.
    pub fn filter_override(&self, field: &str) -> Option<&Override<T>> {
        self.filter.get(field)
    }

    /// Looks up the order override for a field.
    pub fn order_override(&self, field: &str) -> Option<&Override<T>> {
        self.order.get(field)
    }

    /// Returns `true` if no override is registered.
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty() && self.order.is_empty()
    }
}

fn insert<T>(set: &mut HashMap<String, Override<T>>, over: Override<T>) -> Result<()> {
    if set.contains_key(over.field()) {
        return Err(QueryLinkError::DuplicateOverride {
            field: over.field().to_string(),
        });
    }
    set.insert(over.field().to_string(), over);
    Ok(())
}

impl<T> Default for Overrides<T> {
    fn default() -> Self {
        Overrides::new()
    }
}

impl<T> Clone for Overrides<T> {
    fn clone(&self) -> Self {
        Overrides {
            filter: self.filter.clone(),
            order: self.order.clone(),
        }
    }
}

impl<T> fmt::Debug for Overrides<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut filter: Vec<&str> = self.filter.keys().map(String::as_str).collect();
        let mut order: Vec<&str> = self.order.keys().map(String::as_str).collect();
        filter.sort_unstable();
        order.sort_unstable();
        f.debug_struct("Overrides")
            .field("filter", &filter)
            .field("order", &order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entity {
        id: i64,
        name: String,
        nickname: Option<String>,
    }

    fn entity() -> Entity {
        Entity {
            id: 2,
            name: "Bob".to_string(),
            nickname: None,
        }
    }

    #[test]
    fn override_computes_substitute() {
        let over = Override::new("Id", |e: &Entity| e.id + 100);
        assert_eq!(over.field(), "Id");
        assert_eq!(over.kind(), &ValueKind::Integer);
        assert_eq!(over.value(&entity()), Some(Value::Integer(102)));
    }

    #[test]
    fn override_kind_may_differ_from_field() {
        let over = Override::new("Id", |e: &Entity| format!("#{}", e.id));
        assert_eq!(over.kind(), &ValueKind::Text);
        assert_eq!(over.value(&entity()), Some(Value::Text("#2".to_string())));
    }

    #[test]
    fn absent_substitute_is_none() {
        let over = Override::new("Nickname", |e: &Entity| e.nickname.clone());
        assert_eq!(over.kind(), &ValueKind::Text);
        assert_eq!(over.value(&entity()), None);
    }

    #[test]
    fn filter_and_order_sets_are_independent() {
        let overrides = Overrides::<Entity>::new()
            .filter("Name", |e| e.name.to_uppercase())
            .unwrap()
            .order("Name", |e| e.name.len())
            .unwrap();

        let filter = overrides.filter_override("Name").unwrap();
        let order = overrides.order_override("Name").unwrap();
        assert_eq!(
            filter.value(&entity()),
            Some(Value::Text("BOB".to_string()))
        );
        assert_eq!(order.value(&entity()), Some(Value::Integer(3)));
        assert!(overrides.filter_override("Id").is_none());
    }

    #[test]
    fn duplicate_override_fails() {
        let result = Overrides::<Entity>::new()
            .filter("Id", |e| e.id)
            .unwrap()
            .filter("Id", |e| e.id * 2);

        assert_eq!(
            result.unwrap_err(),
            QueryLinkError::DuplicateOverride {
                field: "Id".to_string()
            }
        );
    }

    #[test]
    fn overrides_are_shareable() {
        fn assert_send_sync<S: Send + Sync>() {}
        assert_send_sync::<Overrides<Entity>>();

        let overrides = Overrides::<Entity>::new().filter("Id", |e| e.id).unwrap();
        let cloned = overrides.clone();
        assert!(!cloned.is_empty());
        assert!(Overrides::<Entity>::default().is_empty());
        assert_eq!(
            format!("{:?}", cloned),
            "Overrides { filter: [\"Id\"], order: [] }"
        );
    }
}
