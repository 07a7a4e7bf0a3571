//! QueryLink - Declarative filters and orders for Rust struct collections.
//!
//! QueryLink describes a query as plain data, carries it across a URL query
//! string, and applies it to in-memory collections of records. It provides:
//!
//! - [`Definitions`]: ordered filters (all must hold) and ordered sort keys
//! - A compact query-string codec ([`encode`] / [`decode`])
//! - A value parser that recovers typed values from text ([`parse`])
//! - A compiler that type checks definitions against a record type and
//!   builds one predicate and one comparator ([`compile`], [`apply`])
//! - Per-field [`Overrides`] substituting how a field is filtered or ordered
//! - Deferred composition into any [`QuerySource`], such as [`Query`]
//!
//! # Quick Start
//!
//! ```rust
//! use querylink::{apply, decode, encode, Definitions, Field, Queryable, QueryValue};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//!     tags: Vec<String>,
//! }
//!
//! impl Queryable for Person {
//!     fn field(name: &str) -> Option<Field<Self>> {
//!         match name {
//!             "Name" => Some(Field::of::<String>("Name", |p| p.name.field_value())),
//!             "Age" => Some(Field::of::<u32>("Age", |p| p.age.field_value())),
//!             "Tags" => Some(Field::of::<Vec<String>>("Tags", |p| p.tags.field_value())),
//!             _ => None,
//!         }
//!     }
//!
//!     fn field_names() -> &'static [&'static str] {
//!         &["Name", "Age", "Tags"]
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "Alice".into(), age: 30, tags: vec!["admin".into()] },
//!     Person { name: "Bob".into(), age: 25, tags: vec![] },
//!     Person { name: "Charlie".into(), age: 35, tags: vec!["admin".into()] },
//! ];
//!
//! let defs = Definitions::new()
//!     .has("Tags", "admin")
//!     .gte("Age", 30)
//!     .order_desc("Age");
//!
//! // Definitions survive a trip through a query string
//! let query = encode(&defs);
//! assert_eq!(decode(&query)?, defs);
//!
//! let results = apply(&people, &defs, None)?;
//! let names: Vec<&str> = results.iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, ["Charlie", "Alice"]);
//! # Ok::<(), querylink::QueryLinkError>(())
//! ```
//!
//! With the `derive` feature, `#[derive(Queryable)]` writes the
//! [`Queryable`] implementation.
//!
//! # Query String Format
//!
//! ```text
//! filter[]=<field><token><value>   repeated, one per filter
//! order=<field>,-<field>           one key per entry, `-` for descending
//! ```
//!
//! | Operator | Token | Field kinds |
//! |----------|-------|-------------|
//! | `Eq`, `Neq` | `=`, `!=` | any scalar |
//! | `Gt`, `Gte`, `Lt`, `Lte` | `>`, `>=`, `<`, `<=` | numbers, text, uuid, duration, timestamp |
//! | `Has`, `Nhas` | `=*`, `!*` | text (substring), collections (element) |
//! | `In`, `Nin` | `[]`, `![]` | any scalar, value is an array |
//! | `Sw`, `Nsw` | `^`, `!^` | text |
//! | `Ew`, `New` | `$`, `!$` | text |
//!
//! Values are typed by the value parser: `30` is an integer, `2.5` a float,
//! `true` a boolean, `1.02:00:00` a duration, `2024-01-31` a timestamp and
//! `[a,b]` an array. Commas inside array elements are escaped as `\,`.
//!
//! # Null Handling
//!
//! An absent optional field fails every positive filter and passes the
//! negated ones (`!=`, `!*`, `![]`, `!^`, `!$`). It sorts before every
//! value.

// Lets `#[derive(Queryable)]` paths resolve inside this crate.
extern crate self as querylink;

mod codec;
mod compile;
mod condition;
mod definitions;
mod error;
mod op;
mod ordering;
mod overrides;
pub mod parse;
mod traits;
mod value;

// Re-export public API
pub use codec::{decode, decode_with, encode, encode_with, QueryKeys};
pub use compile::{
    apply, apply_owned, apply_to, compile, Comparator, Compiled, Predicate, Query, QuerySource,
};
pub use condition::Condition;
pub use definitions::{Definitions, FilterDefinition, OrderDefinition};
pub use error::{QueryLinkError, Result};
pub use op::FilterOperator;
pub use ordering::{compare_values, sort_key_cmp, Dir};
pub use overrides::{Override, Overrides};
pub use parse::{parse, parse_str};
pub use traits::{Accessor, Field, Queryable};
pub use value::{FieldValue, QueryValue, Value, ValueKind};

#[cfg(feature = "derive")]
pub use querylink_macros::Queryable;
