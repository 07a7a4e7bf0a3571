//! Proc macros for QueryLink.
//!
//! # Available Macros
//!
//! - [`Queryable`] - Generate the field registry used to compile filter and
//!   order definitions against a struct
//!
//! # Examples
//!
//! For working examples, see `querylink/tests/queryable_derive.rs`.

mod queryable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Queryable` trait for a struct with named fields.
///
/// Every named field is registered under its Rust name, with the kind given
/// by its type's `QueryValue` implementation. Field types must implement
/// `querylink::QueryValue`.
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `rename_all = "PascalCase"` | `created_at` is queried as `CreatedAt` |
/// | `rename_all = "camelCase"` | `created_at` is queried as `createdAt` |
/// | `rename_all = "snake_case"` | field names are used as written |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom name for queries |
///
/// # Generated Code
///
/// The macro generates:
///
/// 1. Field name constants named after the Rust field (e.g. `Task::CREATED_AT`)
///    holding the query name
/// 2. Implementation of `Queryable::field()` and `Queryable::field_names()`
///
/// # Example
///
/// ```ignore
/// use querylink::{apply, Definitions};
/// use querylink_macros::Queryable;
///
/// #[derive(Queryable)]
/// #[query(rename_all = "PascalCase")]
/// struct Task {
///     title: String,
///     priority: u8,
///     done: bool,
///     tags: Vec<String>,
///
///     #[query(skip)]
///     internal_id: u64,
/// }
///
/// let tasks = vec![
///     Task { title: "Write docs".into(), priority: 3, done: false, tags: vec![], internal_id: 1 },
///     Task { title: "Fix bug".into(), priority: 5, done: true, tags: vec![], internal_id: 2 },
/// ];
///
/// let defs = Definitions::new()
///     .gte(Task::PRIORITY, 3)
///     .neq(Task::DONE, true);
///
/// let results = apply(&tasks, &defs, None)?;
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].title, "Write docs");
/// ```
#[proc_macro_derive(Queryable, attributes(query))]
pub fn queryable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::queryable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
