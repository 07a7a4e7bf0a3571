//! Implementation of the `#[derive(Queryable)]` macro.
//!
//! This module provides derive macro support for QueryLink, generating the
//! field registry and field name constants from struct annotations.

mod attrs;
mod derive;

pub use derive::queryable_derive_impl;
