//! Attribute parsing for the Queryable derive macro.
//!
//! This module provides parsers for the `#[query(...)]` attributes used by
//! the `Queryable` derive macro, on the struct and on its fields.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, LitStr, Meta, Result, Token,
};

/// Naming convention applied to every field by `rename_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// `created_at` → `CreatedAt`
    PascalCase,
    /// `created_at` → `createdAt`
    CamelCase,
    /// `created_at` → `created_at`
    SnakeCase,
}

impl RenameRule {
    /// Parse a rename rule from its string form.
    pub fn from_str(s: &str, span: Span) -> Result<Self> {
        match s {
            "PascalCase" => Ok(RenameRule::PascalCase),
            "camelCase" => Ok(RenameRule::CamelCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            other => Err(Error::new(
                span,
                format!(
                    "unknown rename rule: '{}'. Expected one of: PascalCase, camelCase, snake_case",
                    other
                ),
            )),
        }
    }

    /// Applies the rule to a snake_case field name.
    pub fn apply(self, field: &str) -> String {
        match self {
            RenameRule::SnakeCase => field.to_string(),
            RenameRule::PascalCase => field
                .split('_')
                .filter(|part| !part.is_empty())
                .map(capitalize)
                .collect(),
            RenameRule::CamelCase => {
                let pascal = RenameRule::PascalCase.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_lowercase().chain(chars).collect(),
                    None => pascal,
                }
            }
        }
    }
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Struct-level attributes from `#[query(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ContainerAttr {
    /// Naming convention for all fields.
    pub rename_all: Option<RenameRule>,
}

impl Parse for ContainerAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = ContainerAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                    let s = string_value(&nv.value, "rename_all")?;
                    attr.rename_all = Some(RenameRule::from_str(&s.value(), s.span())?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected: rename_all = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Field-level attributes from `#[query(...)]`.
#[derive(Debug, Clone)]
pub struct FieldAttr {
    /// Leave this field out of the registry.
    pub skip: bool,
    /// Custom field name for queries (default: field name).
    pub rename: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for FieldAttr {
    fn default() -> Self {
        FieldAttr {
            skip: false,
            rename: None,
            span: Span::call_site(),
        }
    }
}

impl Parse for FieldAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => {
                    attr.skip = true;
                }

                // rename = "custom_name"
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let s = string_value(&nv.value, "rename")?;
                    attr.rename = Some(s.value());
                    attr.span = s.span();
                }

                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown query attribute. Expected: skip or rename = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

fn string_value<'a>(expr: &'a syn::Expr, name: &str) -> Result<&'a LitStr> {
    match expr {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s),
        other => Err(Error::new(
            other.span(),
            format!("{} must be a string literal", name),
        )),
    }
}

/// Extract `#[query(...)]` attributes from a struct's attributes.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<ContainerAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<ContainerAttr>();
        }
    }
    Ok(ContainerAttr::default())
}

/// Extract `#[query(...)]` attributes from a field's attributes.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<FieldAttr> {
    for attr in attrs {
        if attr.path().is_ident("query") {
            return attr.parse_args::<FieldAttr>();
        }
    }
    Ok(FieldAttr::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_field(tokens: &str) -> Result<FieldAttr> {
        syn::parse_str::<FieldAttr>(tokens)
    }

    fn parse_container(tokens: &str) -> Result<ContainerAttr> {
        syn::parse_str::<ContainerAttr>(tokens)
    }

    #[test]
    fn test_field_skip() {
        let attr = parse_field("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn test_field_rename() {
        let attr = parse_field(r#"rename = "CreatedOn""#).unwrap();
        assert!(!attr.skip);
        assert_eq!(attr.rename, Some("CreatedOn".to_string()));
    }

    #[test]
    fn test_field_empty() {
        let attr = parse_field("").unwrap();
        assert!(!attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn test_field_rename_requires_string() {
        let result = parse_field("rename = 5");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("rename must be a string literal"));
    }

    #[test]
    fn test_field_unknown_attribute() {
        let result = parse_field("String");
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown query attribute"));
    }

    #[test]
    fn test_container_rename_all() {
        let attr = parse_container(r#"rename_all = "PascalCase""#).unwrap();
        assert_eq!(attr.rename_all, Some(RenameRule::PascalCase));

        let attr = parse_container(r#"rename_all = "camelCase""#).unwrap();
        assert_eq!(attr.rename_all, Some(RenameRule::CamelCase));
    }

    #[test]
    fn test_container_unknown_rule() {
        let result = parse_container(r#"rename_all = "kebab-case""#);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("unknown rename rule"));
    }

    #[test]
    fn test_container_rejects_field_attributes() {
        assert!(parse_container("skip").is_err());
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::PascalCase.apply("created_at"), "CreatedAt");
        assert_eq!(RenameRule::PascalCase.apply("id"), "Id");
        assert_eq!(RenameRule::CamelCase.apply("created_at"), "createdAt");
        assert_eq!(RenameRule::CamelCase.apply("name"), "name");
        assert_eq!(RenameRule::SnakeCase.apply("created_at"), "created_at");
    }
}
