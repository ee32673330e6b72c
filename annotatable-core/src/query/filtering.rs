//! Field predicates shared by every collection backend.
//!
//! Predicates may reference stored attributes and computed fields alike.
//! Comparisons involving `NULL` are false, mirroring SQL, except for
//! [`Lookup::IsNull`].

use crate::error::Result;
use crate::query::key::resolve_attribute;
use annotatable_model::{Record, Value};

/// Comparison applied between a field and a predicate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    NotEqual,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match on text fields.
    IContains,
    /// The predicate value is a boolean: `true` keeps NULL fields.
    IsNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    lookup: Lookup,
    value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<String>, lookup: Lookup, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            lookup,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Exact, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::NotEqual, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Lookup::Lte, value)
    }

    pub fn icontains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, Lookup::IContains, Value::Text(needle.into()))
    }

    pub fn is_null(field: impl Into<String>, is_null: bool) -> Self {
        Self::new(field, Lookup::IsNull, is_null)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Evaluate against a materialized record. Unknown fields are an error,
    /// as they would be for a database column.
    pub fn matches<R: Record>(&self, record: &R) -> Result<bool> {
        let actual = resolve_attribute(record, &self.field)?;
        Ok(self.test(&actual))
    }

    fn test(&self, actual: &Value) -> bool {
        let expected = &self.value;
        match self.lookup {
            Lookup::IsNull => actual.is_null() == expected.as_bool().unwrap_or(true),
            _ if actual.is_null() || expected.is_null() => false,
            Lookup::IContains => match (actual.as_str(), expected.as_str()) {
                (Some(haystack), Some(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
            _ if !actual.same_family(expected) => false,
            Lookup::Exact => actual == expected,
            Lookup::NotEqual => actual != expected,
            Lookup::Gt => actual > expected,
            Lookup::Gte => actual >= expected,
            Lookup::Lt => actual < expected,
            Lookup::Lte => actual <= expected,
        }
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
pub fn escape_like_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            other => out.push(other),
        }
    }
    out
}
