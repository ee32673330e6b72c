//! Read-only view of a persisted record.

use crate::error::{ModelError, Result};
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Attribute name that always resolves to the record identifier.
pub const PK_ATTRIBUTE: &str = "pk";

/// A persisted entity with a unique identifier and named attributes.
///
/// Implementations only expose data; nothing in this workspace mutates or
/// saves a record.
pub trait Record {
    /// Unique identifier used to key per-row expression branches.
    fn pk(&self) -> Value;

    /// Look up a named attribute. `None` means the attribute does not exist,
    /// as opposed to `Some(Value::Null)` for an existing empty attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Resolve an attribute, treating [`PK_ATTRIBUTE`] as the identifier.
    fn get(&self, name: &str) -> Option<Value> {
        if name == PK_ATTRIBUTE {
            Some(self.pk())
        } else {
            self.attribute(name)
        }
    }

    /// Resolve and convert an attribute.
    fn get_as<T>(&self, name: &str) -> Result<T>
    where
        Self: Sized,
        T: TryFrom<Value, Error = ModelError>,
    {
        let value = self
            .get(name)
            .ok_or_else(|| ModelError::MissingAttribute(name.to_string()))?;
        T::try_from(value)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn pk(&self) -> Value {
        (**self).pk()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn pk(&self) -> Value {
        (**self).pk()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn pk(&self) -> Value {
        (**self).pk()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        (**self).attribute(name)
    }
}

/// Column-map record whose identifier lives in one of its fields.
///
/// Database rows decode into this type; it is also handy for fixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    pk_field: String,
    fields: BTreeMap<String, Value>,
}

impl DynamicRecord {
    pub fn new(pk_field: impl Into<String>) -> Self {
        Self {
            pk_field: pk_field.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn pk_field(&self) -> &str {
        &self.pk_field
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

impl Record for DynamicRecord {
    fn pk(&self) -> Value {
        self.fields
            .get(&self.pk_field)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}
