//! Key and annotation specifiers.
//!
//! Callers describe what to compute per record either by naming an attribute,
//! by naming several attributes (compared lexicographically), or by passing a
//! closure. The specifier is normalized once into a [`KeyFn`] before any record
//! is touched.

use crate::error::{AnnotateError, Result};
use annotatable_model::{Record, Value};
use std::fmt;
use std::sync::Arc;

/// Normalized per-record key extraction.
pub type KeyFn<R> = Arc<dyn Fn(&R) -> Result<Value> + Send + Sync>;

/// Resolve a named attribute or fail with [`AnnotateError::AttributeNotFound`].
pub fn resolve_attribute<R: Record>(record: &R, name: &str) -> Result<Value> {
    record
        .get(name)
        .ok_or_else(|| AnnotateError::AttributeNotFound {
            attribute: name.to_string(),
            pk: record.pk(),
        })
}

/// Sort key: an attribute, a tuple of attributes, or a callable.
pub enum KeySpec<R> {
    Attribute(String),
    Attributes(Vec<String>),
    Callable(KeyFn<R>),
}

impl<R: Record + 'static> KeySpec<R> {
    /// Wrap an infallible closure.
    pub fn func<F, V>(f: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        KeySpec::Callable(Arc::new(move |record: &R| -> Result<Value> {
            Ok(f(record).into())
        }))
    }

    /// Wrap a closure that may fail, e.g. while converting attributes.
    pub fn try_func<F>(f: F) -> Self
    where
        F: Fn(&R) -> Result<Value> + Send + Sync + 'static,
    {
        KeySpec::Callable(Arc::new(f))
    }

    pub fn attributes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySpec::Attributes(names.into_iter().map(Into::into).collect())
    }

    pub fn into_key_fn(self) -> KeyFn<R> {
        match self {
            KeySpec::Attribute(name) => {
                Arc::new(move |record: &R| resolve_attribute(record, &name))
            }
            KeySpec::Attributes(names) => Arc::new(move |record: &R| {
                names
                    .iter()
                    .map(|name| resolve_attribute(record, name))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }),
            KeySpec::Callable(f) => f,
        }
    }
}

impl<R> fmt::Debug for KeySpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            KeySpec::Attributes(names) => {
                f.debug_tuple("Attributes").field(names).finish()
            }
            KeySpec::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl<R> From<&str> for KeySpec<R> {
    fn from(name: &str) -> Self {
        KeySpec::Attribute(name.to_string())
    }
}

impl<R> From<String> for KeySpec<R> {
    fn from(name: String) -> Self {
        KeySpec::Attribute(name)
    }
}

impl<R> From<Vec<String>> for KeySpec<R> {
    fn from(names: Vec<String>) -> Self {
        KeySpec::Attributes(names)
    }
}

impl<R> From<Vec<&str>> for KeySpec<R> {
    fn from(names: Vec<&str>) -> Self {
        KeySpec::Attributes(names.into_iter().map(str::to_string).collect())
    }
}

impl<R, const N: usize> From<[&str; N]> for KeySpec<R> {
    fn from(names: [&str; N]) -> Self {
        KeySpec::Attributes(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<R> From<(&str, &str)> for KeySpec<R> {
    fn from((first, second): (&str, &str)) -> Self {
        KeySpec::Attributes(vec![first.to_string(), second.to_string()])
    }
}

/// What to annotate: an attribute or a callable.
pub enum Annotation<R> {
    Attribute(String),
    Callable(KeyFn<R>),
}

impl<R: Record + 'static> Annotation<R> {
    pub fn func<F, V>(f: F) -> Self
    where
        F: Fn(&R) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Annotation::Callable(Arc::new(move |record: &R| -> Result<Value> {
            Ok(f(record).into())
        }))
    }

    pub fn try_func<F>(f: F) -> Self
    where
        F: Fn(&R) -> Result<Value> + Send + Sync + 'static,
    {
        Annotation::Callable(Arc::new(f))
    }

    pub fn into_key_fn(self) -> KeyFn<R> {
        match self {
            Annotation::Attribute(name) => {
                Arc::new(move |record: &R| resolve_attribute(record, &name))
            }
            Annotation::Callable(f) => f,
        }
    }
}

impl<R> Annotation<R> {
    /// Output field name: the explicit one, or `<attribute><suffix>` for
    /// attribute annotations. Callables have nothing to infer from.
    pub fn output_name(&self, explicit: Option<&str>, suffix: &str) -> Result<String> {
        match (explicit, self) {
            (Some(name), _) => Ok(name.to_string()),
            (None, Annotation::Attribute(attribute)) => {
                Ok(format!("{attribute}{suffix}"))
            }
            (None, Annotation::Callable(_)) => Err(AnnotateError::MissingPropertyName),
        }
    }
}

impl<R> fmt::Debug for Annotation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
            Annotation::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl<R> From<&str> for Annotation<R> {
    fn from(name: &str) -> Self {
        Annotation::Attribute(name.to_string())
    }
}

impl<R> From<String> for Annotation<R> {
    fn from(name: String) -> Self {
        Annotation::Attribute(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use annotatable_model::DynamicRecord;

    fn record() -> DynamicRecord {
        DynamicRecord::new("id")
            .with("id", 1)
            .with("name", "apple")
            .with("cost", 10)
    }

    #[test]
    fn test_attribute_key_resolves() {
        let key = KeySpec::<DynamicRecord>::from("name").into_key_fn();
        assert_eq!(key(&record()).unwrap(), Value::from("apple"));
    }

    #[test]
    fn test_attribute_tuple_builds_tuple_value() {
        let key = KeySpec::<DynamicRecord>::from(("name", "cost")).into_key_fn();
        assert_eq!(key(&record()).unwrap(), Value::from(("apple", 10)));
    }

    #[test]
    fn test_missing_attribute_reports_pk() {
        let key = KeySpec::<DynamicRecord>::from("price").into_key_fn();
        match key(&record()) {
            Err(AnnotateError::AttributeNotFound { attribute, pk }) => {
                assert_eq!(attribute, "price");
                assert_eq!(pk, Value::Int(1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_callable_key() {
        let key = KeySpec::func(|r: &DynamicRecord| {
            r.get("cost").and_then(|v| v.as_i64()).unwrap_or(0) * 2
        })
        .into_key_fn();
        assert_eq!(key(&record()).unwrap(), Value::Int(20));
    }

    #[test]
    fn test_try_callable_propagates_model_errors() {
        let key = KeySpec::try_func(|r: &DynamicRecord| {
            let name: i64 = r.get_as("name")?;
            Ok(Value::Int(name))
        })
        .into_key_fn();
        assert!(matches!(key(&record()), Err(AnnotateError::Model(_))));
    }

    #[test]
    fn test_output_name_inference() {
        let by_name = Annotation::<DynamicRecord>::from("name");
        assert_eq!(by_name.output_name(None, "_property").unwrap(), "name_property");
        assert_eq!(by_name.output_name(Some("label"), "_property").unwrap(), "label");

        let callable = Annotation::func(|_: &DynamicRecord| 1);
        assert!(matches!(
            callable.output_name(None, "_property"),
            Err(AnnotateError::MissingPropertyName)
        ));
        assert_eq!(callable.output_name(Some("one"), "_property").unwrap(), "one");
    }
}
