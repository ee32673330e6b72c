//! In-memory collection backend.
//!
//! Holds a shared snapshot of records and replays computed fields, predicates
//! and ordering on every materialization, the way a database would evaluate
//! the equivalent query.

use super::{Collection, validate_identifier};
use crate::error::Result;
use crate::manager::Manager;
use crate::query::{
    annotate::Annotator, expression::CaseExpr, filtering::Predicate,
    key::resolve_attribute,
};
use annotatable_model::{Record, Value};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use tracing::trace;

/// A materialized record plus the computed fields of its collection.
///
/// Computed values shadow stored attributes of the same name. Derefs to the
/// underlying record so key closures can read typed fields directly.
#[derive(Debug)]
pub struct Row<R> {
    record: Arc<R>,
    computed: BTreeMap<String, Value>,
}

impl<R> Row<R> {
    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn computed(&self) -> &BTreeMap<String, Value> {
        &self.computed
    }
}

impl<R> Clone for Row<R> {
    fn clone(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
            computed: self.computed.clone(),
        }
    }
}

impl<R> Deref for Row<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}

impl<R: Record> Record for Row<R> {
    fn pk(&self) -> Value {
        self.record.pk()
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.computed
            .get(name)
            .cloned()
            .or_else(|| self.record.attribute(name))
    }
}

#[derive(Debug)]
pub struct MemoryCollection<R> {
    records: Arc<[Arc<R>]>,
    computed: Vec<(String, Arc<CaseExpr>)>,
    filters: Vec<Predicate>,
    ordering: Option<String>,
}

impl<R> MemoryCollection<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        Self::from_shared(records.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(records: Arc<[Arc<R>]>) -> Self {
        Self {
            records,
            computed: Vec::new(),
            filters: Vec::new(),
            ordering: None,
        }
    }

    /// Field currently used for ordering, if any.
    pub fn ordering(&self) -> Option<&str> {
        self.ordering.as_deref()
    }

    pub fn computed_fields(&self) -> impl Iterator<Item = &str> {
        self.computed.iter().map(|(name, _)| name.as_str())
    }
}

impl<R: Record> MemoryCollection<R> {
    fn row(&self, record: &Arc<R>) -> Row<R> {
        let pk = record.pk();
        let computed = self
            .computed
            .iter()
            .map(|(name, expr)| (name.clone(), expr.evaluate(&pk)))
            .collect();

        Row {
            record: Arc::clone(record),
            computed,
        }
    }

    fn keep(&self, row: &Row<R>) -> Result<bool> {
        for predicate in &self.filters {
            if !predicate.matches(row)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<R> Clone for MemoryCollection<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            computed: self.computed.clone(),
            filters: self.filters.clone(),
            ordering: self.ordering.clone(),
        }
    }
}

#[async_trait]
impl<R> Collection for MemoryCollection<R>
where
    R: Record + Send + Sync + 'static,
{
    type Record = Row<R>;

    async fn materialize(&self) -> Result<Vec<Row<R>>> {
        let mut rows = Vec::with_capacity(self.records.len());
        for record in self.records.iter() {
            let row = self.row(record);
            if self.keep(&row)? {
                rows.push(row);
            }
        }

        if let Some(field) = &self.ordering {
            let mut keyed = rows
                .into_iter()
                .map(|row| -> Result<(Value, Row<R>)> {
                    Ok((resolve_attribute(&row, field)?, row))
                })
                .collect::<Result<Vec<_>>>()?;
            // Stable; NULL keys land last like Postgres ASC.
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            rows = keyed.into_iter().map(|(_, row)| row).collect();
        }

        trace!(
            "Materialized {} of {} records (computed={}, filters={})",
            rows.len(),
            self.records.len(),
            self.computed.len(),
            self.filters.len()
        );
        Ok(rows)
    }

    fn with_computed_field(&self, name: &str, expr: CaseExpr) -> Result<Self> {
        let name = validate_identifier(name)?;
        let mut next = self.clone();
        next.computed.retain(|(existing, _)| existing != name);
        next.computed.push((name.to_string(), Arc::new(expr)));
        Ok(next)
    }

    fn order_by(&self, field: &str) -> Result<Self> {
        let field = validate_identifier(field)?;
        let mut next = self.clone();
        next.ordering = Some(field.to_string());
        Ok(next)
    }

    fn filter(&self, predicate: Predicate) -> Result<Self> {
        validate_identifier(predicate.field())?;
        let mut next = self.clone();
        next.filters.push(predicate);
        Ok(next)
    }
}

/// "All records of a kind" entry point for in-memory data.
#[derive(Debug)]
pub struct MemoryStore<R> {
    records: Arc<[Arc<R>]>,
    annotator: Annotator,
}

impl<R> MemoryStore<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
            annotator: Annotator::default(),
        }
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }
}

impl<R> Clone for MemoryStore<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            annotator: self.annotator.clone(),
        }
    }
}

impl<R> Manager for MemoryStore<R>
where
    R: Record + Send + Sync + 'static,
{
    type Collection = MemoryCollection<R>;

    fn all(&self) -> MemoryCollection<R> {
        MemoryCollection::from_shared(Arc::clone(&self.records))
    }

    fn annotator(&self) -> Annotator {
        self.annotator.clone()
    }
}
