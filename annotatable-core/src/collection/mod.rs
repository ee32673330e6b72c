//! Queryable collection capability.
//!
//! Anything that can materialize records, attach an identity-keyed computed
//! field, filter, and order by a named field can be sorted and annotated.
//! Builders never mutate the receiver; each returns a new collection.

pub mod memory;

use crate::error::{AnnotateError, Result};
use crate::query::{expression::CaseExpr, filtering::Predicate};
use annotatable_model::Record;
use async_trait::async_trait;

pub use memory::{MemoryCollection, MemoryStore, Row};

#[async_trait]
pub trait Collection: Clone + Send + Sync + Sized {
    /// Materialized item type. Computed fields are readable through
    /// [`Record::get`].
    type Record: Record + Send + Sync + 'static;

    /// Execute the query and load every matching record.
    async fn materialize(&self) -> Result<Vec<Self::Record>>;

    /// Attach (or replace) a computed field evaluated per row by identifier.
    fn with_computed_field(&self, name: &str, expr: CaseExpr) -> Result<Self>;

    /// Order ascending by a stored or computed field, replacing any previous
    /// ordering.
    fn order_by(&self, field: &str) -> Result<Self>;

    fn filter(&self, predicate: Predicate) -> Result<Self>;
}

/// Accept a field, column or table name for use as a quoted identifier.
pub fn validate_identifier(name: &str) -> Result<&str> {
    if name.is_empty() || name.contains('"') || name.contains('\0') {
        return Err(AnnotateError::InvalidIdentifier(name.to_string()));
    }
    Ok(name)
}
