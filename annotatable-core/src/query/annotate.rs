//! Sort-by-key and annotate-property operations.
//!
//! Both operations materialize the input collection once, compute a value per
//! record in memory, then push the result back into the query as a computed
//! field keyed on the record identifier. The returned collection is a new,
//! still-chainable query; the input is never modified.

use crate::{
    collection::Collection,
    config::AnnotateConfig,
    error::Result,
    query::{
        complexity_guard::ExpressionGuard,
        expression::CaseExpr,
        key::{Annotation, KeySpec},
    },
};
use annotatable_model::{Record, Value};
use async_trait::async_trait;
use tracing::debug;

/// Runs sort and annotate with a given configuration.
#[derive(Debug, Clone)]
pub struct Annotator {
    config: AnnotateConfig,
    guard: ExpressionGuard,
}

impl Annotator {
    pub fn new(config: AnnotateConfig) -> Self {
        let guard = ExpressionGuard::from_config(&config);
        Self { config, guard }
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    /// Return a collection ordered the way a stable in-memory sort by `key`
    /// would order it.
    ///
    /// The rank of every record is exposed as the computed field named by
    /// [`AnnotateConfig::sort_field`]. With `reverse`, records are ranked
    /// descending while records with equal keys keep their input order.
    pub async fn sort<C, K>(&self, collection: &C, key: K, reverse: bool) -> Result<C>
    where
        C: Collection,
        K: Into<KeySpec<C::Record>>,
    {
        let key_fn = key.into().into_key_fn();
        let records = collection.materialize().await?;

        if records.is_empty() {
            debug!("Sort skipped: collection is empty");
            return Ok(collection.clone());
        }

        // Extract keys once
        let mut keyed = records
            .iter()
            .enumerate()
            .map(|(i, record)| -> Result<(usize, Value)> { Ok((i, key_fn(record)?)) })
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by(|a, b| {
            if reverse {
                b.1.cmp(&a.1)
            } else {
                a.1.cmp(&b.1)
            }
        });

        let expr = CaseExpr::ranks(keyed.iter().map(|(i, _)| records[*i].pk()));
        let field = self.config.sort_field.as_str();
        self.guard.check(field, &expr)?;

        debug!(
            "Sorted {} records into '{}' (reverse={})",
            records.len(),
            field,
            reverse
        );

        collection.with_computed_field(field, expr)?.order_by(field)
    }

    /// Return a collection carrying `annotation` evaluated per record as a
    /// computed field, without changing its ordering.
    ///
    /// `name` defaults to `<attribute><property_suffix>` for attribute
    /// annotations and is required for callables. The name is resolved
    /// before anything is materialized.
    pub async fn annotate_property<C, A>(
        &self,
        collection: &C,
        annotation: A,
        name: Option<&str>,
    ) -> Result<C>
    where
        C: Collection,
        A: Into<Annotation<C::Record>>,
    {
        let annotation = annotation.into();
        let field = annotation.output_name(name, &self.config.property_suffix)?;
        let key_fn = annotation.into_key_fn();

        let records = collection.materialize().await?;
        let pairs = records
            .iter()
            .map(|record| -> Result<(Value, Value)> { Ok((record.pk(), key_fn(record)?)) })
            .collect::<Result<Vec<_>>>()?;

        let expr = CaseExpr::from_pairs(pairs);
        if expr.is_empty() {
            debug!("Annotating '{}' on an empty collection; field is NULL", field);
        }
        self.guard.check(&field, &expr)?;

        debug!(
            "Annotated '{}' on {} records ({} branches)",
            field,
            records.len(),
            expr.len()
        );

        collection.with_computed_field(&field, expr)
    }
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(AnnotateConfig::default())
    }
}

/// Sort and annotate directly on any [`Collection`] with the default
/// configuration.
#[async_trait]
pub trait AnnotatableExt: Collection {
    async fn sort<K>(&self, key: K, reverse: bool) -> Result<Self>
    where
        K: Into<KeySpec<Self::Record>> + Send;

    async fn annotate_property<A>(&self, annotation: A, name: Option<&str>) -> Result<Self>
    where
        A: Into<Annotation<Self::Record>> + Send;
}

#[async_trait]
impl<C: Collection> AnnotatableExt for C {
    async fn sort<K>(&self, key: K, reverse: bool) -> Result<Self>
    where
        K: Into<KeySpec<Self::Record>> + Send,
    {
        Annotator::default().sort(self, key, reverse).await
    }

    async fn annotate_property<A>(&self, annotation: A, name: Option<&str>) -> Result<Self>
    where
        A: Into<Annotation<Self::Record>> + Send,
    {
        Annotator::default()
            .annotate_property(self, annotation, name)
            .await
    }
}
