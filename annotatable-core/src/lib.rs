//! # Annotatable Core
//!
//! Key-function sorting and computed property annotation for queryable
//! record collections.
//!
//! ## Overview
//!
//! A collection is a lazy, chainable query over records of one kind. This
//! crate adds two operations on top of it:
//!
//! - **Sort by key**: order a collection by an attribute, a tuple of
//!   attributes, or an arbitrary closure. The order is computed in memory and
//!   pushed back into the query as a rank field, so the result can still be
//!   filtered.
//! - **Annotate property**: attach the per-record result of a closure (or a
//!   copied attribute) as a named computed field.
//!
//! Both work against the [`Collection`] capability trait, implemented here
//! for in-memory data ([`MemoryCollection`]) and Postgres tables
//! ([`database::PgCollection`]).
//!
//! ## Feature Flags
//!
//! - `postgres` (default): Postgres backend via SQLx
//!
//! ## Examples
//!
//! ```no_run
//! use annotatable_core::prelude::*;
//!
//! async fn cheapest_first() -> Result<()> {
//!     let store = MemoryStore::new(vec![
//!         DynamicRecord::new("id").with("id", 1).with("cost", 10).with("price", 5),
//!         DynamicRecord::new("id").with("id", 2).with("cost", 9).with("price", 3),
//!     ]);
//!
//!     let ratio = Annotation::try_func(|row: &Row<DynamicRecord>| {
//!         Ok(Value::from(row.get_as::<f64>("cost")? / row.get_as::<f64>("price")?))
//!     });
//!     let annotated = store.annotate_property(ratio, Some("ratio")).await?;
//!     let sorted = annotated.sort("ratio", false).await?;
//!
//!     for row in sorted.filter(Predicate::gt("ratio", 2.5))?.materialize().await? {
//!         println!("{} -> {:?}", row.pk(), row.get("ratio"));
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Queryable collection capability and the in-memory backend
pub mod collection;
/// Sort/annotate settings loaded from TOML
pub mod config;
/// Postgres backend
#[cfg(feature = "postgres")]
#[cfg_attr(docsrs, doc(cfg(feature = "postgres")))]
pub mod database;
pub mod error;
/// Whole-kind entry points
pub mod manager;
pub mod prelude;
/// Key specifiers, expressions, predicates and the sort/annotate operations
pub mod query;

pub use annotatable_model::{DynamicRecord, ModelError, Record, Value};
pub use collection::{Collection, MemoryCollection, MemoryStore, Row};
pub use config::AnnotateConfig;
pub use error::{AnnotateError, Result};
pub use manager::Manager;
pub use query::{AnnotatableExt, Annotation, Annotator, KeySpec};
