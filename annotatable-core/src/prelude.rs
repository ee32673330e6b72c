//! Everything needed to sort and annotate a collection.

pub use crate::collection::{Collection, MemoryCollection, MemoryStore, Row};
pub use crate::config::AnnotateConfig;
#[cfg(feature = "postgres")]
pub use crate::database::{PgCollection, PgManager};
pub use crate::error::{AnnotateError, Result};
pub use crate::manager::Manager;
pub use crate::query::{
    AnnotatableExt, Annotation, Annotator, CaseExpr, KeySpec, Lookup, Predicate,
};
pub use annotatable_model::{DynamicRecord, Record, Value};
