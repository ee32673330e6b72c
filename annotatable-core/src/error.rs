use annotatable_model::{ModelError, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error(
        "property name cannot be inferred: pass one explicitly when the annotation is not an attribute name"
    )]
    MissingPropertyName,

    #[error("record {pk} has no attribute '{attribute}'")]
    AttributeNotFound { attribute: String, pk: Value },

    #[error(
        "value computed for '{field}' on record {pk} cannot be bound as a SQL parameter"
    )]
    UnrepresentableValue { field: String, pk: Value },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("expression has {count} branches, limit is {limit}")]
    TooManyBranches { count: usize, limit: usize },

    #[error("query needs {count} bind parameters, limit is {limit}")]
    TooManyParameters { count: usize, limit: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AnnotateError>;
