use std::fmt::{self, Display};

use crate::value::Value;

/// Errors produced by value conversions and record accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    MissingAttribute(String),
}

impl ModelError {
    pub(crate) fn mismatch(expected: &'static str, found: &Value) -> Self {
        ModelError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            ModelError::MissingAttribute(name) => {
                write!(f, "missing attribute: {name}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
