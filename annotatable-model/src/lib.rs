//! Core data model shared by the annotatable collection crates.
//!
//! A [`Record`] is any persisted entity exposing an identifier and named
//! attributes; a [`Value`] is what key functions compute from it.
#![allow(missing_docs)]

pub mod error;
pub mod record;
pub mod value;

pub use error::{ModelError, Result as ModelResult};
pub use record::{DynamicRecord, PK_ATTRIBUTE, Record};
pub use value::Value;
