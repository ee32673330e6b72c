//! Postgres-backed collections.

pub mod postgres;
pub mod render;

pub use postgres::{PgCollection, PgManager};
pub use render::SelectQuery;
