use crate::{
    collection::Collection,
    database::render::SelectQuery,
    error::Result,
    manager::Manager,
    query::{annotate::Annotator, expression::CaseExpr, filtering::Predicate},
};
use annotatable_model::{DynamicRecord, Value};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{
    Column, PgPool, Row, TypeInfo, ValueRef, postgres::PgRow, types::BigDecimal,
};
use tracing::{debug, trace};
use uuid::Uuid;

/// Query over one Postgres table.
#[derive(Clone, Debug)]
pub struct PgCollection {
    pool: PgPool,
    query: SelectQuery,
}

impl PgCollection {
    /// Collection over `table`, identified by the `id` column.
    pub fn new(pool: PgPool, table: &str) -> Result<Self> {
        Ok(Self {
            pool,
            query: SelectQuery::new(table)?,
        })
    }

    pub fn with_pk_column(mut self, column: &str) -> Result<Self> {
        self.query = self.query.with_pk_column(column)?;
        Ok(self)
    }

    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    /// SQL text with placeholders, as it will be sent to the server.
    pub fn sql(&self) -> Result<String> {
        Ok(self.query.to_builder()?.sql().to_string())
    }

    fn with_query(&self, query: SelectQuery) -> Self {
        Self {
            pool: self.pool.clone(),
            query,
        }
    }
}

#[async_trait]
impl Collection for PgCollection {
    type Record = DynamicRecord;

    async fn materialize(&self) -> Result<Vec<DynamicRecord>> {
        let mut builder = self.query.to_builder()?;
        trace!("Executing: {}", builder.sql());

        let rows = builder.build().fetch_all(&self.pool).await?;
        debug!(
            "Materialized {} rows from {}",
            rows.len(),
            self.query.table()
        );

        rows.iter()
            .map(|row| decode_row(row, self.query.pk_column()))
            .collect()
    }

    fn with_computed_field(&self, name: &str, expr: CaseExpr) -> Result<Self> {
        Ok(self.with_query(self.query.clone().with_computed_field(name, expr)?))
    }

    fn order_by(&self, field: &str) -> Result<Self> {
        Ok(self.with_query(self.query.clone().order_by(field)?))
    }

    fn filter(&self, predicate: Predicate) -> Result<Self> {
        Ok(self.with_query(self.query.clone().filter(predicate)?))
    }
}

/// Decode a row by column type. Columns of unsupported types are skipped.
fn decode_row(row: &PgRow, pk_column: &str) -> Result<DynamicRecord> {
    let mut record = DynamicRecord::new(pk_column);

    for (i, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(i)?.is_null() {
            record.insert(column.name(), Value::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "BOOL" => Value::Bool(row.try_get(i)?),
            "INT2" => Value::from(row.try_get::<i16, _>(i)?),
            "INT4" => Value::from(row.try_get::<i32, _>(i)?),
            "INT8" => Value::Int(row.try_get(i)?),
            "FLOAT4" => Value::from(row.try_get::<f32, _>(i)?),
            "FLOAT8" => Value::from(row.try_get::<f64, _>(i)?),
            "NUMERIC" => {
                let decimal: BigDecimal = row.try_get(i)?;
                match decimal.to_string().parse::<f64>() {
                    Ok(value) => Value::from(value),
                    Err(_) => {
                        debug!(
                            "Skipping column {}: {} out of f64 range",
                            column.name(),
                            decimal
                        );
                        continue;
                    }
                }
            }
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::Text(row.try_get(i)?),
            "UUID" => Value::Uuid(row.try_get::<Uuid, _>(i)?),
            "TIMESTAMPTZ" => Value::Timestamp(row.try_get::<DateTime<Utc>, _>(i)?),
            "TIMESTAMP" => {
                Value::Timestamp(row.try_get::<NaiveDateTime, _>(i)?.and_utc())
            }
            other => {
                debug!(
                    "Skipping column {} of unsupported type {}",
                    column.name(),
                    other
                );
                continue;
            }
        };
        record.insert(column.name(), value);
    }

    Ok(record)
}

/// "All rows of a table" entry point.
#[derive(Clone, Debug)]
pub struct PgManager {
    collection: PgCollection,
    annotator: Annotator,
}

impl PgManager {
    pub fn new(pool: PgPool, table: &str) -> Result<Self> {
        Ok(Self {
            collection: PgCollection::new(pool, table)?,
            annotator: Annotator::default(),
        })
    }

    pub fn with_pk_column(mut self, column: &str) -> Result<Self> {
        self.collection = self.collection.with_pk_column(column)?;
        Ok(self)
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }
}

impl Manager for PgManager {
    type Collection = PgCollection;

    fn all(&self) -> PgCollection {
        self.collection.clone()
    }

    fn annotator(&self) -> Annotator {
        self.annotator.clone()
    }
}
