//! SQL rendering for Postgres-backed collections.
//!
//! Identifiers are validated and double-quoted; every value, including each
//! `CASE` branch identifier and result, is a bound parameter.

use crate::{
    collection::validate_identifier,
    error::{AnnotateError, Result},
    query::{
        expression::CaseExpr,
        filtering::{Lookup, Predicate, escape_like_literal},
    },
};
use annotatable_model::Value;
use sqlx::{Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::warn;

/// Default identifier column.
pub const DEFAULT_PK_COLUMN: &str = "id";

/// Postgres rejects statements with more bind parameters than this.
pub const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;

/// Double-quote a validated identifier.
pub fn quote_identifier(name: &str) -> Result<String> {
    Ok(format!("\"{}\"", validate_identifier(name)?))
}

/// Quote a table name, keeping an optional `schema.` prefix.
pub fn quote_table(name: &str) -> Result<String> {
    match name.split_once('.') {
        Some((schema, table)) => Ok(format!(
            "{}.{}",
            quote_identifier(schema)?,
            quote_identifier(table)?
        )),
        None => quote_identifier(name),
    }
}

/// Structured `SELECT` over one table with computed fields, predicates and an
/// ordering.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    pk_column: String,
    computed: Vec<(String, Arc<CaseExpr>)>,
    filters: Vec<Predicate>,
    ordering: Option<String>,
}

impl SelectQuery {
    pub fn new(table: &str) -> Result<Self> {
        quote_table(table)?;
        Ok(Self {
            table: table.to_string(),
            pk_column: DEFAULT_PK_COLUMN.to_string(),
            computed: Vec::new(),
            filters: Vec::new(),
            ordering: None,
        })
    }

    pub fn with_pk_column(mut self, column: &str) -> Result<Self> {
        self.pk_column = validate_identifier(column)?.to_string();
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pk_column(&self) -> &str {
        &self.pk_column
    }

    pub fn ordering(&self) -> Option<&str> {
        self.ordering.as_deref()
    }

    pub fn with_computed_field(mut self, name: &str, expr: CaseExpr) -> Result<Self> {
        let name = validate_identifier(name)?;
        self.computed.retain(|(existing, _)| existing != name);
        self.computed.push((name.to_string(), Arc::new(expr)));
        self.ensure_bind_budget()?;
        Ok(self)
    }

    pub fn order_by(mut self, field: &str) -> Result<Self> {
        self.ordering = Some(validate_identifier(field)?.to_string());
        Ok(self)
    }

    pub fn filter(mut self, predicate: Predicate) -> Result<Self> {
        validate_identifier(predicate.field())?;
        self.filters.push(predicate);
        self.ensure_bind_budget()?;
        Ok(self)
    }

    /// Bind parameters the rendered statement will carry, across every
    /// computed field and predicate.
    pub fn bind_count(&self) -> usize {
        let computed: usize = self
            .computed
            .iter()
            .flat_map(|(_, expr)| expr.branches())
            .map(|(pk, value)| value_binds(pk) + value_binds(value))
            .sum();
        let filters: usize = self.filters.iter().map(predicate_binds).sum();
        computed + filters
    }

    fn ensure_bind_budget(&self) -> Result<()> {
        let count = self.bind_count();
        if count > MAX_BIND_PARAMETERS {
            warn!(
                "Query on {} exceeds bind parameter limit: {} > {}",
                self.table, count, MAX_BIND_PARAMETERS
            );
            return Err(AnnotateError::TooManyParameters {
                count,
                limit: MAX_BIND_PARAMETERS,
            });
        }
        Ok(())
    }

    /// Render into a builder ready to execute.
    ///
    /// The table select is wrapped in a subquery so predicates and ordering
    /// can reference computed fields by name.
    pub fn to_builder(&self) -> Result<QueryBuilder<'static, Postgres>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM (SELECT t.*");

        for (name, expr) in &self.computed {
            builder.push(", ");
            self.push_case(&mut builder, name, expr)?;
            builder.push(" AS ");
            builder.push(quote_identifier(name)?);
        }

        builder.push(" FROM ");
        builder.push(quote_table(&self.table)?);
        builder.push(" AS t) AS q");

        for (i, predicate) in self.filters.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            push_predicate(&mut builder, predicate)?;
        }

        if let Some(field) = &self.ordering {
            builder.push(" ORDER BY q.");
            builder.push(quote_identifier(field)?);
            builder.push(" ASC");
        }

        Ok(builder)
    }

    fn push_case(
        &self,
        builder: &mut QueryBuilder<'static, Postgres>,
        field: &str,
        expr: &CaseExpr,
    ) -> Result<()> {
        if expr.is_empty() {
            builder.push("NULL");
            return Ok(());
        }

        let pk_column = quote_identifier(&self.pk_column)?;
        builder.push("CASE");
        for (pk, value) in expr.branches() {
            builder.push(" WHEN t.");
            builder.push(&pk_column);
            builder.push(" = ");
            push_value(builder, pk, field, pk)?;
            builder.push(" THEN ");
            push_value(builder, value, field, pk)?;
        }
        builder.push(" ELSE NULL END");
        Ok(())
    }
}

// Mirrors push_value: NULL renders inline.
fn value_binds(value: &Value) -> usize {
    usize::from(!value.is_null())
}

// Mirrors push_predicate.
fn predicate_binds(predicate: &Predicate) -> usize {
    let value = predicate.value();
    match predicate.lookup() {
        Lookup::IsNull => 0,
        Lookup::IContains => usize::from(value.as_str().is_some()),
        _ => value_binds(value),
    }
}

fn push_value(
    builder: &mut QueryBuilder<'static, Postgres>,
    value: &Value,
    field: &str,
    pk: &Value,
) -> Result<()> {
    match value {
        Value::Bool(b) => {
            builder.push_bind(*b);
        }
        Value::Int(i) => {
            builder.push_bind(*i);
        }
        Value::Float(f) => {
            builder.push_bind(f.into_inner());
        }
        Value::Text(s) => {
            builder.push_bind(s.clone());
        }
        Value::Uuid(id) => {
            builder.push_bind(*id);
        }
        Value::Timestamp(ts) => {
            builder.push_bind(*ts);
        }
        Value::Null => {
            builder.push("NULL");
        }
        Value::Tuple(_) => {
            return Err(AnnotateError::UnrepresentableValue {
                field: field.to_string(),
                pk: pk.clone(),
            });
        }
    }
    Ok(())
}

fn push_predicate(
    builder: &mut QueryBuilder<'static, Postgres>,
    predicate: &Predicate,
) -> Result<()> {
    let column = format!("q.{}", quote_identifier(predicate.field())?);
    let value = predicate.value();

    let op = match predicate.lookup() {
        Lookup::IsNull => {
            builder.push(column);
            builder.push(if value.as_bool().unwrap_or(true) {
                " IS NULL"
            } else {
                " IS NOT NULL"
            });
            return Ok(());
        }
        // Comparisons with NULL never hold.
        _ if value.is_null() => {
            builder.push("FALSE");
            return Ok(());
        }
        Lookup::IContains => {
            let Some(needle) = value.as_str() else {
                builder.push("FALSE");
                return Ok(());
            };
            builder.push(column);
            builder.push(" ILIKE ");
            builder.push_bind(format!("%{}%", escape_like_literal(needle)));
            builder.push(" ESCAPE E'\\\\'");
            return Ok(());
        }
        Lookup::Exact => " = ",
        Lookup::NotEqual => " <> ",
        Lookup::Gt => " > ",
        Lookup::Gte => " >= ",
        Lookup::Lt => " < ",
        Lookup::Lte => " <= ",
    };

    builder.push(column);
    builder.push(op);
    push_value(builder, value, predicate.field(), &Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(query: &SelectQuery) -> String {
        query.to_builder().unwrap().sql().to_string()
    }

    #[test]
    fn test_plain_select() {
        let query = SelectQuery::new("products").unwrap();
        assert_eq!(
            render(&query),
            "SELECT * FROM (SELECT t.* FROM \"products\" AS t) AS q"
        );
    }

    #[test]
    fn test_rank_expression_uses_placeholders() {
        let expr = CaseExpr::ranks(vec![Value::Int(2), Value::Int(1)]);
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("sort_order", expr)
            .unwrap()
            .order_by("sort_order")
            .unwrap();

        assert_eq!(
            render(&query),
            "SELECT * FROM (SELECT t.*, CASE WHEN t.\"id\" = $1 THEN $2 \
             WHEN t.\"id\" = $3 THEN $4 ELSE NULL END AS \"sort_order\" \
             FROM \"products\" AS t) AS q ORDER BY q.\"sort_order\" ASC"
        );
    }

    #[test]
    fn test_values_never_appear_in_sql_text() {
        let expr = CaseExpr::from_pairs(vec![(
            Value::from("o'brien"),
            Value::from("'; DROP TABLE products; --"),
        )]);
        let query = SelectQuery::new("people")
            .unwrap()
            .with_pk_column("slug")
            .unwrap()
            .with_computed_field("label", expr)
            .unwrap()
            .filter(Predicate::eq("label", "it's"))
            .unwrap();

        let sql = render(&query);
        assert!(!sql.contains('\''));
        assert!(sql.contains("CASE WHEN t.\"slug\" = $1 THEN $2 ELSE NULL END AS \"label\""));
        assert!(sql.ends_with("WHERE q.\"label\" = $3"));
    }

    #[test]
    fn test_empty_expression_renders_null() {
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("label", CaseExpr::empty())
            .unwrap();
        assert_eq!(
            render(&query),
            "SELECT * FROM (SELECT t.*, NULL AS \"label\" FROM \"products\" AS t) AS q"
        );
    }

    #[test]
    fn test_predicates_render() {
        let query = SelectQuery::new("public.products")
            .unwrap()
            .filter(Predicate::icontains("name", "50%"))
            .unwrap()
            .filter(Predicate::is_null("discount", false))
            .unwrap()
            .filter(Predicate::gt("cost", Value::Null))
            .unwrap();

        assert_eq!(
            render(&query),
            "SELECT * FROM (SELECT t.* FROM \"public\".\"products\" AS t) AS q \
             WHERE q.\"name\" ILIKE $1 ESCAPE E'\\\\' \
             AND q.\"discount\" IS NOT NULL AND FALSE"
        );
    }

    #[test]
    fn test_tuple_values_rejected() {
        let expr = CaseExpr::from_pairs(vec![(Value::Int(1), Value::from(("a", "b")))]);
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("pair", expr)
            .unwrap();
        assert!(matches!(
            query.to_builder(),
            Err(AnnotateError::UnrepresentableValue { .. })
        ));
    }

    fn wide_ranks(branches: i64) -> CaseExpr {
        CaseExpr::ranks((0..branches).map(Value::Int))
    }

    #[test]
    fn test_bind_count_covers_fields_and_filters() {
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("sort_order", wide_ranks(3))
            .unwrap()
            .with_computed_field(
                "label",
                CaseExpr::from_pairs(vec![(Value::Int(1), Value::Null)]),
            )
            .unwrap()
            .filter(Predicate::gt("cost", 5))
            .unwrap()
            .filter(Predicate::is_null("discount", true))
            .unwrap();
        assert_eq!(query.bind_count(), 6 + 1 + 1);
        assert_eq!(render(&query).matches('$').count(), query.bind_count());
    }

    #[test]
    fn test_chained_expressions_share_one_budget() {
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("ratio", wide_ranks(20_000))
            .unwrap();

        match query.with_computed_field("sort_order", wide_ranks(20_000)) {
            Err(AnnotateError::TooManyParameters { count, limit }) => {
                assert_eq!(count, 80_000);
                assert_eq!(limit, MAX_BIND_PARAMETERS);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_filters_count_against_budget() {
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("sort_order", wide_ranks(32_767))
            .unwrap()
            .filter(Predicate::gt("cost", 5))
            .unwrap();
        assert_eq!(query.bind_count(), MAX_BIND_PARAMETERS);

        assert!(matches!(
            query.filter(Predicate::lt("cost", 50)),
            Err(AnnotateError::TooManyParameters { count: 65_536, .. })
        ));
    }

    #[test]
    fn test_replacing_a_field_frees_its_parameters() {
        let query = SelectQuery::new("products")
            .unwrap()
            .with_computed_field("sort_order", wide_ranks(30_000))
            .unwrap()
            .with_computed_field("sort_order", wide_ranks(30_000))
            .unwrap();
        assert_eq!(query.bind_count(), 60_000);
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        assert!(SelectQuery::new("bad\"table").is_err());
        assert!(SelectQuery::new("products").unwrap().with_pk_column("").is_err());
        assert!(quote_table("a.b\"c").is_err());
    }
}
