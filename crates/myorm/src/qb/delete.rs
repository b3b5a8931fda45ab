//! DELETE query builder.

use crate::condition::{ConditionBuilder, Connective};
use crate::error::{OrmError, OrmResult};
use crate::expr::{BinOp, Expr};
use crate::ident::Ident;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::value::IntoValue;

/// DELETE query builder with parameterized WHERE conditions.
///
/// Without any condition the statement renders `WHERE 1=0`, so an
/// accidentally unfiltered delete removes nothing. Call
/// [`DeleteQb::allow_delete_all`] to delete every row on purpose.
#[derive(Debug, Clone)]
pub struct DeleteQb {
    /// Table name
    table: String,
    /// WHERE conditions
    where_cb: ConditionBuilder,
    /// Permit DELETE without WHERE
    allow_delete_all: bool,
}

impl DeleteQb {
    /// Create a new DELETE query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_cb: ConditionBuilder::new(),
            allow_delete_all: false,
        }
    }

    /// Permit a DELETE with no WHERE clause to affect every row.
    pub fn allow_delete_all(mut self, allow: bool) -> Self {
        self.allow_delete_all = allow;
        self
    }

    /// Add WHERE: column = value
    pub fn eq<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Eq, value);
        self
    }

    /// Add WHERE: column != value
    pub fn ne<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Ne, value);
        self
    }

    /// Add a WHERE comparison with an explicit operator, joined with AND.
    pub fn cond<V: IntoValue>(mut self, column: &str, op: BinOp, value: V) -> Self {
        self.where_cb.add(column, op, value);
        self
    }

    /// Add a WHERE comparison joined with OR.
    pub fn or_cond<V: IntoValue>(mut self, column: &str, op: BinOp, value: V) -> Self {
        self.where_cb.add_with(column, op, value, Connective::Or);
        self
    }

    /// Add a filter expression tree, joined with AND.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_cb.add_expr(expr, Connective::And);
        self
    }
}

impl SqlQb for DeleteQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(OrmError::state("DELETE requires a table name"));
        }
        let table = Ident::parse(&self.table)?;

        let mut sql = format!("DELETE FROM {}", table.to_sql());
        let (where_sql, params) = self.where_cb.build()?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        } else if !self.allow_delete_all {
            sql.push_str(" WHERE 1=0");
        }

        Ok(BuiltQuery::new(sql, params))
    }
}

impl MutationQb for DeleteQb {}
