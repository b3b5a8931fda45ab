//! SELECT query builder.

use crate::condition::{ConditionBuilder, Connective};
use crate::error::{OrmError, OrmResult};
use crate::expr::{BinOp, Expr};
use crate::ident::Ident;
use crate::qb::traits::{BuiltQuery, SqlQb};
use crate::value::IntoValue;

/// SELECT query builder with parameterized WHERE conditions.
#[derive(Debug, Clone)]
pub struct SelectQb {
    /// Table name
    table: String,
    /// SELECT columns (default ["*"])
    select_cols: Vec<String>,
    /// WHERE conditions
    where_cb: ConditionBuilder,
    /// ORDER BY clauses
    order_clauses: Vec<String>,
    /// LIMIT
    limit: Option<u64>,
    /// OFFSET
    offset: Option<u64>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select_cols: vec!["*".to_string()],
            where_cb: ConditionBuilder::new(),
            order_clauses: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns (string form, supports complex expressions).
    pub fn select(mut self, cols: &str) -> Self {
        self.select_cols = vec![cols.to_string()];
        self
    }

    /// Set SELECT columns (array form).
    pub fn select_cols(mut self, cols: &[&str]) -> Self {
        self.select_cols = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    // ==================== WHERE conditions ====================

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

    /// Add WHERE: column > value
    pub fn gt<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Gt, value);
        self
    }

    /// Add WHERE: column >= value
    pub fn gte<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Gte, value);
        self
    }

    /// Add WHERE: column < value
    pub fn lt<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Lt, value);
        self
    }

    /// Add WHERE: column <= value
    pub fn lte<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.where_cb.add(column, BinOp::Lte, value);
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

    /// Add a filter expression tree, joined with OR.
    pub fn or_filter(mut self, expr: Expr) -> Self {
        self.where_cb.add_expr(expr, Connective::Or);
        self
    }

    /// Add a raw WHERE fragment, joined with AND.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw fragments.
    pub fn raw(mut self, sql: &str) -> Self {
        self.where_cb.add_raw(sql, Connective::And);
        self
    }

    // ==================== ORDER BY / LIMIT ====================

    /// Add an ORDER BY clause (e.g. `"created_at DESC"`).
    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl SqlQb for SelectQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(OrmError::state("SELECT requires a table name"));
        }
        let table = Ident::parse(&self.table)?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            self.select_cols.join(", "),
            table.to_sql()
        );

        let (where_sql, params) = self.where_cb.build()?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_clauses.join(", "));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        Ok(BuiltQuery::new(sql, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_select() {
        let qb = SelectQb::new("users");
        assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `users`");
    }

    #[test]
    fn select_with_where() {
        let qb = SelectQb::new("users").eq("status", "active");
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `status` = :status"
        );
    }

    #[test]
    fn select_cols_and_order() {
        let qb = SelectQb::new("users")
            .select_cols(&["id", "username"])
            .gte("age", 18)
            .order_by("created_at DESC")
            .limit(10)
            .offset(20);
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT id, username FROM `users` WHERE `age` >= :age ORDER BY created_at DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn select_with_or_condition() {
        let qb = SelectQb::new("users")
            .eq("role", "admin")
            .or_cond("role", BinOp::Eq, "owner");
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE `role` = :role OR `role` = :role_2"
        );
    }

    #[test]
    fn select_with_filter_expr() {
        let qb = SelectQb::new("users").filter(Expr::group(
            Expr::col("verified")
                .eq(Expr::val(true))
                .or(Expr::col("invited").eq(Expr::val(true))),
        ));
        assert_eq!(
            qb.to_sql().unwrap(),
            "SELECT * FROM `users` WHERE (`verified` = 1 OR `invited` = 1)"
        );
    }

    #[test]
    fn select_without_table_fails() {
        let qb = SelectQb::new("");
        assert!(matches!(qb.build(), Err(OrmError::State(_))));
    }

    #[test]
    fn select_bad_table_fails() {
        let qb = SelectQb::new("users; --");
        assert!(matches!(qb.build(), Err(OrmError::Validation(_))));
    }

    #[test]
    fn select_params_bound() {
        let qb = SelectQb::new("users").eq("name", "alice").lt("age", 30);
        let built = qb.build().unwrap();
        assert_eq!(built.params.len(), 2);
        assert_eq!(built.params[0].0, "name");
        assert_eq!(built.params[1].0, "age");
    }
}
