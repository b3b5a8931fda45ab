//! UPDATE query builder.

use crate::condition::{ConditionBuilder, Connective, ParamNamer};
use crate::error::{OrmError, OrmResult};
use crate::expr::{BinOp, Expr, ExprContext};
use crate::ident::Ident;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::schema::Model;
use crate::value::IntoValue;
use mysql_async::Value;

#[derive(Debug, Clone)]
enum SetField {
    /// `col` = :param
    Value { column: String, value: Value },
    /// `col` = expr (arithmetic over columns and constants, or `=`)
    Expr { column: String, expr: Expr },
    /// Raw assignment fragment
    Raw { sql: String },
}

/// UPDATE query builder with SET assignments and parameterized WHERE.
#[derive(Debug, Clone)]
pub struct UpdateQb {
    /// Table name
    table: String,
    /// SET assignments, in call order
    sets: Vec<SetField>,
    /// WHERE conditions
    where_cb: ConditionBuilder,
}

impl UpdateQb {
    /// Create a new UPDATE query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sets: Vec::new(),
            where_cb: ConditionBuilder::new(),
        }
    }

    /// Build an UPDATE from a model instance: SET every non-key column,
    /// WHERE on the primary key.
    ///
    /// Fails if the model declares no primary key.
    pub fn from_model<M: Model>(model: &M) -> OrmResult<Self> {
        let pk = M::primary_key_column()
            .ok_or_else(|| OrmError::state("UPDATE from model requires a primary key column"))?;
        let pk_value = model
            .primary_key_value()
            .ok_or_else(|| OrmError::state("UPDATE from model requires a primary key value"))?;
        let mut qb = Self::new(M::TABLE);
        for (column, value) in model.to_row() {
            if column == pk {
                continue;
            }
            qb.sets.push(SetField::Value { column, value });
        }
        qb.where_cb.add(pk, BinOp::Eq, pk_value);
        Ok(qb)
    }

    // ==================== SET assignments ====================

    /// Assign a column a bound value.
    pub fn set<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.sets.push(SetField::Value {
            column: column.to_string(),
            value: value.into_value(),
        });
        self
    }

    /// Assign a column an arithmetic expression, e.g.
    /// `set_expr("age", Expr::col("age").add(Expr::val(1)))`.
    pub fn set_expr(mut self, column: &str, expr: Expr) -> Self {
        self.sets.push(SetField::Expr {
            column: column.to_string(),
            expr,
        });
        self
    }

    /// Serialize a value to JSON text and bind it, for MySQL JSON columns.
    pub fn set_json<T: serde::Serialize>(self, column: &str, value: &T) -> OrmResult<Self> {
        let json = serde_json::to_string(value)
            .map_err(|e| OrmError::Serialization(e.to_string()))?;
        Ok(self.set(column, json))
    }

    /// Add a raw SET fragment.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw fragments.
    pub fn set_raw(mut self, sql: &str) -> Self {
        self.sets.push(SetField::Raw {
            sql: sql.to_string(),
        });
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

impl SqlQb for UpdateQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(OrmError::state("UPDATE requires a table name"));
        }
        if self.sets.is_empty() {
            return Err(OrmError::state("UPDATE requires at least one SET assignment"));
        }
        let table = Ident::parse(&self.table)?;

        // One namer for SET and WHERE keeps placeholder names distinct across
        // both clauses.
        let mut namer = ParamNamer::new();
        let mut params = Vec::new();

        let mut sql = format!("UPDATE {} SET ", table.to_sql());
        for (i, field) in self.sets.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            match field {
                SetField::Value { column, value } => {
                    let ident = Ident::parse(column)?;
                    let name = namer.claim(&ident.param_name());
                    ident.write_sql(&mut sql);
                    sql.push_str(" = :");
                    sql.push_str(&name);
                    params.push((name, value.clone()));
                }
                SetField::Expr { column, expr } => {
                    let ident = Ident::parse(column)?;
                    ident.write_sql(&mut sql);
                    sql.push_str(" = ");
                    sql.push_str(&expr.render(ExprContext::UpdateAssign)?);
                }
                SetField::Raw { sql: fragment } => {
                    sql.push_str(fragment);
                }
            }
        }

        let where_sql = self.where_cb.render(&mut namer, &mut params)?;
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        Ok(BuiltQuery::new(sql, params))
    }
}

impl MutationQb for UpdateQb {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_update() {
        let qb = UpdateQb::new("users").set("status", "banned").eq("id", 7);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `users` SET `status` = :status WHERE `id` = :id"
        );
        let built = qb.build().unwrap();
        assert_eq!(built.params.len(), 2);
        assert_eq!(built.params[1], ("id".to_string(), Value::Int(7)));
    }

    #[test]
    fn update_with_expr() {
        let qb = UpdateQb::new("users")
            .set_expr("age", Expr::col("age").add(Expr::val(1)))
            .eq("id", 1);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `users` SET `age` = `age` + 1 WHERE `id` = :id"
        );
    }

    #[test]
    fn update_without_sets_fails() {
        let qb = UpdateQb::new("users").eq("id", 1);
        assert!(matches!(qb.build(), Err(OrmError::State(_))));
    }

    #[test]
    fn update_without_table_fails() {
        let qb = UpdateQb::new("").set("a", 1);
        assert!(matches!(qb.build(), Err(OrmError::State(_))));
    }

    #[test]
    fn set_and_where_share_namer() {
        // Updating a column that also appears in WHERE must not reuse its
        // placeholder.
        let qb = UpdateQb::new("users").set("age", 21).eq("age", 20);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `users` SET `age` = :age WHERE `age` = :age_2"
        );
        let built = qb.build().unwrap();
        assert_eq!(
            built.params,
            vec![
                ("age".to_string(), Value::Int(21)),
                ("age_2".to_string(), Value::Int(20)),
            ]
        );
    }

    #[test]
    fn or_rejected_in_set_expr() {
        let qb = UpdateQb::new("users").set_expr(
            "a",
            Expr::col("a").eq(Expr::val(1)).or(Expr::col("b").eq(Expr::val(2))),
        );
        assert!(matches!(
            qb.build(),
            Err(OrmError::UnsupportedOperator { op: "Or", .. })
        ));
    }

    #[test]
    fn update_with_raw_set() {
        let qb = UpdateQb::new("users")
            .set_raw("`updated_at` = CURRENT_TIMESTAMP")
            .eq("id", 3);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `users` SET `updated_at` = CURRENT_TIMESTAMP WHERE `id` = :id"
        );
    }

    #[test]
    fn update_set_json() {
        let qb = UpdateQb::new("events")
            .set_json("payload", &serde_json::json!({"kind": "login"}))
            .unwrap()
            .eq("id", 1);
        assert_eq!(
            qb.to_sql().unwrap(),
            "UPDATE `events` SET `payload` = :payload WHERE `id` = :id"
        );
        let built = qb.build().unwrap();
        assert_eq!(
            built.params[0],
            (
                "payload".to_string(),
                Value::Bytes(br#"{"kind":"login"}"#.to_vec())
            )
        );
    }
}
