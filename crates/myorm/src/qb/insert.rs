//! INSERT query builder.

use crate::condition::ParamNamer;
use crate::error::{OrmError, OrmResult};
use crate::expr::{Expr, ExprContext};
use crate::ident::Ident;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::schema::Model;
use crate::value::IntoValue;
use mysql_async::Value;

#[derive(Debug, Clone)]
enum DupAssign {
    /// `col` = :param
    Value { column: String, value: Value },
    /// `col` = VALUES(`col`)
    Values { column: String },
    /// `col` = expr (arithmetic over columns and constants)
    Expr { column: String, expr: Expr },
}

/// INSERT query builder with optional ON DUPLICATE KEY UPDATE clause.
#[derive(Debug, Clone)]
pub struct InsertQb {
    /// Table name
    table: String,
    /// Column / value pairs, in insertion order
    values: Vec<(String, Value)>,
    /// ON DUPLICATE KEY UPDATE assignments
    on_duplicate: Vec<DupAssign>,
}

impl InsertQb {
    /// Create a new INSERT query builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: Vec::new(),
            on_duplicate: Vec::new(),
        }
    }

    /// Build an INSERT from a model instance.
    ///
    /// AUTO_INCREMENT columns are skipped so the database assigns them.
    pub fn from_model<M: Model>(model: &M) -> Self {
        let auto: Vec<String> = M::columns()
            .into_iter()
            .filter(|c| c.is_auto_increment())
            .map(|c| c.name().to_string())
            .collect();
        let mut qb = Self::new(M::TABLE);
        for (column, value) in model.to_row() {
            if auto.iter().any(|a| a == &column) {
                continue;
            }
            qb.values.push((column, value));
        }
        qb
    }

    /// Add a column value to insert.
    pub fn set<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.values.push((column.to_string(), value.into_value()));
        self
    }

    /// Serialize a value to JSON text and bind it, for MySQL JSON columns.
    pub fn set_json<T: serde::Serialize>(self, column: &str, value: &T) -> OrmResult<Self> {
        let json = serde_json::to_string(value)
            .map_err(|e| OrmError::Serialization(e.to_string()))?;
        Ok(self.set(column, json))
    }

    /// Start an ON DUPLICATE KEY UPDATE clause.
    pub fn on_duplicate_key(self) -> OnDuplicateQb {
        OnDuplicateQb { inner: self }
    }
}

/// Builder for the ON DUPLICATE KEY UPDATE assignments of an [`InsertQb`].
#[derive(Debug, Clone)]
pub struct OnDuplicateQb {
    inner: InsertQb,
}

impl OnDuplicateQb {
    /// Assign a column a fixed value on duplicate key.
    pub fn set<V: IntoValue>(mut self, column: &str, value: V) -> Self {
        self.inner.on_duplicate.push(DupAssign::Value {
            column: column.to_string(),
            value: value.into_value(),
        });
        self
    }

    /// Assign a column the value from the attempted insert:
    /// `` `col` = VALUES(`col`) ``.
    pub fn set_values(mut self, column: &str) -> Self {
        self.inner.on_duplicate.push(DupAssign::Values {
            column: column.to_string(),
        });
        self
    }

    /// Assign a column an arithmetic expression, e.g.
    /// `set_expr("hits", Expr::col("hits").add(Expr::val(1)))`.
    pub fn set_expr(mut self, column: &str, expr: Expr) -> Self {
        self.inner.on_duplicate.push(DupAssign::Expr {
            column: column.to_string(),
            expr,
        });
        self
    }

    /// Finish the clause and return the INSERT builder.
    pub fn finish(self) -> InsertQb {
        self.inner
    }
}

impl SqlQb for InsertQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(OrmError::state("INSERT requires a table name"));
        }
        if self.values.is_empty() {
            return Err(OrmError::state("INSERT requires at least one column value"));
        }
        let table = Ident::parse(&self.table)?;

        let mut namer = ParamNamer::new();
        let mut params = Vec::new();
        let mut columns = String::new();
        let mut placeholders = String::new();
        for (i, (column, value)) in self.values.iter().enumerate() {
            let ident = Ident::parse(column)?;
            let name = namer.claim(&ident.param_name());
            if i > 0 {
                columns.push_str(", ");
                placeholders.push_str(", ");
            }
            ident.write_sql(&mut columns);
            placeholders.push(':');
            placeholders.push_str(&name);
            params.push((name, value.clone()));
        }

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.to_sql(),
            columns,
            placeholders
        );

        if !self.on_duplicate.is_empty() {
            sql.push_str(" ON DUPLICATE KEY UPDATE ");
            for (i, assign) in self.on_duplicate.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                match assign {
                    DupAssign::Value { column, value } => {
                        let ident = Ident::parse(column)?;
                        let name = namer.claim(&ident.param_name());
                        ident.write_sql(&mut sql);
                        sql.push_str(" = :");
                        sql.push_str(&name);
                        params.push((name, value.clone()));
                    }
                    DupAssign::Values { column } => {
                        let ident = Ident::parse(column)?;
                        ident.write_sql(&mut sql);
                        sql.push_str(" = VALUES(");
                        ident.write_sql(&mut sql);
                        sql.push(')');
                    }
                    DupAssign::Expr { column, expr } => {
                        let ident = Ident::parse(column)?;
                        ident.write_sql(&mut sql);
                        sql.push_str(" = ");
                        sql.push_str(&expr.render(ExprContext::DuplicateKeyAssign)?);
                    }
                }
            }
        }

        Ok(BuiltQuery::new(sql, params))
    }
}

impl MutationQb for InsertQb {}
