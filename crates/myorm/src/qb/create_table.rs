//! CREATE TABLE query builder.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::qb::traits::{BuiltQuery, MutationQb, SqlQb};
use crate::schema::{ColumnDef, Model};

/// CREATE TABLE query builder.
#[derive(Debug, Clone)]
pub struct CreateTableQb {
    /// Table name
    table: String,
    /// Column definitions, in declaration order
    columns: Vec<ColumnDef>,
    /// Emit IF NOT EXISTS
    if_not_exists: bool,
}

impl CreateTableQb {
    /// Create a new CREATE TABLE builder for a table.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            if_not_exists: false,
        }
    }

    /// Build a CREATE TABLE from a model's declared columns.
    pub fn for_model<M: Model>() -> Self {
        Self {
            table: M::TABLE.to_string(),
            columns: M::columns(),
            if_not_exists: false,
        }
    }

    /// Add a column definition.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Emit `CREATE TABLE IF NOT EXISTS`.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }
}

impl SqlQb for CreateTableQb {
    fn build(&self) -> OrmResult<BuiltQuery> {
        if self.table.is_empty() {
            return Err(OrmError::state("CREATE TABLE requires a table name"));
        }
        if self.columns.is_empty() {
            return Err(OrmError::state(
                "CREATE TABLE requires at least one column definition",
            ));
        }
        let table = Ident::parse(&self.table)?;

        let mut sql = String::from("CREATE TABLE ");
        if self.if_not_exists {
            sql.push_str("IF NOT EXISTS ");
        }
        table.write_sql(&mut sql);
        sql.push_str(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&column.render()?);
        }
        sql.push(')');

        Ok(BuiltQuery::new(sql, Vec::new()))
    }
}

impl MutationQb for CreateTableQb {}
