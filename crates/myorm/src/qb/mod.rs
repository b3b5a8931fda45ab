//! Query builders.
//!
//! Each builder accumulates clauses through chained calls and renders a
//! finished statement on [`SqlQb::build`]; nothing reaches the executor until
//! the builder validates. Entry points:
//!
//! ```ignore
//! use myorm::qb;
//!
//! let sql = qb::select("users").eq("status", "active").to_sql()?;
//! let n = qb::update("users")
//!     .set_expr("age", Expr::col("age").add(Expr::val(1)))
//!     .eq("id", 1)
//!     .execute(&db)
//!     .await?;
//! ```

mod create_table;
mod delete;
mod insert;
mod select;
mod traits;
mod update;


pub use create_table::CreateTableQb;
pub use delete::DeleteQb;
pub use insert::{InsertQb, OnDuplicateQb};
pub use select::SelectQb;
pub use traits::{BuiltQuery, MutationQb, SqlQb};
pub use update::UpdateQb;

use crate::error::OrmResult;
use crate::schema::Model;

/// Start a SELECT on a table.
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Start an INSERT into a table.
pub fn insert(table: &str) -> InsertQb {
    InsertQb::new(table)
}

/// Start an INSERT built from a model instance.
pub fn insert_model<M: Model>(model: &M) -> InsertQb {
    InsertQb::from_model(model)
}

/// Start an UPDATE on a table.
pub fn update(table: &str) -> UpdateQb {
    UpdateQb::new(table)
}

/// Start an UPDATE built from a model instance, keyed on its primary key.
pub fn update_model<M: Model>(model: &M) -> OrmResult<UpdateQb> {
    UpdateQb::from_model(model)
}

/// Start a DELETE on a table.
pub fn delete(table: &str) -> DeleteQb {
    DeleteQb::new(table)
}

/// Start a CREATE TABLE for a table.
pub fn create_table(table: &str) -> CreateTableQb {
    CreateTableQb::new(table)
}

/// Start a CREATE TABLE from a model's declared columns.
pub fn create_table_for<M: Model>() -> CreateTableQb {
    CreateTableQb::for_model::<M>()
}
