//! Trait definitions for query builders.

use crate::client::Executor;
use crate::error::{OrmError, OrmResult};
use crate::row::FromRow;
use mysql_async::{Params, Row, Value};

/// The result of building a query: statement text plus named parameters.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<(String, Value)>,
}

impl BuiltQuery {
    /// Create a new built query.
    pub fn new(sql: String, params: Vec<(String, Value)>) -> Self {
        Self { sql, params }
    }

    /// Split into statement text and driver-ready parameters.
    pub fn into_parts(self) -> (String, Params) {
        let params = if self.params.is_empty() {
            Params::Empty
        } else {
            let mut map = std::collections::HashMap::default();
            for (name, value) in self.params {
                map.insert(name.into_bytes(), value);
            }
            Params::Named(map)
        };
        (self.sql, params)
    }
}

/// Base trait for all query builders.
///
/// Building validates state first: required clauses missing at build time
/// fail before any statement text reaches the executor.
pub trait SqlQb: Sync {
    /// Build the statement text and parameter bindings.
    fn build(&self) -> OrmResult<BuiltQuery>;

    /// Build and return only the statement text.
    fn to_sql(&self) -> OrmResult<String> {
        Ok(self.build()?.sql)
    }

    /// Execute the query and return all rows.
    fn query(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        async move {
            let (sql, params) = self.build()?.into_parts();
            db.query(&sql, params).await
        }
    }

    /// Execute the query and return the first row, if any.
    fn query_first(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        async move {
            let (sql, params) = self.build()?.into_parts();
            db.query_first(&sql, params).await
        }
    }

    /// Execute the query and map all rows to `T`.
    fn fetch_all<T: FromRow>(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<Vec<T>>> + Send {
        async move {
            let rows = self.query(db).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Execute the query and map the first row to `T`, if any.
    fn fetch_opt<T: FromRow>(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<Option<T>>> + Send {
        async move {
            let row = self.query_first(db).await?;
            row.as_ref().map(T::from_row).transpose()
        }
    }

    /// Execute the query and map the first row to `T`.
    ///
    /// Returns [`OrmError::NotFound`] if no rows are returned.
    fn fetch_one<T: FromRow>(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<T>> + Send {
        async move {
            let row = self
                .query_first(db)
                .await?
                .ok_or_else(|| OrmError::not_found("Expected 1 row, got 0"))?;
            T::from_row(&row)
        }
    }
}

/// Trait for mutation builders (CREATE TABLE/INSERT/UPDATE/DELETE).
pub trait MutationQb: SqlQb {
    /// Execute and return the affected row count.
    fn execute(
        &self,
        db: &impl Executor,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        async move {
            let (sql, params) = self.build()?.into_parts();
            db.execute(&sql, params).await
        }
    }
}
