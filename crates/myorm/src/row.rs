//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use mysql_async::Row;
use mysql_async::prelude::FromValue;

/// Maps a result row to a struct.
///
/// Usually implemented via `#[derive(FromRow)]`.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Column access helpers on [`Row`] with decode errors instead of panics.
pub trait RowExt {
    /// Get a column by name, converting missing columns and conversion
    /// failures into [`OrmError::Decode`].
    fn try_get_column<T: FromValue>(&self, column: &str) -> OrmResult<T>;
}

impl RowExt for Row {
    fn try_get_column<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        match self.get_opt::<T, &str>(column) {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(OrmError::decode(column, e.to_string())),
            None => Err(OrmError::decode(column, "column missing from result row")),
        }
    }
}
