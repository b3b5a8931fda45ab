//! Table schema metadata.
//!
//! [`ColumnDef`] describes one column for CREATE TABLE generation; [`Model`]
//! is the compile-time schema seam the derive macro implements, replacing
//! runtime attribute reflection with an explicit per-type description.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use mysql_async::Value;
use regex::Regex;
use std::sync::LazyLock;

static TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_ ]*$").expect("valid type regex"));
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(,\d+)?$").expect("valid size regex"));

/// Column definition for CREATE TABLE.
///
/// Built once per statement, from explicit calls or from a derived
/// [`Model::columns`]; never mutated after the statement string is rendered.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    name: String,
    sql_type: String,
    size: Option<String>,
    not_null: bool,
    primary_key: bool,
    auto_increment: bool,
    unique: bool,
    default: Option<String>,
}

impl ColumnDef {
    /// Create a column definition with a name and SQL type token
    /// (e.g. `"INT"`, `"VARCHAR"`).
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            size: None,
            not_null: false,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default: None,
        }
    }

    /// Set the type-size argument: `"255"` or `"10,2"`.
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Mark the column NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark the column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the column AUTO_INCREMENT.
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark the column UNIQUE.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default literal, emitted verbatim after `DEFAULT`.
    ///
    /// # Safety
    /// The literal is not escaped; pass trusted text such as `"0"`,
    /// `"'pending'"`, or `"CURRENT_TIMESTAMP"`.
    pub fn default_literal(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this column is the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Whether this column is AUTO_INCREMENT.
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Render this definition as a CREATE TABLE column clause.
    pub fn render(&self) -> OrmResult<String> {
        let ident = Ident::parse(&self.name)?;
        if !TYPE_RE.is_match(&self.sql_type) {
            return Err(OrmError::validation(format!(
                "Invalid SQL type token: '{}'",
                self.sql_type
            )));
        }
        let mut out = ident.to_sql();
        out.push(' ');
        out.push_str(&self.sql_type);
        if let Some(size) = &self.size {
            if !SIZE_RE.is_match(size) {
                return Err(OrmError::validation(format!(
                    "Invalid type-size argument: '{size}'"
                )));
            }
            out.push('(');
            out.push_str(size);
            out.push(')');
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        if self.auto_increment {
            out.push_str(" AUTO_INCREMENT");
        }
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        Ok(out)
    }
}

/// Compile-time table mapping for a struct.
///
/// Implemented via `#[derive(Model)]`, which infers SQL types from field
/// types and reads `#[orm(...)]` attribute overrides.
pub trait Model {
    /// Table name.
    const TABLE: &'static str;

    /// Column definitions, in field order.
    fn columns() -> Vec<ColumnDef>;

    /// Column name / bound value pairs for this instance, in field order.
    fn to_row(&self) -> Vec<(String, Value)>;

    /// Name of the primary key column, if one is declared.
    fn primary_key_column() -> Option<&'static str> {
        None
    }

    /// Primary key value for this instance, if one is declared.
    fn primary_key_value(&self) -> Option<Value> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_plain_column() {
        let col = ColumnDef::new("username", "VARCHAR").size("255").not_null();
        assert_eq!(col.render().unwrap(), "`username` VARCHAR(255) NOT NULL");
    }

    #[test]
    fn render_primary_key_column() {
        let col = ColumnDef::new("id", "BIGINT")
            .not_null()
            .auto_increment()
            .primary_key();
        assert_eq!(
            col.render().unwrap(),
            "`id` BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY"
        );
    }

    #[test]
    fn render_unique_with_default() {
        let col = ColumnDef::new("status", "VARCHAR")
            .size("32")
            .not_null()
            .default_literal("'pending'")
            .unique();
        assert_eq!(
            col.render().unwrap(),
            "`status` VARCHAR(32) NOT NULL DEFAULT 'pending' UNIQUE"
        );
    }

    #[test]
    fn render_decimal_precision() {
        let col = ColumnDef::new("price", "DECIMAL").size("10,2");
        assert_eq!(col.render().unwrap(), "`price` DECIMAL(10,2)");
    }

    #[test]
    fn rejects_bad_size() {
        let col = ColumnDef::new("price", "DECIMAL").size("10,2,3");
        assert!(matches!(col.render(), Err(OrmError::Validation(_))));
        let col = ColumnDef::new("price", "DECIMAL").size("abc");
        assert!(matches!(col.render(), Err(OrmError::Validation(_))));
    }

    #[test]
    fn rejects_bad_type_token() {
        let col = ColumnDef::new("x", "INT; DROP TABLE t");
        assert!(matches!(col.render(), Err(OrmError::Validation(_))));
    }

    #[test]
    fn rejects_bad_name() {
        let col = ColumnDef::new("1bad", "INT");
        assert!(matches!(col.render(), Err(OrmError::Validation(_))));
    }
}
