//! Derive macros for myorm
//!
//! Provides `#[derive(FromRow)]` and `#[derive(Model)]` macros.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_row;
mod model;

/// Derive `FromRow` trait for a struct.
///
/// # Example
///
/// ```ignore
/// use myorm::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Model` metadata for a struct.
///
/// # Example
///
/// ```ignore
/// use myorm::Model;
///
/// #[derive(Model)]
/// #[orm(table = "users")]
/// struct User {
///     #[orm(primary_key, auto_increment)]
///     id: i64,
///     username: String,
///     email: Option<String>,
/// }
/// ```
///
/// SQL types are inferred from field types (`i32` → INT, `i64` → BIGINT,
/// `String` → VARCHAR(255), `bool` → TINYINT(1), `NaiveDateTime` → DATETIME,
/// ...); `Option<T>` maps to a nullable column of the inner type. Fields of
/// a type with no inferred mapping require `sql_type = "..."`.
///
/// # Attributes
///
/// Struct level:
/// - `#[orm(table = "name")]` - Table name (default: snake_case struct name)
///
/// Field level:
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(sql_type = "TEXT")]` - Override the inferred SQL type token
/// - `#[orm(size = "64")]` - Type-size argument
/// - `#[orm(default = "'pending'")]` - DEFAULT literal, emitted verbatim
/// - `#[orm(primary_key)]`, `#[orm(auto_increment)]`, `#[orm(unique)]`,
///   `#[orm(not_null)]`, `#[orm(skip)]` - Column flags
#[proc_macro_derive(Model, attributes(orm))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    model::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
