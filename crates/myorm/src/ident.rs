//! Safe SQL identifier handling.
//!
//! This module provides [`Ident`] which represents a MySQL identifier
//! (schema/table/column), supporting dotted notation and backtick quoting.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Backtick-quoted parts allow any characters except NUL and escape
//!   `` ` `` as ``` `` ```
//!
//! Rendering always emits backtick-quoted parts, so `user.age` becomes
//! `` `user`.`age` ``.

use crate::error::{OrmError, OrmResult};

/// A MySQL identifier (column, table, or schema name).
///
/// Supports dotted notation (e.g., `db.table.column`) and backtick-quoted
/// parts (e.g., `` `weird name` ``).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Parse an identifier string, supporting dotted and backtick-quoted forms.
    ///
    /// - Dotted: `db.table.column`
    /// - Quoted: `` `CamelCase`.`User Table` ``
    /// - Mixed: `` mydb.`User Table`.id ``
    pub fn parse(s: &str) -> OrmResult<Self> {
        if s.is_empty() {
            return Err(OrmError::validation("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(OrmError::validation(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(OrmError::validation("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(OrmError::validation(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            // Backtick-quoted identifier part.
            if chars.peek() == Some(&'`') {
                chars.next(); // opening backtick
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('`') => {
                            // Escaped backtick: ``
                            if chars.peek() == Some(&'`') {
                                chars.next();
                                name.push('`');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(OrmError::validation("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(OrmError::validation("Empty quoted identifier"));
                }
                parts.push(name);
                continue;
            }

            // Unquoted identifier part.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if name.is_empty() {
                    // First char: letter or underscore.
                    if c == '_' || c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(OrmError::validation(format!(
                            "Invalid identifier start character: '{c}'"
                        )));
                    }
                } else {
                    // Subsequent chars: letter, digit, underscore, or $.
                    if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(OrmError::validation(format!(
                            "Invalid character in identifier: '{c}'"
                        )));
                    }
                }
            }
            if name.is_empty() {
                return Err(OrmError::validation("Empty identifier segment"));
            }
            parts.push(name);
        }

        if parts.is_empty() {
            return Err(OrmError::validation("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// Render the identifier as SQL, backtick-quoting every part.
    pub fn to_sql(&self) -> String {
        let mut cap = self.parts.len().saturating_sub(1); // dots
        for part in &self.parts {
            cap += part.len() + 2; // surrounding backticks (escapes may add more)
        }
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('`');
            for ch in part.chars() {
                if ch == '`' {
                    out.push('`');
                    out.push('`');
                } else {
                    out.push(ch);
                }
            }
            out.push('`');
        }
    }

    /// Derive a parameter name from this identifier: parts joined with `_`
    /// (so `user.age` yields `user_age`) and any character outside
    /// `[A-Za-z0-9_$]` replaced with `_`.
    pub fn param_name(&self) -> String {
        let mut out = String::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('_');
            }
            for ch in part.chars() {
                if ch == '_' || ch == '$' || ch.is_ascii_alphanumeric() {
                    out.push(ch);
                } else {
                    out.push('_');
                }
            }
        }
        if out.starts_with(|c: char| c.is_ascii_digit()) {
            out.insert(0, 'p');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::parse("users").unwrap();
        assert_eq!(ident.to_sql(), "`users`");
    }

    #[test]
    fn ident_dotted() {
        let ident = Ident::parse("mydb.users").unwrap();
        assert_eq!(ident.to_sql(), "`mydb`.`users`");
    }

    #[test]
    fn ident_quoted() {
        let ident = Ident::parse("`User Table`").unwrap();
        assert_eq!(ident.to_sql(), "`User Table`");
    }

    #[test]
    fn ident_quoted_with_escape() {
        let ident = Ident::parse("`has``tick`").unwrap();
        assert_eq!(ident.to_sql(), "`has``tick`");
    }

    #[test]
    fn ident_mixed_quoted_unquoted() {
        let ident = Ident::parse("mydb.`User Table`.id").unwrap();
        assert_eq!(ident.to_sql(), "`mydb`.`User Table`.`id`");
    }

    #[test]
    fn ident_with_dollar() {
        let ident = Ident::parse("my_var$1").unwrap();
        assert_eq!(ident.to_sql(), "`my_var$1`");
    }

    #[test]
    fn param_name_replaces_dots() {
        let ident = Ident::parse("user.age").unwrap();
        assert_eq!(ident.param_name(), "user_age");
    }

    #[test]
    fn param_name_sanitizes_quoted_parts() {
        let ident = Ident::parse("`User Table`.id").unwrap();
        assert_eq!(ident.param_name(), "User_Table_id");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("db..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("db.").is_err());
    }

    #[test]
    fn ident_rejects_unclosed_quote() {
        assert!(Ident::parse("`unclosed").is_err());
    }
}
