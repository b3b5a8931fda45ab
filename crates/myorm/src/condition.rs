//! Parameterized WHERE-condition building.
//!
//! [`ConditionBuilder`] accumulates an ordered list of conditions and renders
//! them into a single WHERE fragment with `:name` placeholders, tracking a
//! name-to-value parameter list. The connective supplied with condition *i*
//! governs the join between condition *i-1* and condition *i*; no connective
//! is ever emitted before the first fragment.
//!
//! Placeholder names derive from the column name with `.` replaced by `_`.
//! Conditioning the same column twice binds each occurrence under its own
//! suffixed name (`age`, `age_2`, ...) so no earlier value is silently
//! overwritten.

use crate::error::OrmResult;
use crate::expr::{BinOp, Expr, ExprContext};
use crate::ident::Ident;
use crate::value::IntoValue;
use mysql_async::Value;
use std::collections::HashMap;

/// Logical joiner between two condition fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn token(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// Allocates unique placeholder names within one statement.
#[derive(Debug, Default)]
pub(crate) struct ParamNamer {
    used: HashMap<String, usize>,
}

impl ParamNamer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Claim a name. The first use of a base name gets it verbatim; later
    /// uses get a numeric suffix (`age`, `age_2`, `age_3`, ...).
    ///
    /// Suffixed names are registered too, so a column literally named
    /// `age_2` cannot share a placeholder with the suffixed second `age`.
    pub(crate) fn claim(&mut self, base: &str) -> String {
        let count = {
            let count = self.used.entry(base.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if count == 1 {
            return base.to_string();
        }
        let mut n = count;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.used.contains_key(&candidate) {
                self.used.insert(candidate.clone(), 1);
                return candidate;
            }
            n += 1;
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Cmp {
        column: String,
        op: BinOp,
        value: Value,
        connective: Connective,
    },
    Expr {
        expr: Expr,
        connective: Connective,
    },
    Raw {
        sql: String,
        connective: Connective,
    },
}

/// Accumulates conditions and renders a WHERE fragment with named parameters.
#[derive(Debug, Clone, Default)]
pub struct ConditionBuilder {
    entries: Vec<Entry>,
}

impl ConditionBuilder {
    /// Create an empty condition builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any condition has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a comparison condition joined with `AND`.
    pub fn add<V: IntoValue>(&mut self, column: &str, op: BinOp, value: V) -> &mut Self {
        self.add_with(column, op, value, Connective::And)
    }

    /// Add a comparison condition with an explicit connective.
    ///
    /// The connective joins this condition to the previous one and is ignored
    /// for the first condition.
    pub fn add_with<V: IntoValue>(
        &mut self,
        column: &str,
        op: BinOp,
        value: V,
        connective: Connective,
    ) -> &mut Self {
        self.entries.push(Entry::Cmp {
            column: column.to_string(),
            op,
            value: value.into_value(),
            connective,
        });
        self
    }

    /// Add a filter expression tree, rendered inline with escaped literals.
    pub fn add_expr(&mut self, expr: Expr, connective: Connective) -> &mut Self {
        self.entries.push(Entry::Expr { expr, connective });
        self
    }

    /// Add a raw SQL fragment.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw fragments.
    pub fn add_raw(&mut self, sql: impl Into<String>, connective: Connective) -> &mut Self {
        self.entries.push(Entry::Raw {
            sql: sql.into(),
            connective,
        });
        self
    }

    /// Build the WHERE fragment (without the `WHERE` keyword) and its
    /// parameter bindings.
    ///
    /// Returns an empty string and no parameters when no conditions were
    /// added; callers must omit the `WHERE` keyword in that case.
    pub fn build(&self) -> OrmResult<(String, Vec<(String, Value)>)> {
        let mut namer = ParamNamer::new();
        let mut params = Vec::new();
        let sql = self.render(&mut namer, &mut params)?;
        Ok((sql, params))
    }

    /// Render into an existing namer/parameter list, so a statement can share
    /// placeholder names between its SET and WHERE clauses.
    pub(crate) fn render(
        &self,
        namer: &mut ParamNamer,
        params: &mut Vec<(String, Value)>,
    ) -> OrmResult<String> {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let connective = match entry {
                Entry::Cmp { connective, .. }
                | Entry::Expr { connective, .. }
                | Entry::Raw { connective, .. } => *connective,
            };
            if i > 0 {
                out.push(' ');
                out.push_str(connective.token());
                out.push(' ');
            }
            match entry {
                Entry::Cmp {
                    column, op, value, ..
                } => {
                    let ident = Ident::parse(column)?;
                    let token = op.comparison_token()?;
                    let name = namer.claim(&ident.param_name());
                    ident.write_sql(&mut out);
                    out.push(' ');
                    out.push_str(token);
                    out.push_str(" :");
                    out.push_str(&name);
                    params.push((name, value.clone()));
                }
                Entry::Expr { expr, .. } => {
                    out.push_str(&expr.render(ExprContext::Filter)?);
                }
                Entry::Raw { sql, .. } => {
                    out.push_str(sql);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    #[test]
    fn empty_builder_renders_empty() {
        let cb = ConditionBuilder::new();
        let (sql, params) = cb.build().unwrap();
        assert_eq!(sql, "");
        assert!(params.is_empty());
    }

    #[test]
    fn single_condition_has_no_connective() {
        let mut cb = ConditionBuilder::new();
        cb.add("status", BinOp::Eq, "active");
        let (sql, params) = cb.build().unwrap();
        assert_eq!(sql, "`status` = :status");
        assert_eq!(params, vec![("status".to_string(), "active".into_value())]);
    }

    #[test]
    fn connective_sits_between_fragments() {
        let mut cb = ConditionBuilder::new();
        cb.add("status", BinOp::Eq, "active")
            .add_with("age", BinOp::Gte, 18, Connective::Or)
            .add("verified", BinOp::Eq, true);
        let (sql, _) = cb.build().unwrap();
        assert_eq!(
            sql,
            "`status` = :status OR `age` >= :age AND `verified` = :verified"
        );
    }

    #[test]
    fn first_connective_is_ignored() {
        let mut cb = ConditionBuilder::new();
        cb.add_with("age", BinOp::Gt, 18, Connective::Or);
        let (sql, _) = cb.build().unwrap();
        assert_eq!(sql, "`age` > :age");
    }

    #[test]
    fn dotted_column_param_name() {
        let mut cb = ConditionBuilder::new();
        cb.add("u.age", BinOp::Lt, 65);
        let (sql, params) = cb.build().unwrap();
        assert_eq!(sql, "`u`.`age` < :u_age");
        assert_eq!(params[0].0, "u_age");
    }

    #[test]
    fn colliding_columns_get_distinct_placeholders() {
        // A range over one column must bind both endpoints.
        let mut cb = ConditionBuilder::new();
        cb.add("age", BinOp::Gte, 18).add("age", BinOp::Lte, 65);
        let (sql, params) = cb.build().unwrap();
        assert_eq!(sql, "`age` >= :age AND `age` <= :age_2");
        assert_eq!(
            params,
            vec![
                ("age".to_string(), Value::Int(18)),
                ("age_2".to_string(), Value::Int(65)),
            ]
        );
    }

    #[test]
    fn suffixed_placeholder_cannot_shadow_real_column() {
        // A column literally named `age_2` must not share the placeholder
        // generated for the second condition on `age`.
        let mut cb = ConditionBuilder::new();
        cb.add("age", BinOp::Gte, 18)
            .add("age", BinOp::Lte, 65)
            .add("age_2", BinOp::Eq, 99);
        let (sql, params) = cb.build().unwrap();
        assert_eq!(
            sql,
            "`age` >= :age AND `age` <= :age_2 AND `age_2` = :age_2_2"
        );
        assert_eq!(
            params,
            vec![
                ("age".to_string(), Value::Int(18)),
                ("age_2".to_string(), Value::Int(65)),
                ("age_2_2".to_string(), Value::Int(99)),
            ]
        );
        let names: std::collections::HashSet<_> = params.iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), params.len());
    }

    #[test]
    fn real_column_claimed_before_suffix_is_collision_free() {
        let mut cb = ConditionBuilder::new();
        cb.add("age_2", BinOp::Eq, 99)
            .add("age", BinOp::Gte, 18)
            .add("age", BinOp::Lte, 65);
        let (sql, params) = cb.build().unwrap();
        assert_eq!(
            sql,
            "`age_2` = :age_2 AND `age` >= :age AND `age` <= :age_3"
        );
        assert_eq!(params[2], ("age_3".to_string(), Value::Int(65)));
    }

    #[test]
    fn expr_entry_renders_inline() {
        let mut cb = ConditionBuilder::new();
        cb.add("status", BinOp::Eq, "active").add_expr(
            Expr::group(
                Expr::col("role")
                    .eq(Expr::val("admin"))
                    .or(Expr::col("role").eq(Expr::val("owner"))),
            ),
            Connective::And,
        );
        let (sql, params) = cb.build().unwrap();
        assert_eq!(
            sql,
            "`status` = :status AND (`role` = 'admin' OR `role` = 'owner')"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn logical_op_rejected_as_comparison() {
        let mut cb = ConditionBuilder::new();
        cb.add("a", BinOp::And, 1);
        assert!(matches!(
            cb.build(),
            Err(OrmError::UnsupportedOperator { op: "And", .. })
        ));
    }

    #[test]
    fn invalid_column_rejected() {
        let mut cb = ConditionBuilder::new();
        cb.add("1 OR 1=1", BinOp::Eq, 1);
        assert!(matches!(cb.build(), Err(OrmError::Validation(_))));
    }
}
