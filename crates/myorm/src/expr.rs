//! Expression tree and SQL translation.
//!
//! [`Expr`] is a tagged union over constants, column references, binary
//! operations, negation, and explicit grouping. [`Expr::render`] walks the
//! tree recursively and produces a SQL fragment, looking operator tokens up
//! in the operator table selected by [`ExprContext`]:
//!
//! - [`ExprContext::Filter`] — WHERE-style comparisons plus AND/OR
//! - [`ExprContext::UpdateAssign`] — UPDATE SET arithmetic plus `=`
//! - [`ExprContext::DuplicateKeyAssign`] — ON DUPLICATE KEY arithmetic only
//!
//! A single recursive renderer parameterized by the table keeps the three
//! call sites from duplicating tree-walking logic while still enforcing a
//! different allowed-operator set per context: looking up an operator absent
//! from the active table fails with [`OrmError::UnsupportedOperator`] before
//! any SQL text is produced.
//!
//! Constants render inline through the value formatter (strings escaped,
//! quotes doubled); parentheses appear only where the tree carries an
//! explicit [`Expr::Group`] node.

use crate::error::{OrmError, OrmResult};
use crate::ident::Ident;
use crate::value::{IntoValue, sql_literal};
use mysql_async::Value;

/// Binary operator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinOp {
    /// Operator kind name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            BinOp::Eq => "Eq",
            BinOp::Ne => "Ne",
            BinOp::Gt => "Gt",
            BinOp::Gte => "Gte",
            BinOp::Lt => "Lt",
            BinOp::Lte => "Lte",
            BinOp::And => "And",
            BinOp::Or => "Or",
            BinOp::Add => "Add",
            BinOp::Sub => "Sub",
            BinOp::Mul => "Mul",
            BinOp::Div => "Div",
            BinOp::Mod => "Mod",
        }
    }

    /// Token for the comparison subset (used by parameterized conditions).
    ///
    /// Logical and arithmetic kinds are not comparisons and fail here.
    pub fn comparison_token(self) -> OrmResult<&'static str> {
        match self {
            BinOp::Eq => Ok("="),
            BinOp::Ne => Ok("!="),
            BinOp::Gt => Ok(">"),
            BinOp::Gte => Ok(">="),
            BinOp::Lt => Ok("<"),
            BinOp::Lte => Ok("<="),
            other => Err(OrmError::UnsupportedOperator {
                op: other.name(),
                context: "condition",
            }),
        }
    }
}

/// Operator-table selector for expression translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    /// WHERE clauses: comparisons and logical composition.
    Filter,
    /// UPDATE SET assignments: arithmetic and equality.
    UpdateAssign,
    /// ON DUPLICATE KEY UPDATE assignments: arithmetic only.
    DuplicateKeyAssign,
}

impl ExprContext {
    fn name(self) -> &'static str {
        match self {
            ExprContext::Filter => "filter",
            ExprContext::UpdateAssign => "update assignment",
            ExprContext::DuplicateKeyAssign => "duplicate-key assignment",
        }
    }

    /// Look up the SQL token for an operator in this context's table.
    pub fn token(self, op: BinOp) -> OrmResult<&'static str> {
        let token = match self {
            ExprContext::Filter => match op {
                BinOp::Eq => Some("="),
                BinOp::Ne => Some("!="),
                BinOp::Gt => Some(">"),
                BinOp::Gte => Some(">="),
                BinOp::Lt => Some("<"),
                BinOp::Lte => Some("<="),
                BinOp::And => Some("AND"),
                BinOp::Or => Some("OR"),
                _ => None,
            },
            ExprContext::UpdateAssign => match op {
                BinOp::Add => Some("+"),
                BinOp::Sub => Some("-"),
                BinOp::Mul => Some("*"),
                BinOp::Div => Some("/"),
                BinOp::Mod => Some("%"),
                BinOp::Eq => Some("="),
                _ => None,
            },
            ExprContext::DuplicateKeyAssign => match op {
                BinOp::Add => Some("+"),
                BinOp::Sub => Some("-"),
                BinOp::Mul => Some("*"),
                BinOp::Div => Some("/"),
                BinOp::Mod => Some("%"),
                _ => None,
            },
        };
        token.ok_or(OrmError::UnsupportedOperator {
            op: op.name(),
            context: self.name(),
        })
    }
}

/// Expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Constant value, rendered through the value formatter.
    Value(Value),
    /// Column reference, rendered as a backtick-quoted identifier.
    Column(String),
    /// Binary operation.
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// Logical negation: `NOT` + operand.
    Not(Box<Expr>),
    /// Explicit parenthesized grouping.
    Group(Box<Expr>),
}

impl Expr {
    /// A column reference.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    /// A constant value.
    pub fn val<V: IntoValue>(value: V) -> Self {
        Expr::Value(value.into_value())
    }

    /// Negate an expression: `NOT expr`.
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Parenthesize an expression.
    pub fn group(expr: Expr) -> Self {
        Expr::Group(Box::new(expr))
    }

    fn binary(self, op: BinOp, rhs: Expr) -> Self {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(rhs),
        }
    }

    /// `self = rhs`
    pub fn eq(self, rhs: Expr) -> Self {
        self.binary(BinOp::Eq, rhs)
    }

    /// `self != rhs`
    pub fn ne(self, rhs: Expr) -> Self {
        self.binary(BinOp::Ne, rhs)
    }

    /// `self > rhs`
    pub fn gt(self, rhs: Expr) -> Self {
        self.binary(BinOp::Gt, rhs)
    }

    /// `self >= rhs`
    pub fn gte(self, rhs: Expr) -> Self {
        self.binary(BinOp::Gte, rhs)
    }

    /// `self < rhs`
    pub fn lt(self, rhs: Expr) -> Self {
        self.binary(BinOp::Lt, rhs)
    }

    /// `self <= rhs`
    pub fn lte(self, rhs: Expr) -> Self {
        self.binary(BinOp::Lte, rhs)
    }

    /// `self AND rhs`
    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinOp::And, rhs)
    }

    /// `self OR rhs`
    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinOp::Or, rhs)
    }

    /// `self + rhs`
    pub fn add(self, rhs: Expr) -> Self {
        self.binary(BinOp::Add, rhs)
    }

    /// `self - rhs`
    pub fn sub(self, rhs: Expr) -> Self {
        self.binary(BinOp::Sub, rhs)
    }

    /// `self * rhs`
    pub fn mul(self, rhs: Expr) -> Self {
        self.binary(BinOp::Mul, rhs)
    }

    /// `self / rhs`
    pub fn div(self, rhs: Expr) -> Self {
        self.binary(BinOp::Div, rhs)
    }

    /// `self % rhs`
    pub fn rem(self, rhs: Expr) -> Self {
        self.binary(BinOp::Mod, rhs)
    }

    /// Render this expression tree as a SQL fragment for the given context.
    pub fn render(&self, ctx: ExprContext) -> OrmResult<String> {
        match self {
            Expr::Value(v) => Ok(sql_literal(v)),
            Expr::Column(name) => Ok(Ident::parse(name)?.to_sql()),
            Expr::Binary { left, op, right } => {
                let token = ctx.token(*op)?;
                Ok(format!("{} {} {}", left.render(ctx)?, token, right.render(ctx)?))
            }
            Expr::Not(inner) => Ok(format!("NOT {}", inner.render(ctx)?)),
            Expr::Group(inner) => Ok(format!("({})", inner.render(ctx)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_update_assignment() {
        let expr = Expr::col("age").add(Expr::val(1));
        let sql = expr.render(ExprContext::UpdateAssign).unwrap();
        assert_eq!(sql, "`age` + 1");
    }

    #[test]
    fn filter_comparison_with_string_literal() {
        let expr = Expr::col("name").eq(Expr::val("O'Brien"));
        let sql = expr.render(ExprContext::Filter).unwrap();
        assert_eq!(sql, "`name` = 'O''Brien'");
    }

    #[test]
    fn or_with_grouped_and() {
        // verified == false || (password != "1" && verified == true)
        let expr = Expr::col("verified").eq(Expr::val(false)).or(Expr::group(
            Expr::col("password")
                .ne(Expr::val("1"))
                .and(Expr::col("verified").eq(Expr::val(true))),
        ));
        let sql = expr.render(ExprContext::Filter).unwrap();
        assert_eq!(
            sql,
            "`verified` = 0 OR (`password` != '1' AND `verified` = 1)"
        );
    }

    #[test]
    fn no_parens_without_group_node() {
        // Tree shape carries precedence; rendering adds no brackets of its own.
        let expr = Expr::col("a")
            .eq(Expr::val(1))
            .or(Expr::col("b").eq(Expr::val(2)).and(Expr::col("c").eq(Expr::val(3))));
        let sql = expr.render(ExprContext::Filter).unwrap();
        assert_eq!(sql, "`a` = 1 OR `b` = 2 AND `c` = 3");
    }

    #[test]
    fn not_prefixes_operand() {
        let expr = Expr::not(Expr::group(Expr::col("banned").eq(Expr::val(true))));
        let sql = expr.render(ExprContext::Filter).unwrap();
        assert_eq!(sql, "NOT (`banned` = 1)");
    }

    #[test]
    fn dotted_column_is_quoted_per_part() {
        let expr = Expr::col("u.age").gte(Expr::val(18));
        let sql = expr.render(ExprContext::Filter).unwrap();
        assert_eq!(sql, "`u`.`age` >= 18");
    }

    #[test]
    fn logical_or_rejected_in_update_assignment() {
        let expr = Expr::col("a").eq(Expr::val(1)).or(Expr::col("b").eq(Expr::val(2)));
        let err = expr.render(ExprContext::UpdateAssign).unwrap_err();
        assert!(matches!(
            err,
            OrmError::UnsupportedOperator { op: "Or", .. }
        ));
    }

    #[test]
    fn equality_rejected_in_duplicate_key_assignment() {
        let expr = Expr::col("a").eq(Expr::val(1));
        let err = expr.render(ExprContext::DuplicateKeyAssign).unwrap_err();
        assert!(matches!(
            err,
            OrmError::UnsupportedOperator { op: "Eq", .. }
        ));
    }

    #[test]
    fn arithmetic_rejected_in_filter() {
        let expr = Expr::col("a").add(Expr::val(1));
        let err = expr.render(ExprContext::Filter).unwrap_err();
        assert!(matches!(
            err,
            OrmError::UnsupportedOperator { op: "Add", .. }
        ));
    }

    #[test]
    fn modulo_update_assignment() {
        let expr = Expr::col("n").eq(Expr::col("n").rem(Expr::val(10)));
        let sql = expr.render(ExprContext::UpdateAssign).unwrap();
        assert_eq!(sql, "`n` = `n` % 10");
    }

    #[test]
    fn invalid_column_fails_validation() {
        let expr = Expr::col("age; DROP TABLE users").gt(Expr::val(1));
        assert!(matches!(
            expr.render(ExprContext::Filter),
            Err(OrmError::Validation(_))
        ));
    }
}
