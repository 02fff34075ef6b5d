//! Expression tree for predicates, values and computed columns.
//!
//! Every node is a variant of [`Expr`]. Rendering goes through
//! [`Expr::render`] with a [`RenderContext`], which supplies table aliases and
//! the dialect. Each node also reports whether it is *simple*: a simple node
//! renders as one token and is embedded without parentheses; anything else is
//! wrapped when it appears as an operand.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let t = ReferencedTable::new(&users);
//! let cond = t.field("age")?.gte(18).and(t.field("status")?.eq("active"));
//! // users.users_age >= 18 and users.users_status = 'active'
//! ```

mod case;
mod value;

pub use case::CaseExpr;
pub use value::SqlValue;

use crate::context::RenderContext;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::format::{fits_inline, indent_tail, paren_list};
use crate::schema::FieldRef;
use crate::stmt::Select;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Like => "like",
        }
    }
}

/// AND / OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

/// Right-hand side of IN / NOT IN.
#[derive(Debug, Clone)]
pub enum InSet {
    List(Vec<Expr>),
    Subquery(Box<Select>),
}

/// Expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal value.
    Value(SqlValue),
    /// SQL text passed through unchanged.
    Raw(String),
    /// Named parameter, rendered with the dialect's placeholder syntax.
    Param(String),
    /// Explicit parentheses.
    Paren(Box<Expr>),
    /// Field reference (`alias.column`).
    Field(FieldRef),
    /// Field read through its dialect transform (decrypt, hash, ...).
    FieldValue {
        field: FieldRef,
        value: Option<Box<Expr>>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// AND / OR over one or more operands.
    Logical { op: LogicalOp, operands: Vec<Expr> },
    Not(Box<Expr>),
    NullCheck { expr: Box<Expr>, negated: bool },
    In {
        left: Box<Expr>,
        set: InSet,
        negated: bool,
    },
    /// `name(expr)`: count, min, max, sum, avg or any named aggregate.
    Aggregate { name: String, expr: Box<Expr> },
    /// `name(arg, ...)`.
    Function { name: String, args: Vec<Expr> },
    Case(CaseExpr),
    /// Parenthesized value tuple.
    List(Vec<Expr>),
    /// NVL / COALESCE, rendered by the dialect.
    Nvl {
        value: Box<Expr>,
        fallback: Box<Expr>,
    },
    /// `expr as "alias"`.
    Alias { expr: Box<Expr>, alias: String },
    /// Scalar subquery.
    Subquery(Box<Select>),
}

impl Expr {
    /// AND over `operands`; fails when there are none.
    pub fn all(operands: Vec<Expr>) -> SqlResult<Expr> {
        Self::logical(LogicalOp::And, operands)
    }

    /// OR over `operands`; fails when there are none.
    pub fn any(operands: Vec<Expr>) -> SqlResult<Expr> {
        Self::logical(LogicalOp::Or, operands)
    }

    fn logical(op: LogicalOp, operands: Vec<Expr>) -> SqlResult<Expr> {
        if operands.is_empty() {
            return Err(SqlError::invalid_expression(format!(
                "'{}' requires at least one operand",
                op.as_str()
            )));
        }
        Ok(Expr::Logical { op, operands })
    }

    pub fn binary(left: impl IntoExpr, op: BinaryOp, right: impl IntoExpr) -> Expr {
        Expr::Binary {
            left: Box::new(left.into_expr()),
            op,
            right: Box::new(right.into_expr()),
        }
    }

    /// Whether the node renders as a single token.
    pub fn is_simple(&self) -> bool {
        match self {
            Expr::Value(_)
            | Expr::Raw(_)
            | Expr::Param(_)
            | Expr::Paren(_)
            | Expr::Aggregate { .. }
            | Expr::Function { .. }
            | Expr::List(_)
            | Expr::Nvl { .. } => true,
            Expr::Field(field) => field.is_simple(),
            Expr::FieldValue { field, value } => match value {
                _ if field.read_is_transformed() => false,
                Some(v) => v.is_simple(),
                None => true,
            },
            Expr::Alias { expr, .. } => expr.is_simple(),
            Expr::Binary { .. }
            | Expr::Logical { .. }
            | Expr::Not(_)
            | Expr::NullCheck { .. }
            | Expr::In { .. }
            | Expr::Case(_)
            | Expr::Subquery(_) => false,
        }
    }

    /// Whether the rendered text already carries its own outer parentheses.
    fn is_self_parenthesized(&self) -> bool {
        match self {
            Expr::Paren(_) | Expr::List(_) | Expr::Subquery(_) => true,
            Expr::Field(field) => field.is_calculated(),
            Expr::FieldValue { field, value } => match value {
                _ if field.is_calculated() => true,
                Some(v) if !field.read_is_transformed() => v.is_self_parenthesized(),
                _ => false,
            },
            _ => false,
        }
    }

    /// Render with a fresh context.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> SqlResult<String> {
        let mut ctx = RenderContext::new(dialect);
        self.render(&mut ctx)
    }

    /// Render as an operand: wrapped in parentheses unless simple.
    pub(crate) fn to_operand_sql(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let sql = self.render(ctx)?;
        if self.is_simple() || self.is_self_parenthesized() {
            Ok(sql)
        } else {
            Ok(format!("({sql})"))
        }
    }

    /// Render with exactly one pair of outer parentheses.
    pub(crate) fn to_paren_sql(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let sql = self.render(ctx)?;
        if self.is_self_parenthesized() {
            Ok(sql)
        } else {
            Ok(format!("({sql})"))
        }
    }

    /// Render against a shared context.
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        match self {
            Expr::Value(v) => v.to_sql(),
            Expr::Raw(sql) => Ok(sql.clone()),
            Expr::Param(name) => Ok(ctx.dialect().named_parameter(name)),
            Expr::Paren(inner) => Ok(format!("({})", inner.render(ctx)?)),
            Expr::Field(field) => field.to_reference_sql(ctx),
            Expr::FieldValue { field, value } => field.read_value_sql(value.as_deref(), ctx),
            Expr::Binary { left, op, right } => {
                let l = left.to_operand_sql(ctx)?;
                let r = right.to_operand_sql(ctx)?;
                Ok(format!("{l} {} {r}", op.as_str()))
            }
            Expr::Logical { op, operands } => render_logical(*op, operands, ctx),
            Expr::Not(inner) => Ok(format!("not {}", inner.to_paren_sql(ctx)?)),
            Expr::NullCheck { expr, negated } => {
                let sql = expr.to_operand_sql(ctx)?;
                if *negated {
                    Ok(format!("{sql} is not null"))
                } else {
                    Ok(format!("{sql} is null"))
                }
            }
            Expr::In { left, set, negated } => {
                let l = left.to_operand_sql(ctx)?;
                let r = match set {
                    InSet::List(items) => render_list(items, ctx)?,
                    InSet::Subquery(select) => select.render_scalar(ctx)?,
                };
                let op = if *negated { "not in" } else { "in" };
                Ok(format!("{l} {op} {r}"))
            }
            Expr::Aggregate { name, expr } => Ok(format!("{name}({})", expr.render(ctx)?)),
            Expr::Function { name, args } => {
                let args = args
                    .iter()
                    .map(|a| a.render(ctx))
                    .collect::<SqlResult<Vec<_>>>()?;
                Ok(format!("{name}({})", args.join(", ")))
            }
            Expr::Case(case) => case.render(ctx),
            Expr::List(items) => render_list(items, ctx),
            Expr::Nvl { value, fallback } => {
                let v = value.render(ctx)?;
                let f = fallback.render(ctx)?;
                Ok(ctx.dialect().null_value(&v, &f))
            }
            Expr::Alias { expr, alias } => Ok(format!("{} as \"{alias}\"", expr.render(ctx)?)),
            Expr::Subquery(select) => select.render_scalar(ctx),
        }
    }
}

fn render_list(items: &[Expr], ctx: &mut RenderContext<'_>) -> SqlResult<String> {
    let parts = items
        .iter()
        .map(|e| e.to_operand_sql(ctx))
        .collect::<SqlResult<Vec<_>>>()?;
    Ok(paren_list(&parts))
}

fn render_logical(
    op: LogicalOp,
    operands: &[Expr],
    ctx: &mut RenderContext<'_>,
) -> SqlResult<String> {
    if operands.is_empty() {
        return Err(SqlError::invalid_expression(format!(
            "'{}' requires at least one operand",
            op.as_str()
        )));
    }
    let keyword = op.as_str();
    let parts = operands
        .iter()
        .map(|e| match e {
            Expr::Logical { .. } => Ok(format!("({})", e.render(ctx)?)),
            _ => e.render(ctx),
        })
        .collect::<SqlResult<Vec<_>>>()?;

    let sep = format!(" {keyword} ");
    if fits_inline(&parts, &sep, 0) {
        return Ok(parts.join(&sep));
    }
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(keyword);
            out.push(' ');
            out.push_str(&indent_tail(part));
        } else {
            out.push_str(part);
        }
    }
    Ok(out)
}

/// Anything that converts into an expression node.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for FieldRef {
    fn into_expr(self) -> Expr {
        Expr::Field(self)
    }
}

impl IntoExpr for &FieldRef {
    fn into_expr(self) -> Expr {
        Expr::Field(self.clone())
    }
}

impl IntoExpr for SqlValue {
    fn into_expr(self) -> Expr {
        Expr::Value(self)
    }
}

impl IntoExpr for Select {
    fn into_expr(self) -> Expr {
        Expr::Subquery(Box::new(self))
    }
}

impl IntoExpr for CaseExpr {
    fn into_expr(self) -> Expr {
        Expr::Case(self)
    }
}

impl<T: IntoExpr> IntoExpr for Option<T> {
    fn into_expr(self) -> Expr {
        match self {
            Some(v) => v.into_expr(),
            None => Expr::Value(SqlValue::Null),
        }
    }
}

macro_rules! impl_into_expr_for_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoExpr for $t {
                fn into_expr(self) -> Expr {
                    Expr::Value(SqlValue::from(self))
                }
            }
        )*
    };
}

impl_into_expr_for_value!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    bool,
    &str,
    String,
    DateTime<Utc>,
    Vec<u8>,
    Uuid,
    serde_json::Value,
);

/// Operator methods shared by expressions and field references.
pub trait ExprExt: IntoExpr + Sized {
    fn eq(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Eq, rhs)
    }

    fn ne(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Ne, rhs)
    }

    fn lt(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Lt, rhs)
    }

    fn lte(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Lte, rhs)
    }

    fn gt(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Gt, rhs)
    }

    fn gte(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Gte, rhs)
    }

    fn like(self, pattern: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Like, pattern)
    }

    fn add(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Add, rhs)
    }

    fn sub(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Sub, rhs)
    }

    fn mul(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Mul, rhs)
    }

    fn div(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Div, rhs)
    }

    fn rem(self, rhs: impl IntoExpr) -> Expr {
        Expr::binary(self, BinaryOp::Rem, rhs)
    }

    /// `self and rhs`; chained calls extend one AND group.
    fn and(self, rhs: impl IntoExpr) -> Expr {
        chain(LogicalOp::And, self.into_expr(), rhs.into_expr())
    }

    /// `self or rhs`; chained calls extend one OR group.
    fn or(self, rhs: impl IntoExpr) -> Expr {
        chain(LogicalOp::Or, self.into_expr(), rhs.into_expr())
    }

    fn not(self) -> Expr {
        Expr::Not(Box::new(self.into_expr()))
    }

    fn is_null(self) -> Expr {
        Expr::NullCheck {
            expr: Box::new(self.into_expr()),
            negated: false,
        }
    }

    fn is_not_null(self) -> Expr {
        Expr::NullCheck {
            expr: Box::new(self.into_expr()),
            negated: true,
        }
    }

    fn in_list<I, T>(self, items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        Expr::In {
            left: Box::new(self.into_expr()),
            set: InSet::List(items.into_iter().map(IntoExpr::into_expr).collect()),
            negated: false,
        }
    }

    fn not_in<I, T>(self, items: I) -> Expr
    where
        I: IntoIterator<Item = T>,
        T: IntoExpr,
    {
        Expr::In {
            left: Box::new(self.into_expr()),
            set: InSet::List(items.into_iter().map(IntoExpr::into_expr).collect()),
            negated: true,
        }
    }

    fn in_select(self, select: Select) -> Expr {
        Expr::In {
            left: Box::new(self.into_expr()),
            set: InSet::Subquery(Box::new(select)),
            negated: false,
        }
    }

    fn not_in_select(self, select: Select) -> Expr {
        Expr::In {
            left: Box::new(self.into_expr()),
            set: InSet::Subquery(Box::new(select)),
            negated: true,
        }
    }

    fn alias(self, alias: impl Into<String>) -> Expr {
        Expr::Alias {
            expr: Box::new(self.into_expr()),
            alias: alias.into(),
        }
    }

    fn asc(self) -> OrderBy {
        OrderBy::asc(self)
    }

    fn desc(self) -> OrderBy {
        OrderBy::desc(self)
    }
}

impl ExprExt for Expr {}
impl ExprExt for FieldRef {}

fn chain(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    match left {
        Expr::Logical {
            op: existing,
            mut operands,
        } if existing == op => {
            operands.push(right);
            Expr::Logical { op, operands }
        }
        left => Expr::Logical {
            op,
            operands: vec![left, right],
        },
    }
}

/// ORDER BY item.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub expr: Expr,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(expr: impl IntoExpr) -> Self {
        Self {
            expr: expr.into_expr(),
            descending: false,
        }
    }

    pub fn desc(expr: impl IntoExpr) -> Self {
        Self {
            expr: expr.into_expr(),
            descending: true,
        }
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let sql = self.expr.render(ctx)?;
        if self.descending {
            Ok(format!("{sql} desc"))
        } else {
            Ok(sql)
        }
    }
}

impl From<FieldRef> for OrderBy {
    fn from(field: FieldRef) -> Self {
        OrderBy::asc(field)
    }
}

impl From<&FieldRef> for OrderBy {
    fn from(field: &FieldRef) -> Self {
        OrderBy::asc(field)
    }
}

impl From<Expr> for OrderBy {
    fn from(expr: Expr) -> Self {
        OrderBy::asc(expr)
    }
}

// ==================== Constructors ====================

/// Literal value.
pub fn val(value: impl Into<SqlValue>) -> Expr {
    Expr::Value(value.into())
}

/// SQL text passed through unchanged.
pub fn raw(sql: impl Into<String>) -> Expr {
    Expr::Raw(sql.into())
}

/// Named parameter.
pub fn param(name: impl Into<String>) -> Expr {
    Expr::Param(name.into())
}

pub fn paren(expr: impl IntoExpr) -> Expr {
    Expr::Paren(Box::new(expr.into_expr()))
}

/// Parenthesized value tuple.
pub fn list<I, T>(items: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: IntoExpr,
{
    Expr::List(items.into_iter().map(IntoExpr::into_expr).collect())
}

/// Named aggregate, e.g. `aggregate("string_agg", ...)`.
pub fn aggregate(name: impl Into<String>, expr: impl IntoExpr) -> Expr {
    Expr::Aggregate {
        name: name.into(),
        expr: Box::new(expr.into_expr()),
    }
}

pub fn count(expr: impl IntoExpr) -> Expr {
    aggregate("count", expr)
}

/// `count(*)`
pub fn count_all() -> Expr {
    aggregate("count", raw("*"))
}

pub fn min(expr: impl IntoExpr) -> Expr {
    aggregate("min", expr)
}

pub fn max(expr: impl IntoExpr) -> Expr {
    aggregate("max", expr)
}

pub fn sum(expr: impl IntoExpr) -> Expr {
    aggregate("sum", expr)
}

pub fn avg(expr: impl IntoExpr) -> Expr {
    aggregate("avg", expr)
}

/// Function call `name(args...)`.
pub fn func<I, T>(name: impl Into<String>, args: I) -> Expr
where
    I: IntoIterator<Item = T>,
    T: IntoExpr,
{
    Expr::Function {
        name: name.into(),
        args: args.into_iter().map(IntoExpr::into_expr).collect(),
    }
}

/// NVL / COALESCE of `value` and `fallback`.
pub fn nvl(value: impl IntoExpr, fallback: impl IntoExpr) -> Expr {
    Expr::Nvl {
        value: Box::new(value.into_expr()),
        fallback: Box::new(fallback.into_expr()),
    }
}

/// Start a CASE expression.
pub fn case() -> CaseExpr {
    CaseExpr::new()
}

#[cfg(test)]
mod tests;
