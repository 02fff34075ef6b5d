//! Equi-join trees.
//!
//! A [`Join`] connects two sides on a single field equality. Each side is a
//! field of a referenced table or a nested join together with the field the
//! equality uses, so chains of three or more tables nest to the left:
//!
//! ```ignore
//! let j = Join::inner(orders.field("customer_id")?, customers.field("id")?)
//!     .then_left(orders.field("id")?, items.field("order_id")?);
//! // (orders inner join customers on ...) left outer join items on ...
//! ```

use crate::context::RenderContext;
use crate::error::{SqlError, SqlResult};
use crate::format::indent;
use crate::schema::{FieldRef, ReferencedTable};
use std::fmt;
use std::str::FromStr;

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
}

impl JoinKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner join",
            JoinKind::LeftOuter => "left outer join",
            JoinKind::RightOuter => "right outer join",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for JoinKind {
    type Err = SqlError;

    /// Accepts `inner`, `left`, `left outer`, `right`, `right outer`, with or
    /// without a trailing `join`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        let kind = normalized.strip_suffix(" join").unwrap_or(&normalized);
        match kind {
            "inner" => Ok(JoinKind::Inner),
            "left" | "left outer" => Ok(JoinKind::LeftOuter),
            "right" | "right outer" => Ok(JoinKind::RightOuter),
            _ => Err(SqlError::UnexpectedJoinType(s.to_string())),
        }
    }
}

/// One side of a join.
#[derive(Debug, Clone)]
pub enum JoinSide {
    /// A table, joined on one of its fields.
    Field(FieldRef),
    /// A nested join, joined on a field of one of its tables.
    Nested { join: Box<Join>, field: FieldRef },
}

impl JoinSide {
    pub fn nested(join: Join, field: FieldRef) -> Self {
        JoinSide::Nested {
            join: Box::new(join),
            field,
        }
    }

    /// Field used in the `on` equality.
    pub fn field(&self) -> &FieldRef {
        match self {
            JoinSide::Field(field) | JoinSide::Nested { field, .. } => field,
        }
    }

    fn collect(&self, out: &mut Vec<ReferencedTable>) {
        match self {
            JoinSide::Field(field) => push_unique(out, field.table()),
            JoinSide::Nested { join, .. } => join.collect(out),
        }
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        match self {
            JoinSide::Field(field) => field.table().to_table_sql(ctx),
            JoinSide::Nested { join, field } => {
                if !join.participants().iter().any(|t| t.same_instance(field.table())) {
                    return Err(SqlError::invalid_statement(format!(
                        "join field '{}' does not belong to the nested join",
                        field.name()
                    )));
                }
                Ok(format!("(\n{}\n)", indent(&join.render(ctx)?)))
            }
        }
    }
}

impl From<FieldRef> for JoinSide {
    fn from(field: FieldRef) -> Self {
        JoinSide::Field(field)
    }
}

fn push_unique(out: &mut Vec<ReferencedTable>, table: &ReferencedTable) {
    if !out.iter().any(|t| t.same_instance(table)) {
        out.push(table.clone());
    }
}

/// Binary equi-join.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    left: JoinSide,
    right: JoinSide,
}

impl Join {
    pub fn new(kind: JoinKind, left: impl Into<JoinSide>, right: impl Into<JoinSide>) -> Self {
        Self {
            kind,
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn inner(left: impl Into<JoinSide>, right: impl Into<JoinSide>) -> Self {
        Self::new(JoinKind::Inner, left, right)
    }

    pub fn left_outer(left: impl Into<JoinSide>, right: impl Into<JoinSide>) -> Self {
        Self::new(JoinKind::LeftOuter, left, right)
    }

    pub fn right_outer(left: impl Into<JoinSide>, right: impl Into<JoinSide>) -> Self {
        Self::new(JoinKind::RightOuter, left, right)
    }

    /// Join this tree (on `left`, one of its fields) to `right`.
    pub fn then(self, kind: JoinKind, left: FieldRef, right: impl Into<JoinSide>) -> Self {
        Self::new(kind, JoinSide::nested(self, left), right)
    }

    pub fn then_inner(self, left: FieldRef, right: impl Into<JoinSide>) -> Self {
        self.then(JoinKind::Inner, left, right)
    }

    pub fn then_left(self, left: FieldRef, right: impl Into<JoinSide>) -> Self {
        self.then(JoinKind::LeftOuter, left, right)
    }

    pub fn then_right(self, left: FieldRef, right: impl Into<JoinSide>) -> Self {
        self.then(JoinKind::RightOuter, left, right)
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    pub fn left(&self) -> &JoinSide {
        &self.left
    }

    pub fn right(&self) -> &JoinSide {
        &self.right
    }

    /// Every table in the tree, left to right, each instance once.
    pub fn participants(&self) -> Vec<ReferencedTable> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect(&self, out: &mut Vec<ReferencedTable>) {
        self.left.collect(out);
        self.right.collect(out);
    }

    /// `<left> <kind> join <right> on <left field> = <right field>`
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        let left = self.left.render(ctx)?;
        let right = self.right.render(ctx)?;
        let left_field = self.left.field().to_reference_sql(ctx)?;
        let right_field = self.right.field().to_reference_sql(ctx)?;
        Ok(format!(
            "{left} {} {right} on {left_field} = {right_field}",
            self.kind.keyword()
        ))
    }
}
