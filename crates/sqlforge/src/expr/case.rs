use super::{Expr, IntoExpr};
use crate::context::RenderContext;
use crate::error::{SqlError, SqlResult};
use crate::format::{INDENT, MAX_LINE_WIDTH, indent_tail};

/// `case when ... then ... [else ...] end`
#[derive(Debug, Clone, Default)]
pub struct CaseExpr {
    branches: Vec<(Expr, Expr)>,
    otherwise: Option<Box<Expr>>,
}

impl CaseExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, condition: impl IntoExpr, result: impl IntoExpr) -> Self {
        self.branches
            .push((condition.into_expr(), result.into_expr()));
        self
    }

    pub fn otherwise(mut self, result: impl IntoExpr) -> Self {
        self.otherwise = Some(Box::new(result.into_expr()));
        self
    }

    pub fn render(&self, ctx: &mut RenderContext<'_>) -> SqlResult<String> {
        if self.branches.is_empty() {
            return Err(SqlError::invalid_expression(
                "case requires at least one when branch",
            ));
        }

        let mut lines = Vec::with_capacity(self.branches.len() + 1);
        for (condition, result) in &self.branches {
            let c = condition.render(ctx)?;
            let r = result.to_operand_sql(ctx)?;
            lines.push(format!("when {c} then {r}"));
        }
        if let Some(otherwise) = &self.otherwise {
            lines.push(format!("else {}", otherwise.to_operand_sql(ctx)?));
        }

        let inline = format!("case {} end", lines.join(" "));
        if inline.len() < MAX_LINE_WIDTH && !inline.contains('\n') {
            return Ok(inline);
        }

        let mut out = String::from("case");
        for line in &lines {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(&indent_tail(line));
        }
        out.push_str("\nend");
        Ok(out)
    }
}
