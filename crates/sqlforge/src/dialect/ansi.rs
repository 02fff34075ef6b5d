use super::Dialect;
use crate::error::SqlResult;
use crate::stmt::{Clauses, Select};

/// Standard SQL: `:name` placeholders and `fetch first N rows only`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn name(&self) -> &str {
        "ansi"
    }

    fn named_parameter(&self, name: &str) -> String {
        format!(":{name}")
    }

    fn finish_select(&self, clauses: &mut Clauses, select: &Select) -> SqlResult<()> {
        if let Some(limit) = select.row_limit() {
            clauses.push("limit", format!("fetch first {limit} rows only"));
        }
        Ok(())
    }
}
