//! Layout helpers shared by expression and statement rendering.

/// Single-line forms at or beyond this many characters are broken over lines.
pub const MAX_LINE_WIDTH: usize = 120;

/// One indentation step.
pub const INDENT: &str = "  ";

/// True when the pieces joined by `sep` fit on one line under the threshold.
pub(crate) fn fits_inline(parts: &[String], sep: &str, extra: usize) -> bool {
    if parts.iter().any(|p| p.contains('\n')) {
        return false;
    }
    let joined: usize = parts.iter().map(String::len).sum::<usize>()
        + sep.len() * parts.len().saturating_sub(1)
        + extra;
    joined < MAX_LINE_WIDTH
}

/// Prefix every line of `s` with one indentation step.
pub(crate) fn indent(s: &str) -> String {
    s.lines()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix every line after the first with one indentation step.
pub(crate) fn indent_tail(s: &str) -> String {
    let mut lines = s.lines();
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(INDENT);
        out.push_str(line);
    }
    out
}

/// Render a parenthesized, comma separated list.
///
/// `(a, b, c)` when it fits, otherwise one item per line.
pub(crate) fn paren_list(items: &[String]) -> String {
    if fits_inline(items, ", ", 2) {
        format!("({})", items.join(", "))
    } else {
        let body = items
            .iter()
            .map(|item| indent(item))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("(\n{body}\n)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_list_is_inline() {
        let items = vec!["1".to_string(), "2".to_string()];
        assert_eq!(paren_list(&items), "(1, 2)");
    }

    #[test]
    fn long_list_breaks() {
        let items: Vec<String> = (0..30).map(|i| format!("'value_{i}'")).collect();
        let sql = paren_list(&items);
        assert!(sql.starts_with("(\n  'value_0',\n  'value_1',"));
        assert!(sql.ends_with("\n  'value_29'\n)"));
    }

    #[test]
    fn multiline_item_forces_break() {
        let items = vec!["a\nb".to_string()];
        assert_eq!(paren_list(&items), "(\n  a\n  b\n)");
    }

    #[test]
    fn indent_tail_keeps_first_line() {
        assert_eq!(indent_tail("a\nb\nc"), "a\n  b\n  c");
        assert_eq!(indent_tail("a"), "a");
    }
}
