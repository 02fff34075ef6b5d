use super::*;
use crate::context::RenderContext;
use crate::dialect::{DefaultDialect, PostgresDialect};
use crate::schema::{FieldDescriptor, ReferencedTable, TableDescriptor};
use std::sync::Arc;

fn tst() -> Arc<TableDescriptor> {
    TableDescriptor::builder("tst", "tst")
        .column("id", "tst_id")
        .column("name", "tst_name")
        .field(FieldDescriptor::new("secret", "tst_secret").encrypted())
        .field(FieldDescriptor::new("digest", "tst_digest").hashed())
        .field(FieldDescriptor::new("pw", "tst_pw").password_hashed())
        .calculated("upper", |t| Ok(func("upper", [t.field("name")?])))
        .build()
        .unwrap()
}

fn sql(expr: impl IntoExpr) -> String {
    expr.into_expr().to_sql(&DefaultDialect).unwrap()
}

fn pg(expr: impl IntoExpr) -> String {
    expr.into_expr().to_sql(&PostgresDialect::new()).unwrap()
}

// ==================== Operators ====================

#[test]
fn binary_simple_operands() {
    assert_eq!(sql(val(1).add(2)), "1 + 2");
    assert_eq!(sql(val(7).rem(3)), "7 % 3");
    assert_eq!(sql(val("a").ne("b")), "'a' <> 'b'");
    assert_eq!(sql(val("abc").like("a%")), "'abc' like 'a%'");
}

#[test]
fn binary_wraps_non_simple_operands() {
    assert_eq!(sql(val(1).add(2).mul(3)), "(1 + 2) * 3");
    assert_eq!(sql(val(10).div(val(4).sub(2))), "10 / (4 - 2)");
}

#[test]
fn field_comparison() {
    let t = ReferencedTable::new(&tst());
    assert_eq!(sql(t.field("id").unwrap().gte(5)), "tst.tst_id >= 5");
    assert_eq!(
        sql(t.field("id").unwrap().lt(t.field("name").unwrap())),
        "tst.tst_id < tst.tst_name"
    );
}

#[test]
fn logical_and_or() {
    let t = ReferencedTable::new(&tst());
    let id = t.field("id").unwrap();
    let name = t.field("name").unwrap();
    assert_eq!(
        sql(id.clone().eq(1).and(name.clone().eq("a"))),
        "tst.tst_id = 1 and tst.tst_name = 'a'"
    );
    assert_eq!(
        sql(id.clone().eq(1).or(id.clone().eq(2)).and(name.eq("a"))),
        "(tst.tst_id = 1 or tst.tst_id = 2) and tst.tst_name = 'a'"
    );
    assert_eq!(
        sql(val(1).eq(1).and(val(2).eq(2)).and(val(3).eq(3))),
        "1 = 1 and 2 = 2 and 3 = 3"
    );
}

#[test]
fn logical_requires_operands() {
    assert!(matches!(
        Expr::all(vec![]),
        Err(SqlError::InvalidExpression(_))
    ));
    assert!(matches!(
        Expr::any(vec![]),
        Err(SqlError::InvalidExpression(_))
    ));
    let empty = Expr::Logical {
        op: LogicalOp::And,
        operands: vec![],
    };
    assert!(matches!(
        empty.to_sql(&DefaultDialect),
        Err(SqlError::InvalidExpression(_))
    ));
}

#[test]
fn single_operand_logical() {
    let e = Expr::any(vec![val(1).eq(1)]).unwrap();
    assert_eq!(sql(e), "1 = 1");
}

#[test]
fn long_logical_breaks_lines() {
    let parts: Vec<Expr> = (0..8)
        .map(|i| val(format!("some_long_value_{i}")).eq(i))
        .collect();
    let rendered = sql(Expr::all(parts).unwrap());
    assert!(rendered.starts_with("'some_long_value_0' = 0\nand 'some_long_value_1' = 1\n"));
    assert_eq!(rendered.lines().count(), 8);
}

#[test]
fn not_and_null_checks() {
    let t = ReferencedTable::new(&tst());
    assert_eq!(sql(val(true).not()), "not (true)");
    assert_eq!(sql(paren(val(1).eq(1)).not()), "not (1 = 1)");
    assert_eq!(sql(list([1, 2]).not()), "not (1, 2)");
    assert_eq!(
        sql(t.field("name").unwrap().eq("a").not()),
        "not (tst.tst_name = 'a')"
    );
    assert_eq!(sql(t.field("name").unwrap().is_null()), "tst.tst_name is null");
    assert_eq!(
        sql(t.field("name").unwrap().is_not_null()),
        "tst.tst_name is not null"
    );
}

#[test]
fn in_and_not_in_lists() {
    let t = ReferencedTable::new(&tst());
    assert_eq!(
        sql(t.field("id").unwrap().in_list([1, 2, 3])),
        "tst.tst_id in (1, 2, 3)"
    );
    assert_eq!(
        sql(t.field("name").unwrap().not_in(["a", "b"])),
        "tst.tst_name not in ('a', 'b')"
    );
}

#[test]
fn in_subquery_uses_separate_alias() {
    let desc = tst();
    let outer = ReferencedTable::new(&desc);
    let inner = ReferencedTable::new(&desc);
    let sub = Select::from_table(&inner).field(inner.field("id").unwrap());
    assert_eq!(
        sql(outer.field("id").unwrap().in_select(sub)),
        "tst.tst_id in (select tst2.tst_id as \"id\"\n  from tst as tst2)"
    );
}

#[test]
fn in_subquery_requires_one_field() {
    let desc = tst();
    let outer = ReferencedTable::new(&desc);
    let inner = ReferencedTable::new(&desc);
    let sub = Select::from_table(&inner);
    let err = outer
        .field("id")
        .unwrap()
        .not_in_select(sub)
        .to_sql(&DefaultDialect)
        .unwrap_err();
    assert!(matches!(err, SqlError::InvalidStatement(_)));
}

// ==================== Aggregates, functions, lists ====================

#[test]
fn aggregates_are_simple() {
    let t = ReferencedTable::new(&tst());
    let c = count(t.field("id").unwrap());
    assert!(c.is_simple());
    assert_eq!(sql(c.gt(1)), "count(tst.tst_id) > 1");
    assert_eq!(sql(count_all()), "count(*)");
    assert_eq!(sql(avg(t.field("id").unwrap())), "avg(tst.tst_id)");
    assert_eq!(
        sql(aggregate("string_agg", t.field("name").unwrap())),
        "string_agg(tst.tst_name)"
    );
}

#[test]
fn function_call() {
    assert_eq!(sql(func("lower", ["ABC"])), "lower('ABC')");
    assert_eq!(sql(func("greatest", [1, 2, 3])), "greatest(1, 2, 3)");
    assert_eq!(sql(func("random", Vec::<Expr>::new())), "random()");
}

#[test]
fn list_is_self_parenthesized() {
    assert_eq!(sql(list([1, 2])), "(1, 2)");
    assert_eq!(sql(val(1).eq(list([1]))), "1 = (1)");
}

#[test]
fn long_list_one_item_per_line() {
    let items: Vec<String> = (0..20).map(|i| format!("item_number_{i}")).collect();
    let rendered = sql(list(items));
    assert!(rendered.starts_with("(\n  'item_number_0',\n"));
    assert!(rendered.ends_with("'item_number_19'\n)"));
}

#[test]
fn list_wraps_non_simple_items() {
    assert_eq!(sql(list([val(1).add(1), val(2)])), "((1 + 1), 2)");
}

#[test]
fn nvl_goes_through_dialect() {
    let t = ReferencedTable::new(&tst());
    assert_eq!(
        sql(nvl(t.field("name").unwrap(), "none")),
        "coalesce(tst.tst_name, 'none')"
    );
}

#[test]
fn params_raw_alias_paren() {
    assert_eq!(sql(param("id")), "id");
    assert_eq!(pg(param("id")), "$[id]");
    assert_eq!(sql(raw("now() - interval '1 day'")), "now() - interval '1 day'");
    assert_eq!(sql(count_all().alias("n")), "count(*) as \"n\"");
    assert_eq!(sql(paren(val(1).add(2))), "(1 + 2)");
    assert_eq!(sql(paren(val(1).add(2)).mul(3)), "(1 + 2) * 3");
}

#[test]
fn option_values() {
    assert_eq!(sql(val(1).eq(None::<i32>)), "1 = NULL");
    assert_eq!(sql(val(1).eq(Some(2))), "1 = 2");
}

// ==================== CASE ====================

#[test]
fn case_inline() {
    let t = ReferencedTable::new(&tst());
    let c = case()
        .when(t.field("id").unwrap().eq(1), "one")
        .otherwise("other");
    assert_eq!(sql(c), "case when tst.tst_id = 1 then 'one' else 'other' end");
}

#[test]
fn case_multi_line_when_long() {
    let mut c = case();
    for i in 0..5 {
        c = c.when(val(i).eq(i), format!("a fairly long result string {i}"));
    }
    let rendered = sql(c.otherwise("fallback"));
    assert!(rendered.starts_with("case\n  when 0 = 0 then 'a fairly long result string 0'\n"));
    assert!(rendered.ends_with("\n  else 'fallback'\nend"));
}

#[test]
fn case_requires_branch() {
    let err = case().otherwise(1).into_expr().to_sql(&DefaultDialect).unwrap_err();
    assert!(matches!(err, SqlError::InvalidExpression(_)));
}

#[test]
fn case_is_wrapped_as_operand() {
    let c = case().when(val(1).eq(1), 2);
    assert_eq!(sql(val(1).add(c)), "1 + (case when 1 = 1 then 2 end)");
}

// ==================== Field transforms ====================

#[test]
fn encrypted_read_is_not_simple() {
    let t = ReferencedTable::new(&tst());
    let secret = t.field("secret").unwrap();
    assert!(!secret.read().is_simple());
    assert_eq!(
        pg(secret.read().eq("x")),
        "(case when tst.tst_secret is not null then pgp_sym_decrypt(decode(tst.tst_secret, 'hex'), $[encryptionKey]) else null end) = 'x'"
    );
}

#[test]
fn hashed_read_wraps_column_or_candidate() {
    let t = ReferencedTable::new(&tst());
    let digest = t.field("digest").unwrap();
    assert!(!digest.read().is_simple());
    assert_eq!(pg(digest.read()), "encode(digest(tst.tst_digest, 'sha256'), 'hex')");
    assert_eq!(
        pg(digest.read_with(param("d"))),
        "encode(digest($[d], 'sha256'), 'hex')"
    );
    assert_eq!(sql(digest.read()), "tst.tst_digest");
}

#[test]
fn password_read_without_candidate_compares_column() {
    let t = ReferencedTable::new(&tst());
    let pw = t.field("pw").unwrap();
    assert!(!pw.read().is_simple());
    assert_eq!(pg(pw.read()), "crypt(tst.tst_pw, tst.tst_pw)");
}

#[test]
fn plain_read_with_override_keeps_operand_parens() {
    let t = ReferencedTable::new(&tst());
    let id = t.field("id").unwrap();
    let name = t.field("name").unwrap();
    let either = id.clone().eq(1).or(name.clone().eq("b"));
    let read = name.read_with(either);
    assert!(!read.is_simple());
    assert_eq!(
        sql(read.eq(true)),
        "(tst.tst_id = 1 or tst.tst_name = 'b') = true"
    );
    assert!(name.read_with(val(3)).is_simple());
    assert_eq!(sql(name.read_with(list([1, 2])).eq(val(1))), "(1, 2) = 1");
}

#[test]
fn password_check_uses_stored_hash() {
    let t = ReferencedTable::new(&tst());
    let pw = t.field("pw").unwrap();
    assert_eq!(
        pg(pw.read_with("secret").eq(pw.clone())),
        "(crypt('secret', tst.tst_pw)) = tst.tst_pw"
    );
}

#[test]
fn encrypted_write_then_read_nests_templates() {
    let dialect = PostgresDialect::new();
    let t = ReferencedTable::new(&tst());
    let secret = t.field("secret").unwrap();
    let mut ctx = RenderContext::new(&dialect);
    let written = secret
        .write_value_sql(Some(&val("secret")), true, &mut ctx)
        .unwrap();
    assert_eq!(
        written,
        "encode(pgp_sym_encrypt('secret', $[encryptionKey]), 'hex')"
    );
    let read = secret
        .read_value_sql(Some(&raw(written.clone())), &mut ctx)
        .unwrap();
    assert_eq!(
        read,
        format!(
            "case when {written} is not null then pgp_sym_decrypt(decode({written}, 'hex'), $[encryptionKey]) else null end"
        )
    );
}

#[test]
fn write_without_value() {
    let dialect = PostgresDialect::new();
    let t = ReferencedTable::new(&tst());
    let mut ctx = RenderContext::new(&dialect);
    for name in ["secret", "digest", "pw"] {
        let f = t.field(name).unwrap();
        assert_eq!(f.write_value_sql(None, true, &mut ctx).unwrap(), "NULL");
    }
    let name = t.field("name").unwrap();
    assert_eq!(name.write_value_sql(None, false, &mut ctx).unwrap(), "");
    assert_eq!(
        t.field("pw")
            .unwrap()
            .to_update_field_sql(Some(&val("p")), &mut ctx)
            .unwrap(),
        "tst_pw = crypt('p', gen_salt('bf'))"
    );
}

#[test]
fn calculated_field_reference() {
    let t = ReferencedTable::new(&tst());
    let upper = t.field("upper").unwrap();
    assert!(!upper.is_simple());
    assert_eq!(sql(upper.clone().eq("A")), "(upper(tst.tst_name)) = 'A'");

    let dialect = DefaultDialect;
    let mut ctx = RenderContext::new(&dialect);
    assert!(matches!(
        upper.write_value_sql(None, true, &mut ctx),
        Err(SqlError::InvalidStatement(_))
    ));
}

#[test]
fn unknown_field() {
    let t = ReferencedTable::new(&tst());
    assert_eq!(
        t.field("missing").unwrap_err(),
        SqlError::unknown_field("tst", "missing")
    );
}

#[test]
fn order_by_items() {
    let t = ReferencedTable::new(&tst());
    let dialect = DefaultDialect;
    let mut ctx = RenderContext::new(&dialect);
    assert_eq!(
        t.field("id").unwrap().desc().render(&mut ctx).unwrap(),
        "tst.tst_id desc"
    );
    assert_eq!(
        OrderBy::from(t.field("name").unwrap()).render(&mut ctx).unwrap(),
        "tst.tst_name"
    );
}
