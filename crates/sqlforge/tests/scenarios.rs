use chrono::{TimeZone, Utc};
use sqlforge::prelude::*;
use sqlforge::{Config, QueryContext, SqlValue, set_default_dialect};
use std::sync::Arc;

fn tst() -> Arc<TableDescriptor> {
    TableDescriptor::builder("tst", "tst")
        .column("_id", "tst_id")
        .column("name", "tst_name")
        .column("cc", "tst_cc")
        .build()
        .unwrap()
}

fn secure() -> Arc<TableDescriptor> {
    TableDescriptor::builder("tst", "tst")
        .column("_id", "tst_id")
        .field(FieldDescriptor::new("encrypted", "tst_encrypted").encrypted())
        .build()
        .unwrap()
}

fn tree() -> Arc<TableDescriptor> {
    TableDescriptor::builder("tst", "tst")
        .column("_id", "tst_id")
        .column("parent", "tst_parent_id")
        .calculated("children", |outer| {
            let inner = ReferencedTable::new(outer.descriptor());
            Ok(Select::from_table(&inner)
                .field(count_all())
                .filter(inner.field("parent")?.eq(outer.field("_id")?))
                .into_expr())
        })
        .build()
        .unwrap()
}

#[test]
fn insert_with_null_and_counter() {
    let t = ReferencedTable::new(&tst());
    let sql = insert_into(&t)
        .set("name", SqlValue::Null)
        .unwrap()
        .set("cc", 0)
        .unwrap()
        .to_sql(&PostgresDialect::new())
        .unwrap();
    assert_eq!(
        sql,
        "insert into tst (\n  tst_cc,\n  tst_name\n) values (\n  0,\n  NULL\n)"
    );
}

#[test]
fn select_all_decrypts_encrypted_field() {
    let t = ReferencedTable::new(&secure());
    let sql = select(&t).to_sql(&PostgresDialect::new()).unwrap();
    assert!(sql.contains(
        "case when tst.tst_encrypted is not null then pgp_sym_decrypt(decode(tst.tst_encrypted, 'hex'), $[encryptionKey]) else null end as \"encrypted\""
    ));
    assert!(sql.ends_with("\nfrom tst"));
}

#[test]
fn select_all_reads_hashed_columns_through_dialect() {
    let desc = TableDescriptor::builder("tst", "tst")
        .field(FieldDescriptor::new("token", "tst_token").hashed())
        .field(FieldDescriptor::new("pw", "tst_pw").password_hashed())
        .build()
        .unwrap();
    let t = ReferencedTable::new(&desc);
    let sql = select(&t).to_sql(&PostgresDialect::new()).unwrap();
    assert_eq!(
        sql,
        "select\n  crypt(tst.tst_pw, tst.tst_pw) as \"pw\",\n  encode(digest(tst.tst_token, 'sha256'), 'hex') as \"token\"\nfrom tst"
    );
}

#[test]
fn self_join_suffixes_aliases() {
    let desc = TableDescriptor::builder("tst", "tst")
        .column("_id", "tst_id")
        .column("name", "tst_name")
        .build()
        .unwrap();
    let tst = ReferencedTable::new(&desc);
    let tst2 = ReferencedTable::new(&desc);
    let sql = Select::from_tables([&tst, &tst2])
        .join(Join::inner(
            tst.field("_id").unwrap(),
            tst2.field("_id").unwrap(),
        ))
        .to_sql(&DefaultDialect)
        .unwrap();
    assert_eq!(
        sql,
        "select\n  tst.tst_id as \"_id\",\n  tst2.tst_id as \"_id2\",\n  tst.tst_name as \"name\",\n  tst2.tst_name as \"name2\"\nfrom tst inner join tst as tst2 on tst.tst_id = tst2.tst_id"
    );
}

#[test]
fn correlated_count_as_calculated_field() {
    let t = ReferencedTable::new(&tree());
    let sql = select(&t)
        .field(t.field("_id").unwrap())
        .field(t.field("children").unwrap())
        .to_sql(&DefaultDialect)
        .unwrap();
    assert_eq!(
        sql,
        "select\n  tst.tst_id as \"_id\",\n  (select count(*) as \"SQC1\"\n    from tst as tst2\n    where tst2.tst_parent_id = tst.tst_id) as \"children\"\nfrom tst"
    );
}

#[test]
fn counter_defaults() {
    let t = ReferencedTable::new(&tst());
    let insert = insert_into(&t)
        .set("name", "a")
        .unwrap()
        .to_sql(&DefaultDialect)
        .unwrap();
    assert!(insert.contains(") values (\n  0,\n  'a'\n)"));

    let update = update(&t)
        .set("name", "b")
        .unwrap()
        .filter(t.field("_id").unwrap().eq(1))
        .to_sql(&DefaultDialect)
        .unwrap();
    assert_eq!(
        update,
        "update tst set\n  tst_cc = tst_cc + 1,\n  tst_name = 'b'\nwhere tst.tst_id = 1"
    );
}

#[test]
fn timestamp_defaults() {
    let desc = TableDescriptor::builder("audit", "audit")
        .column("id", "audit_id")
        .column("created", "audit_created_at")
        .column("updated", "audit_updated_at")
        .build()
        .unwrap();
    let t = ReferencedTable::new(&desc);
    let pg = PostgresDialect::new();

    let insert = insert_into(&t).set("id", 1).unwrap().to_sql(&pg).unwrap();
    assert_eq!(
        insert,
        "insert into audit (\n  audit_created_at,\n  audit_id,\n  audit_updated_at\n) values (\n  now(),\n  1,\n  now()\n)"
    );

    let update = update(&t)
        .set("id", 2)
        .unwrap()
        .filter(t.field("id").unwrap().eq(1))
        .to_sql(&pg)
        .unwrap();
    assert_eq!(
        update,
        "update audit set\n  audit_id = 2,\n  audit_updated_at = now()\nwhere audit.audit_id = 1"
    );
}

#[test]
fn encrypted_insert_and_lookup() {
    let t = ReferencedTable::new(&secure());
    let pg = PostgresDialect::new();
    let insert = insert_into(&t)
        .set("encrypted", "secret")
        .unwrap()
        .to_sql(&pg)
        .unwrap();
    assert_eq!(
        insert,
        "insert into tst (tst_encrypted) values (encode(pgp_sym_encrypt('secret', $[encryptionKey]), 'hex'))"
    );

    let query = select(&t)
        .field(t.field("_id").unwrap())
        .filter(t.field("encrypted").unwrap().read().eq(param("needle")))
        .to_sql(&pg)
        .unwrap();
    assert!(query.ends_with("else null end) = $[needle]"));
}

#[test]
fn timestamp_literal_in_filter() {
    let t = ReferencedTable::new(&tst());
    let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    let sql = select(&t)
        .field(t.field("_id").unwrap())
        .filter(t.field("name").unwrap().gt(ts))
        .to_sql(&DefaultDialect)
        .unwrap();
    assert!(sql.ends_with("where tst.tst_name > '2024-05-06T07:08:09.000Z'"));
}

#[test]
fn alias_allocation_is_deterministic() {
    let desc = tst();
    for _ in 0..3 {
        let refs: Vec<_> = (0..3).map(|_| ReferencedTable::new(&desc)).collect();
        let mut ctx = QueryContext::new();
        let aliases: Vec<_> = refs.iter().map(|r| ctx.add_table(r).unwrap()).collect();
        assert_eq!(aliases, ["tst", "tst2", "tst3"]);
    }
}

#[test]
fn configured_registry_and_dialect() {
    let config = Config::from_toml_str(
        r#"
[dialect]
kind = "postgres"

[[tables]]
name = "account"

[[tables.fields]]
name = "id"
column = "account_id"

[[tables.fields]]
name = "pw"
column = "account_pw"
password_hashed = true
"#,
    )
    .unwrap();
    let registry = config.registry().unwrap();
    let dialect = config.dialect();
    let account = registry.referenced("account").unwrap();

    let sql = select(&account)
        .field(account.field("id").unwrap())
        .filter(
            account
                .field("pw")
                .unwrap()
                .read_with(param("pw"))
                .eq(account.field("pw").unwrap()),
        )
        .to_sql(dialect.as_ref())
        .unwrap();
    assert_eq!(
        sql,
        "select account.account_id as \"id\"\nfrom account\nwhere (crypt($[pw], account.account_pw)) = account.account_pw"
    );
}

#[test]
fn default_dialect_is_replaceable() {
    set_default_dialect(Arc::new(PostgresDialect::new()));
    let t = ReferencedTable::new(&tst());
    let sql = select(&t)
        .field(t.field("_id").unwrap())
        .filter(t.field("name").unwrap().eq(param("name")))
        .limit(1)
        .to_sql_default()
        .unwrap();
    assert_eq!(
        sql,
        "select tst.tst_id as \"_id\"\nfrom tst\nwhere tst.tst_name = $[name]\nlimit 1"
    );
}
