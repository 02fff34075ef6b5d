use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlforge::prelude::*;
use std::sync::Arc;

/// Table with `n` plain columns plus an encrypted one and a counter.
fn wide_table(n: usize) -> Arc<TableDescriptor> {
    let mut builder = TableDescriptor::builder("wide", "wide")
        .field(FieldDescriptor::new("secret", "wide_secret").encrypted())
        .column("cc", "wide_cc");
    for i in 0..n {
        builder = builder.column(format!("col{i}"), format!("wide_col{i}"));
    }
    builder.build().unwrap()
}

fn bench_select_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select_all");
    let dialect = PostgresDialect::new();

    for n in [1, 10, 50, 100] {
        let table = wide_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| {
                let t = ReferencedTable::new(table);
                black_box(select(&t).to_sql(&dialect).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_filter_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/filter_chain");
    let table = wide_table(50);

    for n in [1, 5, 20, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let t = ReferencedTable::new(&table);
                let mut query = select(&t).field(t.field("col0").unwrap());
                for i in 0..n {
                    query = query.filter(t.field(&format!("col{i}")).unwrap().eq(i as i64));
                }
                black_box(query.to_sql(&DefaultDialect).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_self_join(c: &mut Criterion) {
    let table = wide_table(10);
    c.bench_function("render/self_join", |b| {
        b.iter(|| {
            let a = ReferencedTable::new(&table);
            let z = ReferencedTable::new(&table);
            let query = Select::new().join(Join::inner(
                a.field("col0").unwrap(),
                z.field("col0").unwrap(),
            ));
            black_box(query.to_sql(&DefaultDialect).unwrap());
        });
    });
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/insert");
    let dialect = PostgresDialect::new();

    for n in [1, 10, 50] {
        let table = wide_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| {
                let t = ReferencedTable::new(table);
                let mut insert = insert_into(&t).set("secret", "s").unwrap();
                for i in 0..n {
                    insert = insert.set(&format!("col{i}"), i as i64).unwrap();
                }
                black_box(insert.to_sql(&dialect).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_all,
    bench_filter_chain,
    bench_self_join,
    bench_insert
);
criterion_main!(benches);
