//! Benchmarks for validation over large generated schemas

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tablegraph_engine::validate;
use tablegraph_schema::{Field, Schema, Table};

/// Generate a schema with N tables, each linking to the next two tables.
/// The last table links back to the first, closing a long cycle.
fn generate_schema(num_tables: usize) -> Schema {
    let tables = (0..num_tables)
        .map(|i| {
            let mut table = Table::new(format!("table_{}", i))
                .with_field(Field::new("text", "name"));

            for offset in 1..=2 {
                let target = i + offset;
                if target < num_tables {
                    table = table.with_field(Field::link_table(
                        format!("link_{}", offset),
                        format!("table_{}", target),
                        Some("name"),
                    ));
                }
            }

            if i + 1 == num_tables {
                table = table.with_field(Field::sub_table("wrap", "table_0"));
            }

            table
        })
        .collect();

    Schema::new(tables)
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for size in [10, 50, 200] {
        let schema = generate_schema(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &schema, |b, schema| {
            b.iter(|| validate(black_box(schema)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);
