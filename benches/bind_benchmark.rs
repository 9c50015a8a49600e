//! Binding benchmarks: mapping lookup, record and map sources.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cqlx::binder::{bind, Layered, RecordSource, ValueMap};
use cqlx::types::{ToValue, Value};
use cqlx::{mapping_for, Table, TableMetadata};

#[derive(Debug, Default)]
struct Person {
    first_name: String,
    last_name: String,
    email: Vec<String>,
}

cqlx::record!(Person {
    first_name,
    last_name,
    email
});

fn person_table() -> Table {
    Table::new(
        TableMetadata::new(
            "person",
            ["first_name", "last_name", "email"],
            ["first_name"],
            ["last_name"],
        )
        .unwrap(),
    )
}

fn patricia() -> Person {
    Person {
        first_name: "Patricia".into(),
        last_name: "Citizen".into(),
        email: vec!["patricia.citzen@example.com".into()],
    }
}

fn bench_mapping_lookup(c: &mut Criterion) {
    mapping_for::<Person>().unwrap();

    c.bench_function("mapping_for_cached", |b| {
        b.iter(|| mapping_for::<Person>().unwrap());
    });
}

fn bench_bind_record(c: &mut Criterion) {
    let table = person_table();
    let p = patricia();

    c.bench_function("bind_record_insert", |b| {
        b.iter(|| {
            let source = RecordSource::new(black_box(&p)).unwrap();
            bind(table.insert().names(), &[&source]).unwrap()
        });
    });
}

fn bench_bind_layered(c: &mut Criterion) {
    let table = person_table();
    let p = patricia();
    let overrides = cqlx::values! { "email" => vec!["p@example.com".to_string()] };

    c.bench_function("bind_record_map_insert", |b| {
        b.iter(|| {
            let source = RecordSource::new(black_box(&p)).unwrap();
            let layered = Layered::new().with(&source).with(&overrides);
            bind(table.insert().names(), &[&layered]).unwrap()
        });
    });
}

/// Benchmark map binding with varying placeholder counts
fn bench_bind_map_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("bind_map_width");

    for width in [4usize, 32, 256] {
        let names: Vec<String> = (0..width).map(|i| format!("col_{i}")).collect();
        let map: ValueMap = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), (i as i64).to_value()))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(width), &names, |b, names| {
            b.iter(|| -> Vec<Value> { bind(black_box(names), &[&map]).unwrap() });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_mapping_lookup,
    bench_bind_record,
    bench_bind_layered,
    bench_bind_map_width,
);
criterion_main!(benches);
