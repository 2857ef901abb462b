// benches/taxonomy_performance.rs
//! Benchmarks for taxon_errors
//!
//! Subclass creation is paid once per type definition; factory calls and
//! predicate checks are paid per instance and should stay flat regardless
//! of hierarchy depth.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use taxon_errors::{define_root, CodeTable, ErrorType};

// ============================================================================
// Fixtures
// ============================================================================

fn layer(depth: usize, width: usize) -> CodeTable {
    (0..width)
        .map(|i| (format!("Level{depth}Code{i}"), format!("Failure {i} at level {depth}")))
        .collect()
}

/// Build a chain `depth` levels deep, each adding `width` codes.
fn chain(depth: usize, width: usize) -> ErrorType {
    let mut ty = define_root("Level0", layer(0, width)).expect("valid root");
    for level in 1..depth {
        ty = ty
            .subclass(format!("Level{level}"), layer(level, width))
            .expect("valid subclass");
    }
    ty
}

// ============================================================================
// Definition Cost
// ============================================================================

fn bench_define_root(c: &mut Criterion) {
    c.bench_function("define_root_base_codes", |b| {
        b.iter(|| define_root(black_box("RootError"), CodeTable::base()))
    });
}

fn bench_subclass_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("subclass_creation");

    for parent_codes in [2usize, 16, 128] {
        let parent = define_root("Parent", layer(0, parent_codes)).expect("valid root");
        let additions = layer(1, 4);
        group.bench_with_input(
            BenchmarkId::from_parameter(parent_codes),
            &parent_codes,
            |b, _| b.iter(|| parent.subclass(black_box("Child"), additions.clone())),
        );
    }

    group.finish();
}

// ============================================================================
// Per-Instance Cost
// ============================================================================

fn bench_factory_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("factory_call");

    for depth in [1usize, 5, 20] {
        let leaf = chain(depth, 8);
        group.bench_with_input(BenchmarkId::new("root_code", depth), &depth, |b, _| {
            b.iter(|| leaf.new_error(black_box("Level0Code0"), ()))
        });
    }

    let leaf = chain(5, 8);
    let factory = leaf.factory("Level4Code7").expect("known code");
    group.bench_function("prebound_factory_with_metadata", |b| {
        b.iter(|| factory.call(json!({ "id": black_box(42) })))
    });

    group.finish();
}

fn bench_predicate_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_eval");

    for depth in [1usize, 5, 20] {
        let leaf = chain(depth, 8);
        let err = leaf.new_error("Level0Code3", ()).expect("known code");
        group.bench_with_input(BenchmarkId::new("is", depth), &depth, |b, _| {
            b.iter(|| err.is(black_box("Level0Code3")))
        });
    }

    let leaf = chain(5, 8);
    let err = leaf.new_error("Level2Code1", ()).expect("known code");
    group.bench_function("all_predicates", |b| {
        b.iter(|| err.predicates().filter(|(_, holds)| *holds).count())
    });

    group.finish();
}

// ============================================================================
// Logging
// ============================================================================

fn bench_log_line(c: &mut Criterion) {
    let leaf = chain(3, 4);
    let cause = leaf.new_error("Unexpected", ()).expect("base code");
    let err = leaf
        .new_error("Level1Code2", (json!({ "path": "/srv/data" }), cause))
        .expect("known code");

    c.bench_function("log_write_to", |b| {
        let mut line = String::with_capacity(256);
        b.iter(|| {
            line.clear();
            err.log().write_to(&mut line).expect("string write");
            black_box(line.len())
        })
    });
}

criterion_group!(definition_benches, bench_define_root, bench_subclass_creation);
criterion_group!(instance_benches, bench_factory_call, bench_predicate_eval);
criterion_group!(logging_benches, bench_log_line);

criterion_main!(definition_benches, instance_benches, logging_benches);
