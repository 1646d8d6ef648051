//! Criterion benchmarks for agent name parsing and generation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ans_name::AnsName;

/// Benchmark: `AnsName::parse` with varying name shapes
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let test_cases = [
        ("minimal", "a2a://a.b.c.v1"),
        ("typical", "a2a://model1.ml-inference.acme.v1.prod"),
        (
            "long_extension",
            "a2a://translator.translation.globex.v2.eu.west.prod.blue.canary",
        ),
        ("invalid", "a2a://model1.ml-inference.acme.1"),
    ];

    for (name, input) in test_cases {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("name", name), &input, |b, input| {
            b.iter(|| AnsName::parse(black_box(input)));
        });
    }

    group.finish();
}

/// Benchmark: canonical string generation
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    let test_cases = [
        ("no_extension", "a2a://model1.ml-inference.acme.v1"),
        ("with_extension", "a2a://model1.ml-inference.acme.v1.prod"),
    ];

    for (name, input) in test_cases {
        let parsed = AnsName::parse(input).expect("valid test name");
        group.bench_with_input(BenchmarkId::new("generate", name), &parsed, |b, parsed| {
            b.iter(|| black_box(parsed).generate());
        });
    }

    group.finish();
}

/// Benchmark: component constructor with validation
fn bench_new(c: &mut Criterion) {
    c.bench_function("new/with_components", |b| {
        b.iter(|| {
            AnsName::new(
                black_box("a2a"),
                black_box("model1"),
                black_box("ml-inference"),
                black_box("acme"),
                black_box("1"),
                Some(black_box("prod")),
            )
        });
    });
}

criterion_group!(benches, bench_parse, bench_generate, bench_new);
criterion_main!(benches);
