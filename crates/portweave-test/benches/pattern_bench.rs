//! Benchmarks for pattern construction and queries

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use portweave_pattern::{CsvConfig, GraphConfig, IdxQuery, Pattern, PatternConfig};

fn wired(n: usize) -> Pattern {
    let a = format!("/a[0:{}]", n);
    let b = format!("/b[0:{}]", n);
    Pattern::from_concat(&[a.as_str(), b.as_str()], &a, &b, 1, PatternConfig::default())
        .expect("benchmark pattern")
}

fn bench_from_concat(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_concat");
    for n in [100usize, 1000, 10000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| wired(black_box(n)))
        });
    }
    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    c.bench_function("connect_fan_out_1k", |b| {
        b.iter(|| {
            let mut p = Pattern::new(&["/a[0]", "/b[0:1000]"]).expect("benchmark pattern");
            p.connect("/a[0]", "/b[0:1000]", &[], 1).map(|_| p.len())
        })
    });
}

fn bench_queries(c: &mut Criterion) {
    let p = wired(1000);
    let q = IdxQuery::new().dest_ports("/b[100:200]");
    c.bench_function("src_idx_1k", |b| b.iter(|| p.src_idx(0, 1, black_box(&q))));
    c.bench_function("is_connected_1k", |b| b.iter(|| p.is_connected(0, 1)));
    c.bench_function("get_conn_selectors_1k", |b| b.iter(|| p.get_conn_selectors().len()));
}

fn bench_export(c: &mut Criterion) {
    let p = wired(1000);
    c.bench_function("to_graph_1k", |b| {
        b.iter(|| p.to_graph(black_box(&GraphConfig::default())).edge_count())
    });
    c.bench_function("write_csv_1k", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(32 * 1024);
            p.write_csv(&mut buf, &CsvConfig::default()).map(|_| buf.len())
        })
    });
}

criterion_group!(
    benches,
    bench_from_concat,
    bench_fan_out,
    bench_queries,
    bench_export
);
criterion_main!(benches);
