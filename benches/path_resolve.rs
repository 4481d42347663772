/* Benchmarks for the sandbox resolver.  The real roots do not exist, so every
 * component walk is a cheap readlink miss on top of the normalize +
 * containment + mapping work. */

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rustwasi::safewasi::filesystem::*;
use rustwasi::safewasi::resolver::*;


pub fn run_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sandbox path resolution");

    group.plot_config(
        criterion::PlotConfiguration::default().summary_scale(criterion::AxisScale::Linear),
    );

    group.bench_function("PR01: normalize short path", |b| {
        b.iter(|| normalize_path(black_box("./foo/bar/../baz")).unwrap())
    });

    group.bench_function("PR02: normalize deep path", |b| {
        b.iter(|| {
            normalize_path(black_box("a/./b//c/../d/e/f/../../g/h/i/j/k/../../l/m/n/o/p")).unwrap()
        })
    });

    let absolute = SandboxRoot {
        normalized_path: "/sandbox",
        real_path: "/srv/guest/root",
    };
    group.bench_function("PR03: resolve under absolute root", |b| {
        b.iter(|| resolve_path(&absolute, black_box("docs/../data/input.txt"), 0).unwrap())
    });

    let dot = SandboxRoot {
        normalized_path: ".",
        real_path: "/srv/guest/root",
    };
    group.bench_function("PR04: resolve under dot root", |b| {
        b.iter(|| resolve_path(&dot, black_box("./data/input.txt"), 0).unwrap())
    });

    // rejected lookups should cost about the same as accepted ones
    group.bench_function("PR05: reject escaping path", |b| {
        b.iter(|| resolve_path(&absolute, black_box("data/../../etc/passwd"), 0).unwrap_err())
    });

    group.finish();
}

criterion_group!(name=benches;
                 // Add the global settings here so we don't type it everywhere
                 config=global_criterion_settings::get_criterion();
                 targets=run_benchmark);
criterion_main!(benches);
