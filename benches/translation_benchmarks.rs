//! Performance benchmarks for translation.
//!
//! - Size-based: generated documents of 10 to 2000 statements
//! - Incremental: re-translating an unchanged document through a `Unit`
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to record per-pass scopes:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use mathscribe::{Context, ExprTree, NodeId, Operator, TranslationOptions};

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// A document of `statements` assignments chained through their variables,
/// with a summing loop after every tenth.
///
/// ```text
/// x0 = 1
/// x1 = x0 * 2 + 1
/// ...
/// for k ∈ 1 .. 10: x9 = x9 + k
/// ```
fn document(statements: usize) -> (ExprTree, NodeId) {
    let mut tree = ExprTree::new();
    let mut body = Vec::with_capacity(statements + statements / 10);

    let first = tree.variable("x0");
    let one = tree.integer(1);
    body.push(tree.assign(first, one));

    for n in 1..statements {
        let target = tree.variable(format!("x{n}"));
        let previous = tree.variable(format!("x{}", n - 1));
        let two = tree.integer(2);
        let product = tree.operator(Operator::Multiply, [previous, two]);
        let offset = tree.integer(n as i64);
        let sum = tree.operator(Operator::Add, [product, offset]);
        body.push(tree.assign(target, sum));

        if n % 10 == 9 {
            let k = tree.variable("k");
            let low = tree.integer(1);
            let high = tree.integer(10);
            let range = tree.range([low, high]);
            let target = tree.variable(format!("x{n}"));
            let current = tree.variable(format!("x{n}"));
            let k_ref = tree.variable("k");
            let step = tree.operator(Operator::Add, [current, k_ref]);
            let update = tree.assign(target, step);
            body.push(tree.for_each(k, range, update));
        }
    }

    let root = tree.root(body);
    (tree, root)
}

fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let ctx = Context::with_default_modules().unwrap();
    let options = TranslationOptions::default();

    let mut group = c.benchmark_group("translate/document_sizes");
    for statements in [10, 100, 500, 2000] {
        let (tree, root) = document(statements);
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(statements),
            &(tree, root),
            |b, (tree, root)| {
                b.iter(|| {
                    let output = ctx.translate(black_box(tree), *root, &options).unwrap();
                    end_profiling_frame();
                    black_box(output.text.len())
                });
            },
        );
    }
    group.finish();
}

fn incremental_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let ctx = Arc::new(Context::with_default_modules().unwrap());
    let (tree, root) = document(500);

    let mut group = c.benchmark_group("unit/retranslate");
    group.throughput(Throughput::Elements(tree.len() as u64));
    group.bench_function("unchanged_500", |b| {
        let mut unit = ctx.create_unit().unwrap();
        unit.translate(&tree, root).unwrap();
        b.iter(|| {
            let output = unit.translate(black_box(&tree), root).unwrap();
            end_profiling_frame();
            black_box(output.symbols.len())
        });
    });
    group.finish();
}

criterion_group!(benches, size_based_benchmarks, incremental_benchmarks);
criterion_main!(benches);
