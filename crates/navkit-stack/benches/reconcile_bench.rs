//! Benchmarks for path diffing and stack reconciliation.
//!
//! Run with: cargo bench -p navkit-stack --bench reconcile_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use navkit_core::{Difference, NavigationId, NavigationPath};
use navkit_runtime::{Binding, Observable, RunLoop};
use navkit_stack::{NavigationStack, ScreenStack};
use std::hint::black_box;

fn ids(values: impl IntoIterator<Item = u32>) -> Vec<NavigationId> {
    values.into_iter().map(NavigationId::eager).collect()
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff/path");

    for depth in [4_u32, 16, 64] {
        group.throughput(Throughput::Elements(u64::from(depth)));
        let old = ids(0..depth);

        let pushed = ids(0..=depth);
        group.bench_with_input(BenchmarkId::new("push", depth), &(), |b, _| {
            b.iter(|| black_box(Difference::between(&old, &pushed)))
        });

        let reversed = ids((0..depth).rev());
        group.bench_with_input(BenchmarkId::new("reverse", depth), &(), |b, _| {
            b.iter(|| black_box(Difference::between(&old, &reversed)))
        });

        let truncated = ids(0..depth / 2);
        group.bench_with_input(BenchmarkId::new("truncate", depth), &(), |b, _| {
            b.iter(|| black_box(Difference::between(&old, &truncated)))
        });
    }

    group.finish();
}

fn settled_stack(
    depth: u32,
) -> (
    NavigationStack<ScreenStack<u32>>,
    Observable<NavigationPath>,
    RunLoop,
) {
    let run_loop = RunLoop::new();
    let path = Observable::new(NavigationPath::from_values(0..depth));
    let stack =
        NavigationStack::with_path(ScreenStack::new(), &Binding::new(&path), || 0, &run_loop);
    stack.navigation_destination(|n: u32| n);
    run_loop.run_until_idle();
    (stack, path, run_loop)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile/stack");

    for depth in [4_u32, 16, 64] {
        group.bench_with_input(BenchmarkId::new("push_pop", depth), &(), |b, _| {
            let (_stack, path, run_loop) = settled_stack(depth);
            b.iter(|| {
                path.update(|p| p.append(depth));
                run_loop.run_until_idle();
                path.update(|p| p.remove_last(1));
                run_loop.run_until_idle();
            })
        });

        group.bench_with_input(BenchmarkId::new("reorder", depth), &(), |b, _| {
            let (stack, path, run_loop) = settled_stack(depth);
            let forward = NavigationPath::from_values(0..depth);
            let backward = NavigationPath::from_values((0..depth).rev());
            b.iter(|| {
                path.set(backward.clone());
                run_loop.run_until_idle();
                path.set(forward.clone());
                run_loop.run_until_idle();
                black_box(stack.executor().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_reconcile);
criterion_main!(benches);
