use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ferrous_injector::*;

// ===== Micro Benchmarks =====

fn bench_cached_hit(c: &mut Criterion) {
    let container = Container::new();
    container.register("answer").unwrap().as_constant(42u64).unwrap();

    // Prime the cache
    let _ = container.get("answer").unwrap();

    c.bench_function("cached_hit_u64", |b| {
        b.iter(|| {
            let v = container.get(black_box("answer")).unwrap();
            black_box(v);
        })
    });
}

fn bench_cold_factory(c: &mut Criterion) {
    struct ExpensiveToCreate {
        data: Vec<u64>,
    }

    c.bench_function("cold_factory_expensive", |b| {
        b.iter_batched(
            || {
                let container = Container::new();
                container
                    .register("expensive")
                    .unwrap()
                    .using_factory(|_| {
                        Ok(Value::new(ExpensiveToCreate {
                            data: (0..1000).collect(),
                        }))
                    })
                    .unwrap();
                container
            },
            |container| {
                let v = container.get_as::<ExpensiveToCreate>("expensive").unwrap();
                black_box(v.data.len());
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_typed_vs_raw(c: &mut Criterion) {
    let container = Container::new();
    container.register("n").unwrap().as_constant(7u32).unwrap();
    let _ = container.get("n").unwrap();

    let mut group = c.benchmark_group("typed_vs_raw");

    group.bench_function("raw_get", |b| {
        b.iter(|| black_box(container.get("n").unwrap()))
    });

    group.bench_function("get_as", |b| {
        b.iter(|| black_box(container.get_as::<u32>("n").unwrap()))
    });

    group.finish();
}

// ===== Macro Benchmarks =====

fn chain(depth: usize) -> Container {
    let container = Container::new();
    container.register("n0").unwrap().as_constant(0u64).unwrap();
    for i in 1..depth {
        container
            .register(format!("n{}", i))
            .unwrap()
            .using_factory(|call| Ok(Value::new(*call.arg::<u64>(0)? + 1)))
            .unwrap()
            .with_args([format!("n{}", i - 1)])
            .unwrap();
    }
    container
}

fn bench_argument_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("argument_chain");

    for depth in [10usize, 50, 120] {
        let top = format!("n{}", depth - 1);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter_batched(
                || chain(depth),
                |container| black_box(container.get(&top).unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_large_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_registry");

    for size in [100usize, 1000, 10000] {
        let container = Container::new();
        for i in 0..size {
            container.register(format!("svc{}", i)).unwrap().as_constant(i).unwrap();
        }
        let target = format!("svc{}", size / 2);
        let _ = container.get(&target).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(container.get(&target).unwrap()))
        });
    }

    group.finish();
}

fn bench_sync_container(c: &mut Criterion) {
    let shared = SyncContainer::new(Container::new());
    shared.register("answer", |d| d.as_constant(42u64)).unwrap();
    let _ = shared.get("answer").unwrap();

    c.bench_function("sync_cached_hit", |b| {
        b.iter(|| black_box(shared.get("answer").unwrap()))
    });
}

criterion_group!(
    micro_benches,
    bench_cached_hit,
    bench_cold_factory,
    bench_typed_vs_raw,
);

criterion_group!(
    macro_benches,
    bench_argument_chain,
    bench_large_registry,
    bench_sync_container
);

criterion_main!(micro_benches, macro_benches);
