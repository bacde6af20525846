use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use herald_events::{Arg, Emitter, Listener, args};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

fn emitter_with(listeners: usize) -> (Emitter, Arc<AtomicU64>) {
    let emitter = Emitter::with_max_listeners(usize::MAX);
    let sum = Arc::new(AtomicU64::new(0));
    for _ in 0..listeners {
        let sum = Arc::clone(&sum);
        emitter
            .on(
                "tick",
                Listener::new(move |_, args| {
                    let n = args.first().and_then(Arg::as_i64).unwrap_or(0);
                    sum.fetch_add(n as u64, Ordering::Relaxed);
                    Ok(())
                }),
            )
            .unwrap();
    }
    (emitter, sum)
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");

    for listeners in [1usize, 10, 100] {
        let (emitter, _sum) = emitter_with(listeners);
        let payload = args![1];
        group.throughput(Throughput::Elements(listeners as u64));
        group.bench_with_input(BenchmarkId::from_parameter(listeners), &listeners, |b, _| {
            b.iter(|| emitter.emit(black_box("tick"), black_box(&payload)).unwrap());
        });
    }

    group.finish();
}

fn bench_once_churn(c: &mut Criterion) {
    let emitter = Emitter::new();
    let listener = Listener::new(|_, _| Ok(()));

    c.bench_function("once_register_and_fire", |b| {
        b.iter(|| {
            emitter.once("tick", listener.clone()).unwrap();
            emitter.emit("tick", &[]).unwrap()
        });
    });
}

criterion_group!(benches, bench_emit, bench_once_churn);
criterion_main!(benches);
