//! Basic benchmarks for the `stamped_pool` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use stamped_pool::StampedPool;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("stamped_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(StampedPool::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("spawn_first");
    group.bench_function("spawn_first", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(StampedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.spawn(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("spawn_into_free_slot");
    group.bench_function("spawn_into_free_slot", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(|| StampedPool::<TestItem>::with_capacity(2))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                _ = black_box(pool.spawn(black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("validate_one");
    group.bench_function("validate_one", |b| {
        b.iter_custom(|iters| {
            let mut pool = StampedPool::<TestItem>::new();
            let handle = pool.spawn(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.is_valid(black_box(handle)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one");
    group.bench_function("read_one", |b| {
        b.iter_custom(|iters| {
            let mut pool = StampedPool::<TestItem>::new();
            let handle = pool.spawn(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                _ = black_box(pool.get(black_box(handle)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("read_one_unchecked");
    group.bench_function("read_one_unchecked", |b| {
        b.iter_custom(|iters| {
            let mut pool = StampedPool::<TestItem>::new();
            let handle = pool.spawn(TEST_VALUE);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                // SAFETY: The handle was just spawned and the pool is not
                // mutated inside the loop.
                _ = black_box(unsafe { pool.get_unchecked(black_box(handle)) });
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("release_one");
    group.bench_function("release_one", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(StampedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let handles = pools
                .iter_mut()
                .map(|pool| pool.spawn(TEST_VALUE))
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for (pool, handle) in pools.iter_mut().zip(handles) {
                _ = black_box(pool.release(handle));
            }

            start.elapsed()
        });
    });

    group.finish();

    let mut group = c.benchmark_group("stamped_slow");

    let allocs_op = allocs.operation("spawn_10k_from_cold");
    group.bench_function("spawn_10k_from_cold", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(StampedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                for _ in 0..10_000 {
                    _ = black_box(pool.spawn(black_box(TEST_VALUE)));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("spawn_10k_presized");
    group.bench_function("spawn_10k_presized", |b| {
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(|| StampedPool::<TestItem>::with_capacity(10_000))
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                for _ in 0..10_000 {
                    _ = black_box(pool.spawn(black_box(TEST_VALUE)));
                }
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("forward_10_back_5_times_1000");
    group.bench_function("forward_10_back_5_times_1000", |b| {
        // We add 10 objects, release the first 5 and repeat this 1000 times.
        // This stresses the free-queue recycling alongside steady growth.
        b.iter_custom(|iters| {
            let mut pools = iter::repeat_with(StampedPool::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let mut to_release = Vec::with_capacity(5);

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for pool in &mut pools {
                for _ in 0..1000 {
                    to_release.clear();

                    // Add the 5 that we will later release.
                    for _ in 0..5 {
                        let handle = pool.spawn(black_box(TEST_VALUE));
                        to_release.push(handle);
                    }

                    // Add the 5 that we will keep.
                    for _ in 0..5 {
                        _ = black_box(pool.spawn(black_box(TEST_VALUE)));
                    }

                    // Release the first 5.
                    #[expect(clippy::iter_with_drain, reason = "to avoid moving the value")]
                    for handle in to_release.drain(..) {
                        _ = pool.release(handle);
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
