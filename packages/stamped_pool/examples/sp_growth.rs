//! Demonstrates that handles survive storage growth.
//!
//! The pool stores objects in one contiguous block and reallocates it when
//! the population exceeds the capacity. Pointers and references into the
//! pool do not survive that; handles do.

use stamped_pool::StampedPool;

fn main() {
    // Deliberately tiny so that growth happens early and often.
    let mut pool = StampedPool::<Vec<u64>>::with_capacity(1);

    let oldest = pool.spawn(vec![1, 2, 3]);
    println!("Spawned the first object at capacity {}", pool.capacity());

    // Keep spawning until the pool has grown several times.
    let mut handles = Vec::new();
    while pool.capacity() < 32 {
        handles.push(pool.spawn(vec![0; 8]));
    }

    println!(
        "After growth: capacity {}, {} live objects",
        pool.capacity(),
        pool.spawned_count()
    );

    // Every handle obtained along the way still validates, and the heap
    // contents of the very first object came through every relocation.
    assert!(pool.is_valid(oldest));
    assert!(handles.iter().all(|&handle| pool.is_valid(handle)));
    assert_eq!(pool[oldest], vec![1, 2, 3]);

    println!("The oldest handle is still valid: {:?}", pool[oldest]);

    // Pre-sizing avoids the relocations entirely.
    let mut presized = StampedPool::<Vec<u64>>::with_capacity(1024);
    let capacity_before = presized.capacity();

    for _ in 0..1024 {
        _ = presized.spawn(vec![42]);
    }

    assert_eq!(presized.capacity(), capacity_before);
    println!("The pre-sized pool never reallocated");
}
