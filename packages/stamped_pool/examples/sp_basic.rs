//! Basic usage example for `StampedPool`.
//!
//! This example demonstrates spawning objects, checking handle validity,
//! releasing objects back to the pool and observing slot recycling.

use stamped_pool::StampedPool;

fn main() {
    // Create a pool pre-sized for a handful of objects.
    let mut pool = StampedPool::<String>::with_capacity(4);

    println!("Created pool with capacity: {}", pool.capacity());

    let first = pool.spawn("first".to_string());
    let second = pool.spawn("second".to_string());
    let third = pool.spawn("third".to_string());

    println!("Spawned {} objects", pool.spawned_count());
    println!("First:  {}", pool[first]);
    println!("Second: {}", pool[second]);
    println!("Third:  {}", pool[third]);

    // Handles can be copied and stored freely; all copies validate alike.
    let first_copy = first;
    assert!(pool.is_valid(first_copy));

    // Release an object; its handle goes stale immediately.
    pool.release(second);
    println!("After release: {} objects", pool.spawned_count());
    assert!(!pool.is_valid(second));

    // The freed slot is recycled for the next spawn, under a fresh stamp,
    // so the stale handle still refers to nothing.
    let replacement = pool.spawn("replacement".to_string());
    assert!(!pool.is_valid(second));
    assert!(pool.is_valid(replacement));

    println!("Replacement: {}", pool[replacement]);

    // Iterate over whatever is alive.
    for (handle, object) in &pool {
        println!("Live object {handle:?}: {object}");
    }

    pool.clear();
    println!("After clear: {} objects", pool.spawned_count());
}
