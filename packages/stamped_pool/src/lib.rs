//! An object pool whose handles can always be checked for validity, even
//! after slots are recycled or the backing storage is reallocated.
//!
//! This crate provides [`StampedPool`], a contiguous pool that pairs every
//! storage slot with a generation stamp. Spawning an object returns a
//! [`Handle`] - an `(index, stamp)` pair - instead of a pointer or a bare
//! index. The pool grows on demand by reallocating its storage block, which
//! invalidates every pointer into the pool but never a handle, and recycles
//! released slots under fresh stamps, so a stale handle can always be told
//! apart from a current one.
//!
//! # Key features
//!
//! - **Validity-checkable handles**: [`is_valid()`](StampedPool::is_valid)
//!   distinguishes the current occupant of a slot from every former one
//! - **Contiguous storage**: objects live in one cache-friendly block
//! - **Dynamic growth**: capacity expands geometrically; live objects are
//!   relocated bitwise and all outstanding handles survive
//! - **Slot recycling**: released slots are reused oldest-first, each reuse
//!   under a stamp never issued before
//! - **Checked and unchecked access**: verified lookup by default, an
//!   explicit `unsafe` zero-overhead path for hot code
//! - **Pointer-to-handle recovery**:
//!   [`handle_by_ptr()`](StampedPool::handle_by_ptr) lets a pooled object
//!   obtain a handle to itself from `&self`
//! - **Custom storage allocation**: an allocate/free pair can replace the
//!   global allocator for all bulk storage
//! - **Thread mobility**: the pool moves between threads when the item type
//!   does, but is not `Sync` - it performs no internal synchronization
//!
//! # Basic usage
//!
//! ```rust
//! use stamped_pool::StampedPool;
//!
//! let mut pool = StampedPool::<String>::with_capacity(64);
//!
//! let greeting = pool.spawn("hello".to_string());
//!
//! assert!(pool.is_valid(greeting));
//! assert_eq!(&pool[greeting], "hello");
//!
//! pool.release(greeting);
//!
//! // The handle is stale now and stays stale forever, even though the slot
//! // will be reused by a later spawn.
//! assert!(!pool.is_valid(greeting));
//! ```
//!
//! # Handles survive growth
//!
//! ```rust
//! use stamped_pool::StampedPool;
//!
//! let mut pool = StampedPool::<u64>::with_capacity(1);
//!
//! let first = pool.spawn(100);
//!
//! // This spawn exceeds the capacity; the pool reallocates and relocates
//! // its storage. References into the pool would be invalid now - the
//! // handle is not.
//! let second = pool.spawn(200);
//!
//! assert!(pool.is_valid(first));
//! assert_eq!(pool[first], 100);
//! assert_eq!(pool[second], 200);
//! ```
//!
//! # Objects that know their own handle
//!
//! ```rust
//! use stamped_pool::StampedPool;
//!
//! let mut pool = StampedPool::<String>::new();
//!
//! // The handle exists before the object does.
//! let spawner = pool.begin_spawn();
//! let handle = spawner.handle();
//! spawner.spawn(format!("stored under {handle:?}"));
//!
//! assert!(pool.get(handle).contains("stored under"));
//! ```

mod allocator;
mod aware;
mod builder;
mod errors;
mod handle;
mod pool;
mod record;
mod stamp;
mod storage;

pub use allocator::*;
pub use aware::*;
pub use builder::*;
pub use errors::Error;
pub use handle::*;
pub use pool::{Iter, IterMut, Spawner, StampedPool};

pub(crate) use errors::Result;
pub(crate) use record::*;
pub(crate) use stamp::*;
pub(crate) use storage::*;
