use std::marker::PhantomData;

use crate::{StampedPool, StorageAllocator};

/// Builder for creating an instance of [`StampedPool`].
///
/// You only need the builder to customize the pool configuration; for an
/// empty pool with the default allocator, [`StampedPool::new()`][1] or
/// [`StampedPool::with_capacity()`][2] are sufficient.
///
/// # Examples
///
/// ```
/// use stamped_pool::StampedPool;
///
/// let pool = StampedPool::<u32>::builder().initial_capacity(1024).build();
///
/// assert_eq!(pool.capacity(), 1024);
/// assert_eq!(pool.spawned_count(), 0);
/// ```
///
/// [1]: StampedPool::new
/// [2]: StampedPool::with_capacity
#[must_use]
pub struct StampedPoolBuilder<T> {
    initial_capacity: usize,

    allocator: StorageAllocator,

    _item: PhantomData<T>,
}

impl<T> std::fmt::Debug for StampedPoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StampedPoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("initial_capacity", &self.initial_capacity)
            .field("allocator", &self.allocator)
            .finish()
    }
}

impl<T> StampedPoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            initial_capacity: 0,
            allocator: StorageAllocator::default(),
            _item: PhantomData,
        }
    }

    /// Sets the number of objects the pool pre-allocates storage for.
    ///
    /// Spawning beyond this capacity reallocates the storage block, which is
    /// considerably more expensive than an ordinary spawn, so size this for
    /// the expected peak population where that matters.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the allocate/free pair used for the pool's bulk storage in place
    /// of the global allocator.
    pub fn allocator(mut self, allocator: StorageAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the initial storage block cannot be
    /// allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use stamped_pool::StampedPool;
    ///
    /// let pool = StampedPool::<u32>::builder().build();
    ///
    /// assert_eq!(pool.capacity(), 0);
    /// ```
    #[must_use]
    pub fn build(self) -> StampedPool<T> {
        StampedPool::new_inner(self.initial_capacity, self.allocator)
    }
}
