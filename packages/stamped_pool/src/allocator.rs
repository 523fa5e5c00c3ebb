use std::alloc::{self, Layout};

/// The allocate/free function pair a pool uses for its bulk record storage.
///
/// The default pair forwards to the global allocator. Callers that route pool
/// storage through custom machinery (arena allocators, instrumented
/// allocators, process-wide accounting) can supply their own pair when
/// building a pool; every block the pool ever allocates or frees then goes
/// through that pair.
///
/// # Examples
///
/// ```rust
/// use stamped_pool::{StampedPool, StorageAllocator};
///
/// let mut pool = StampedPool::<u32>::builder()
///     .initial_capacity(16)
///     .allocator(StorageAllocator::default())
///     .build();
///
/// let handle = pool.spawn(42);
/// assert!(pool.is_valid(handle));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StorageAllocator {
    allocate: unsafe fn(Layout) -> *mut u8,
    deallocate: unsafe fn(*mut u8, Layout),
}

impl StorageAllocator {
    /// Creates an allocator from a custom allocate/free pair.
    ///
    /// # Safety
    ///
    /// `allocate` must, for any layout of non-zero size, return either a null
    /// pointer (allocation failure) or a pointer to a block of at least
    /// `layout.size()` bytes aligned to `layout.align()`, exclusively owned
    /// by the caller until it is passed to `deallocate`. `deallocate` must
    /// accept any non-null pointer previously returned by `allocate`,
    /// together with the same layout the block was allocated with.
    #[must_use]
    pub unsafe fn from_raw_parts(
        allocate: unsafe fn(Layout) -> *mut u8,
        deallocate: unsafe fn(*mut u8, Layout),
    ) -> Self {
        Self {
            allocate,
            deallocate,
        }
    }

    /// Allocates a block for `layout`, returning null on failure.
    ///
    /// # Safety
    ///
    /// `layout` must have non-zero size.
    #[must_use]
    pub(crate) unsafe fn allocate(&self, layout: Layout) -> *mut u8 {
        // SAFETY: Forwarding the non-zero-size requirement to our caller.
        unsafe { (self.allocate)(layout) }
    }

    /// Frees a block previously obtained from [`allocate()`][Self::allocate].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator's `allocate` with the
    /// same `layout`, and must not be used after this call.
    pub(crate) unsafe fn deallocate(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: Forwarding the provenance and layout requirements to our
        // caller.
        unsafe {
            (self.deallocate)(ptr, layout);
        }
    }
}

impl Default for StorageAllocator {
    fn default() -> Self {
        Self {
            allocate: alloc::alloc,
            deallocate: alloc::dealloc,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(StorageAllocator: Copy, Debug, Send, Sync);

    #[test]
    fn default_pair_round_trips() {
        let allocator = StorageAllocator::default();
        let layout = Layout::array::<u64>(8).unwrap();

        // SAFETY: The layout has non-zero size.
        let ptr = unsafe { allocator.allocate(layout) };
        assert!(!ptr.is_null());

        // SAFETY: Allocated by this allocator with this layout just above.
        unsafe {
            allocator.deallocate(ptr, layout);
        }
    }
}
