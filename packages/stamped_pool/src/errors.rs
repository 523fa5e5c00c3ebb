use thiserror::Error;

/// Errors that can occur when growing a pool's storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The storage allocator could not provide a block of the requested size.
    ///
    /// The pool is left exactly as it was before the failed call: no records
    /// were relocated, no slots were handed out and the old block was not
    /// released.
    #[error("failed to allocate pool storage for {capacity} records")]
    AllocationFailed {
        /// Capacity, in records, of the block that could not be allocated.
        capacity: usize,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
