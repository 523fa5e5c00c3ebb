use std::any::type_name;
use std::collections::VecDeque;
use std::mem::MaybeUninit;
use std::ops::{Index, IndexMut};

use crate::{
    Error, Handle, HandleAware, RecordBlock, RecordsMut, Result, Stamp, StampedPoolBuilder,
    StorageAllocator,
};

/// An object pool that hands out generation-stamped [`Handle`]s instead of
/// pointers or bare indices.
///
/// Objects live in one contiguous storage block, which is good for locality
/// and means spawning rarely allocates. The price is that the block is
/// reallocated wholesale when the pool grows, so pointers and references into
/// the pool are only stable between structurally mutating calls. Handles are
/// the stable currency: each pairs a slot index with the generation stamp the
/// slot carried when the object was spawned, and the pool can always tell a
/// current handle from a stale one, including across any number of
/// reallocations and slot recyclings.
///
/// There are multiple ways to spawn an object into the pool:
///
/// * [`spawn()`][1] - moves a value in and returns its handle. This is the
///   simplest way to add an object.
/// * [`begin_spawn()`][2] - returns a [`Spawner`] that knows the handle
///   before the object exists, which is useful if the object needs to know
///   its own handle.
/// * [`spawn_aware()`][3] - for item types implementing [`HandleAware`], the
///   pool hands the freshly constructed object its own handle.
/// * [`spawn_with()`][4] - constructs the object in place from a closure,
///   for values that are expensive to construct and then move.
///
/// # Slot recycling
///
/// Releasing an object returns its slot to a FIFO free queue; a later spawn
/// reuses the oldest free slot under a fresh stamp. Handles to the former
/// occupant keep failing validation forever - slot reuse can never resurrect
/// them.
///
/// # Unchecked access
///
/// [`get()`][5] and the index operators verify the handle on every call.
/// Code that has already established validity and cannot afford the check can
/// use [`get_unchecked()`][6], which performs no verification at all; that is
/// a deliberate hot-path design with an explicit safety contract, not a
/// shortcut to take casually.
///
/// # Thread safety
///
/// The pool performs no internal synchronization. It can be moved to another
/// thread when the item type allows (`T: Send`), but sharing it between
/// threads requires external synchronization, which the type system enforces
/// by the pool not being `Sync`.
///
/// # Example
///
/// ```rust
/// use stamped_pool::StampedPool;
///
/// let mut pool = StampedPool::<String>::with_capacity(2);
///
/// let hello = pool.spawn("hello".to_string());
/// let world = pool.spawn("world".to_string());
///
/// assert_eq!(pool.spawned_count(), 2);
/// assert_eq!(&pool[hello], "hello");
///
/// // This spawn exceeds the capacity and relocates the storage; the
/// // existing handles are unaffected.
/// let extra = pool.spawn("extra".to_string());
///
/// assert!(pool.is_valid(hello));
/// assert_eq!(&pool[world], "world");
///
/// pool.release(hello);
/// assert!(!pool.is_valid(hello));
/// # pool.release(world);
/// # pool.release(extra);
/// ```
///
/// [1]: Self::spawn
/// [2]: Self::begin_spawn
/// [3]: Self::spawn_aware
/// [4]: Self::spawn_with
/// [5]: Self::get
/// [6]: Self::get_unchecked
#[derive(Debug)]
pub struct StampedPool<T> {
    /// Backing record storage. Reallocated wholesale on growth; handles
    /// survive that, references and pointers do not.
    records: RecordBlock<T>,

    /// Indices of vacant slots, recycled oldest-first. The FIFO order is not
    /// semantically significant but keeps slot reuse deterministic.
    free_queue: VecDeque<usize>,

    /// The stamp the next spawn will carry. Only ever moves forward, so no
    /// two spawns in the pool's lifetime share a stamp.
    next_stamp: Stamp,

    /// Number of objects currently live in the pool.
    spawned_count: usize,
}

impl<T> StampedPool<T> {
    pub(crate) fn new_inner(initial_capacity: usize, allocator: StorageAllocator) -> Self {
        assert!(
            size_of::<T>() > 0,
            "StampedPool must have non-zero item size"
        );

        let records = RecordBlock::allocate(initial_capacity, allocator).expect(
            "we do not intend to handle allocation failure at construction as a real possibility - OOM is panic",
        );

        let mut free_queue = VecDeque::with_capacity(initial_capacity);
        free_queue.extend(0..initial_capacity);

        Self {
            records,
            free_queue,
            next_stamp: Stamp::ORIGIN,
            spawned_count: 0,
        }
    }

    /// Creates a new empty [`StampedPool`] with the default configuration.
    ///
    /// The pool holds no storage until the first spawn.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    ///
    /// assert_eq!(pool.spawned_count(), 0);
    /// assert_eq!(pool.capacity(), 0);
    ///
    /// let handle = pool.spawn("first".to_string());
    /// assert_eq!(pool.spawned_count(), 1);
    /// # pool.release(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new [`StampedPool`] pre-sized for `capacity` live objects.
    ///
    /// Spawning beyond the capacity reallocates and relocates the storage
    /// block, which is far more expensive than an ordinary spawn, so size
    /// the pool generously where that matters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let pool = StampedPool::<u32>::with_capacity(1024);
    ///
    /// assert_eq!(pool.capacity(), 1024);
    /// assert_eq!(pool.spawned_count(), 0);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or if the storage block cannot be
    /// allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().initial_capacity(capacity).build()
    }

    /// Starts building a new [`StampedPool`].
    ///
    /// Use this to customize the pool beyond the defaults, such as routing
    /// its storage through a custom allocate/free pair.
    pub fn builder() -> StampedPoolBuilder<T> {
        StampedPoolBuilder::new()
    }

    /// The number of objects currently live in the pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<u32>::new();
    ///
    /// let a = pool.spawn(1);
    /// let b = pool.spawn(2);
    /// assert_eq!(pool.spawned_count(), 2);
    ///
    /// pool.release(a);
    /// assert_eq!(pool.spawned_count(), 1);
    ///
    /// // Releasing a stale handle is a no-op and does not affect the count.
    /// pool.release(a);
    /// assert_eq!(pool.spawned_count(), 1);
    /// # pool.release(b);
    /// ```
    #[must_use]
    pub fn spawned_count(&self) -> usize {
        self.spawned_count
    }

    /// The number of objects the pool can hold without reallocating its
    /// storage block.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Whether the pool holds no live objects.
    ///
    /// An empty pool may still be holding storage capacity.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawned_count == 0
    }

    /// Spawns an object into a free slot and returns its handle.
    ///
    /// The handle remains usable across storage reallocation and stops
    /// validating the moment this particular spawn is released.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    ///
    /// let handle = pool.spawn("occupant".to_string());
    ///
    /// assert!(pool.is_valid(handle));
    /// assert_eq!(pool.get(handle), "occupant");
    /// # pool.release(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pool needs to grow and the storage allocator cannot
    /// provide the larger block. Use [`try_spawn()`][Self::try_spawn] to
    /// handle that case instead.
    #[must_use]
    pub fn spawn(&mut self, value: T) -> Handle<T> {
        self.try_spawn(value)
            .expect("we do not intend to handle allocation failure as a real possibility - OOM is panic")
    }

    /// Spawns an object into a free slot, reporting storage exhaustion
    /// instead of panicking.
    ///
    /// On failure the pool is left exactly as it was: nothing was relocated,
    /// no slot was consumed and no stamp was assigned to a record.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<u32>::new();
    ///
    /// let handle = pool.try_spawn(42).expect("allocation failed");
    ///
    /// assert_eq!(pool.get(handle), &42);
    /// # pool.release(handle);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] when growth cannot obtain memory.
    pub fn try_spawn(&mut self, value: T) -> Result<Handle<T>> {
        let spawner = self.try_begin_spawn()?;
        let handle = spawner.handle();
        spawner.spawn(value);
        Ok(handle)
    }

    /// Spawns an object constructed in place by `f` and returns its handle.
    ///
    /// This avoids constructing the value and then moving it into the pool,
    /// which can matter for large item types.
    ///
    /// # Panics
    ///
    /// Panics if the pool needs to grow and the storage allocator cannot
    /// provide the larger block.
    ///
    /// # Safety
    ///
    /// `f` must fully initialize the storage it is given before returning.
    #[must_use]
    pub unsafe fn spawn_with(&mut self, f: impl FnOnce(&mut MaybeUninit<T>)) -> Handle<T> {
        // SAFETY: Forwarding the full-initialization requirement to our
        // caller.
        unsafe { self.try_spawn_with(f) }
            .expect("we do not intend to handle allocation failure as a real possibility - OOM is panic")
    }

    /// Spawns an object constructed in place by `f`, reporting storage
    /// exhaustion instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] when growth cannot obtain memory;
    /// `f` is not called in that case.
    ///
    /// # Safety
    ///
    /// `f` must fully initialize the storage it is given before returning.
    pub unsafe fn try_spawn_with(&mut self, f: impl FnOnce(&mut MaybeUninit<T>)) -> Result<Handle<T>> {
        let spawner = self.try_begin_spawn()?;
        let handle = spawner.handle();

        // SAFETY: Forwarding the full-initialization requirement to our
        // caller.
        unsafe {
            spawner.spawn_with(f);
        }

        Ok(handle)
    }

    /// Creates a [`Spawner`] that exposes the object's handle before the
    /// object is constructed.
    ///
    /// This is the mechanism for objects that need to know their own handle
    /// at construction time, such as objects that register themselves
    /// somewhere. Abandoning the spawner without calling
    /// [`spawn()`][Spawner::spawn] leaves the pool unchanged except that the
    /// stamp the spawner pre-drew is never issued to a record.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    ///
    /// let spawner = pool.begin_spawn();
    /// let handle = spawner.handle();
    ///
    /// // The handle is known before the object exists, so the object can
    /// // embed its own identity.
    /// let object = spawner.spawn(format!("I am {handle:?}"));
    /// assert!(object.contains("Handle"));
    ///
    /// assert!(pool.is_valid(handle));
    /// # pool.release(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the pool needs to grow and the storage allocator cannot
    /// provide the larger block.
    #[must_use]
    pub fn begin_spawn(&mut self) -> Spawner<'_, T> {
        self.try_begin_spawn()
            .expect("we do not intend to handle allocation failure as a real possibility - OOM is panic")
    }

    fn try_begin_spawn(&mut self) -> Result<Spawner<'_, T>> {
        if self.free_queue.is_empty() {
            let new_capacity = Self::grown_capacity(self.records.capacity());
            self.try_grow_to(new_capacity)?;
        }

        let index = *self
            .free_queue
            .front()
            .expect("growth always yields at least one free slot");

        let stamp = self.make_stamp();

        Ok(Spawner {
            pool: self,
            index,
            stamp,
        })
    }

    /// Spawns an object that receives its own handle immediately after
    /// construction.
    ///
    /// See [`HandleAware`] for the capability contract and an example.
    #[must_use]
    pub fn spawn_aware(&mut self, value: T) -> Handle<T>
    where
        T: HandleAware,
    {
        let spawner = self.begin_spawn();
        let handle = spawner.handle();

        let object = spawner.spawn(value);
        object.bind_handle(handle);

        handle
    }

    /// Whether `handle` references an object that is currently live.
    ///
    /// A handle stops validating when its spawn is released or the pool is
    /// cleared, and never validates again, even after the slot is reoccupied.
    /// Default handles and handles recovered from vacant storage never
    /// validate against anything.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::{Handle, StampedPool};
    ///
    /// let mut pool = StampedPool::<u32>::new();
    ///
    /// assert!(!pool.is_valid(Handle::default()));
    ///
    /// let handle = pool.spawn(42);
    /// assert!(pool.is_valid(handle));
    ///
    /// pool.release(handle);
    /// assert!(!pool.is_valid(handle));
    ///
    /// // The slot is recycled under a new stamp; the old handle stays stale.
    /// let successor = pool.spawn(43);
    /// assert!(!pool.is_valid(handle));
    /// assert!(pool.is_valid(successor));
    /// # pool.release(successor);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the handle carries a live stamp but an index at or beyond
    /// the pool's capacity - such a handle comes from a different pool, which
    /// this pool cannot reason about.
    #[must_use]
    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        if !handle.stamp().is_live() {
            return false;
        }

        self.records.record(handle.index()).stamp() == handle.stamp()
    }

    /// A shared reference to the object `handle` references.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    /// let handle = pool.spawn("occupant".to_string());
    ///
    /// assert_eq!(pool.get(handle), "occupant");
    /// # pool.release(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid for this pool.
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> &T {
        assert!(
            self.is_valid(handle),
            "handle does not reference a live object in this pool of {}",
            type_name::<T>()
        );

        // SAFETY: Validity established above means the record is live.
        unsafe { self.records.record(handle.index()).object() }
    }

    /// An exclusive reference to the object `handle` references.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    /// let handle = pool.spawn("occupant".to_string());
    ///
    /// pool.get_mut(handle).push_str(" updated");
    /// assert_eq!(pool.get(handle), "occupant updated");
    /// # pool.release(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid for this pool.
    #[must_use]
    pub fn get_mut(&mut self, handle: Handle<T>) -> &mut T {
        assert!(
            self.is_valid(handle),
            "handle does not reference a live object in this pool of {}",
            type_name::<T>()
        );

        // SAFETY: Validity established above means the record is live.
        unsafe { self.records.record_mut(handle.index()).object_mut() }
    }

    /// A shared reference to the object `handle` references, without any
    /// verification.
    ///
    /// This is the zero-overhead lookup path: no bounds check, no stamp
    /// comparison. It exists for hot paths that have already established
    /// validity; everywhere else, prefer [`get()`][Self::get].
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<u32>::new();
    /// let handle = pool.spawn(42);
    ///
    /// if pool.is_valid(handle) {
    ///     // SAFETY: Validity was just established and nothing structural
    ///     // happened since.
    ///     let object = unsafe { pool.get_unchecked(handle) };
    ///     assert_eq!(*object, 42);
    /// }
    /// # pool.release(handle);
    /// ```
    ///
    /// # Safety
    ///
    /// `handle` must be valid for this pool, i.e.
    /// [`is_valid()`][Self::is_valid] would return `true`, and no
    /// structurally mutating call may have happened since that was
    /// established.
    #[must_use]
    pub unsafe fn get_unchecked(&self, handle: Handle<T>) -> &T {
        debug_assert!(
            self.is_valid(handle),
            "handle does not reference a live object in this pool of {}",
            type_name::<T>()
        );

        // SAFETY: The caller guarantees validity, which implies the index is
        // in bounds.
        let record = unsafe { self.records.record_unchecked(handle.index()) };

        // SAFETY: A valid handle references a live record.
        unsafe { record.object() }
    }

    /// An exclusive reference to the object `handle` references, without any
    /// verification.
    ///
    /// # Safety
    ///
    /// Same contract as [`get_unchecked()`][Self::get_unchecked].
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, handle: Handle<T>) -> &mut T {
        debug_assert!(
            self.is_valid(handle),
            "handle does not reference a live object in this pool of {}",
            type_name::<T>()
        );

        // SAFETY: The caller guarantees validity, which implies the index is
        // in bounds.
        let record = unsafe { self.records.record_unchecked_mut(handle.index()) };

        // SAFETY: A valid handle references a live record.
        unsafe { record.object_mut() }
    }

    /// Releases the object `handle` references back to the pool, dropping it
    /// and queueing its slot for reuse.
    ///
    /// Returns `true` if an object was actually released. Releasing is
    /// strictly tied to the exact spawn the handle identifies: a handle that
    /// is already stale - because the object was released before, the pool
    /// was cleared, or the slot has since been recycled to a newer occupant -
    /// is a no-op returning `false`. A stale handle can therefore never
    /// destroy another spawn's object, and double releases are harmless.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    /// let handle = pool.spawn("short-lived".to_string());
    ///
    /// assert!(pool.release(handle));
    ///
    /// // The object is gone; releasing again changes nothing.
    /// assert!(!pool.release(handle));
    /// assert_eq!(pool.spawned_count(), 0);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the handle carries a live stamp but an index at or beyond
    /// the pool's capacity - such a handle comes from a different pool.
    pub fn release(&mut self, handle: Handle<T>) -> bool {
        if !handle.stamp().is_live() {
            return false;
        }

        let record = self.records.record_mut(handle.index());

        if record.stamp() != handle.stamp() {
            // Already released, or the slot now belongs to a newer spawn.
            // Only the exact spawn the handle identifies may be destroyed
            // through it.
            return false;
        }

        // SAFETY: Stamp equality with a live stamp means this slot holds the
        // handle's own spawn, initialized.
        unsafe {
            record.destruct();
        }

        self.spawned_count = self
            .spawned_count
            .checked_sub(1)
            .expect("a live record implies a non-zero live-object count");

        self.free_queue.push_back(handle.index());

        true
    }

    /// Releases every live object and the storage block itself.
    ///
    /// Every live object is dropped exactly once. The pool returns to its
    /// freshly-constructed empty state - zero capacity, stamp counter back at
    /// its origin - and remains fully usable.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::with_capacity(8);
    ///
    /// let handle = pool.spawn("occupant".to_string());
    /// pool.clear();
    ///
    /// assert_eq!(pool.spawned_count(), 0);
    /// assert_eq!(pool.capacity(), 0);
    /// assert!(!pool.is_valid(handle));
    ///
    /// // The pool is empty but fully usable.
    /// let replacement = pool.spawn("successor".to_string());
    /// assert_eq!(pool.spawned_count(), 1);
    /// # pool.release(replacement);
    /// ```
    pub fn clear(&mut self) {
        // Replacing the block drops every live occupant and frees the
        // storage.
        self.records = RecordBlock::empty(self.records.allocator());
        self.free_queue = VecDeque::new();
        self.next_stamp = Stamp::ORIGIN;
        self.spawned_count = 0;
    }

    /// Reserves storage for at least `additional` more objects beyond the
    /// current live population.
    ///
    /// Growth relocates the storage block exactly as spawn-triggered growth
    /// does; outstanding handles are unaffected. Does nothing if the
    /// capacity is already sufficient.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<u32>::new();
    ///
    /// pool.reserve(10);
    /// assert!(pool.capacity() >= 10);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the capacity computation overflows or the storage allocator
    /// cannot provide the larger block.
    #[cfg_attr(test, mutants::skip)] // Can be mutated to infinitely growing memory use.
    pub fn reserve(&mut self, additional: usize) {
        let required_capacity = self
            .spawned_count
            .checked_add(additional)
            .expect("capacity overflow: requested capacity exceeds maximum possible value");

        if self.records.capacity() >= required_capacity {
            return;
        }

        self.try_grow_to(required_capacity)
            .expect("we do not intend to handle allocation failure as a real possibility - OOM is panic");
    }

    /// Recovers the handle that currently maps to the object at `object_ptr`.
    ///
    /// This is how an object stored in the pool obtains a handle to itself
    /// from `&self`, without the pool exposing raw slot indices. The pointer
    /// is expected to address an object's storage inside this pool's current
    /// block; any pointer outside the block yields the never-valid default
    /// handle, as does a pointer to a slot that holds no live object.
    ///
    /// Note that pointers into the pool go stale whenever the storage block
    /// is reallocated. An object's own `&self` is safe by construction - the
    /// object cannot be executing a method while being relocated, because
    /// relocation requires exclusive access to the pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<String>::new();
    /// let handle = pool.spawn("self-aware".to_string());
    ///
    /// let recovered = pool.handle_by_ptr(std::ptr::from_ref(pool.get(handle)));
    /// assert_eq!(recovered, handle);
    ///
    /// let unrelated = "elsewhere".to_string();
    /// let not_found = pool.handle_by_ptr(std::ptr::from_ref(&unrelated));
    /// assert!(!pool.is_valid(not_found));
    /// # pool.release(handle);
    /// ```
    #[must_use]
    pub fn handle_by_ptr(&self, object_ptr: *const T) -> Handle<T> {
        self.records
            .index_of_object_ptr(object_ptr)
            .map_or_else(Handle::default, |index| {
                Handle::new(index, self.records.record(index).stamp())
            })
    }

    /// Iterates over every live object in slot order, paired with its
    /// current handle.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stamped_pool::StampedPool;
    ///
    /// let mut pool = StampedPool::<u32>::new();
    /// let a = pool.spawn(1);
    /// let b = pool.spawn(2);
    /// pool.release(a);
    ///
    /// let live: Vec<u32> = pool.iter().map(|(_, object)| *object).collect();
    /// assert_eq!(live, vec![2]);
    /// # pool.release(b);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            pool: self,
            next_index: 0,
        }
    }

    /// Iterates over every live object in slot order with exclusive access,
    /// paired with its current handle.
    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            records: self.records.records_mut(),
        }
    }

    fn make_stamp(&mut self) -> Stamp {
        let stamp = self.next_stamp;
        self.next_stamp = stamp.next();
        stamp
    }

    /// The capacity after one growth step: one-and-a-half times the current
    /// capacity, rounded up, with zero growing to one. The factor trades
    /// memory headroom for amortized O(1) spawning; any fixed factor above
    /// one would do, this one keeps the waste modest.
    #[must_use]
    fn grown_capacity(capacity: usize) -> usize {
        if capacity == 0 {
            return 1;
        }

        capacity
            .checked_add(capacity.div_ceil(2))
            .expect("a pool capacity beyond the address space cannot be reached from a valid history")
    }

    /// Replaces the storage block with a larger one, relocating every
    /// occupant and queueing the new slots.
    ///
    /// On failure, nothing observable has happened: the queue reservation is
    /// made before the new block is allocated, and the old block is only
    /// released after relocation succeeded.
    fn try_grow_to(&mut self, new_capacity: usize) -> Result<()> {
        let old_capacity = self.records.capacity();
        debug_assert!(
            new_capacity > old_capacity,
            "growth must strictly enlarge the storage block"
        );

        // Cannot underflow: new capacity is strictly greater than old.
        let additional_slots = new_capacity.wrapping_sub(old_capacity);

        if self.free_queue.try_reserve(additional_slots).is_err() {
            return Err(Error::AllocationFailed {
                capacity: new_capacity,
            });
        }

        let mut new_records = RecordBlock::allocate(new_capacity, self.records.allocator())?;
        new_records.relocate_from(&mut self.records);

        // The old block no longer claims any occupant, so replacing it frees
        // raw memory without destructor calls.
        self.records = new_records;

        self.free_queue.extend(old_capacity..new_capacity);

        Ok(())
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    #[allow(
        dead_code,
        clippy::indexing_slicing,
        clippy::arithmetic_side_effects,
        reason = "exercised by tests; integrity check needs array access"
    )]
    pub(crate) fn integrity_check(&self) {
        let capacity = self.records.capacity();

        let mut queued = vec![false; capacity];

        for &index in &self.free_queue {
            assert!(
                index < capacity,
                "free queue references slot {index} beyond capacity {capacity}"
            );
            assert!(
                !queued[index],
                "free queue references slot {index} more than once"
            );
            queued[index] = true;
        }

        let mut live_count = 0_usize;

        for index in 0..capacity {
            if self.records.record(index).stamp().is_live() {
                assert!(
                    !queued[index],
                    "slot {index} is live but queued as free"
                );
                live_count += 1;
            } else {
                assert!(
                    queued[index],
                    "slot {index} is vacant but missing from the free queue"
                );
            }
        }

        assert!(
            live_count == self.spawned_count,
            "live-object counter {} does not match the observed live count {live_count}",
            self.spawned_count
        );
    }
}

impl<T> Default for StampedPool<T> {
    /// Creates a new empty [`StampedPool`] with the default configuration.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<Handle<T>> for StampedPool<T> {
    type Output = T;

    /// Shorthand for [`get()`][StampedPool::get].
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid for this pool.
    fn index(&self, handle: Handle<T>) -> &T {
        self.get(handle)
    }
}

impl<T> IndexMut<Handle<T>> for StampedPool<T> {
    /// Shorthand for [`get_mut()`][StampedPool::get_mut].
    ///
    /// # Panics
    ///
    /// Panics if the handle is not valid for this pool.
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.get_mut(handle)
    }
}

/// A two-phase spawn in progress on a [`StampedPool`], created by
/// [`begin_spawn()`][StampedPool::begin_spawn].
///
/// The spawner knows the handle the object will receive before the object is
/// constructed, which lets the object embed or register its own identity.
/// Consume the spawner with [`spawn()`][Self::spawn] (or the unsafe in-place
/// [`spawn_with()`][Self::spawn_with]); abandoning it leaves the pool's
/// population unchanged.
#[derive(Debug)]
pub struct Spawner<'p, T> {
    pool: &'p mut StampedPool<T>,

    /// Slot the object will occupy. Stays at the front of the free queue
    /// until the spawn completes, so abandonment needs no undo.
    index: usize,

    /// Stamp the object will carry. Pre-drawn from the counter; never issued
    /// to a record if the spawner is abandoned.
    stamp: Stamp,
}

impl<'p, T> Spawner<'p, T> {
    /// The handle the spawned object will be reachable under.
    ///
    /// If the spawner is abandoned, this handle never becomes valid.
    #[must_use]
    pub fn handle(&self) -> Handle<T> {
        Handle::new(self.index, self.stamp)
    }

    /// Spawns the object and returns an exclusive reference to it.
    ///
    /// The reference is tied to the pool borrow and goes away at the next
    /// structurally mutating call; the handle from
    /// [`handle()`][Self::handle] is the durable way back to the object.
    pub fn spawn<'v>(self, value: T) -> &'v mut T
    where
        'p: 'v,
    {
        // SAFETY: The closure fully initializes the storage by writing
        // `value` into it.
        unsafe {
            self.spawn_with(|uninit| {
                uninit.write(value);
            })
        }
    }

    /// Spawns the object by constructing it in place and returns an
    /// exclusive reference to it.
    ///
    /// # Safety
    ///
    /// `f` must fully initialize the storage it is given before returning.
    pub unsafe fn spawn_with<'v>(self, f: impl FnOnce(&mut MaybeUninit<T>)) -> &'v mut T
    where
        'p: 'v,
    {
        let Self { pool, index, stamp } = self;

        let popped = pool
            .free_queue
            .pop_front()
            .expect("a spawner exists only while its pool holds a free slot at the queue front");
        debug_assert!(
            popped == index,
            "the queue front moved while a spawner was outstanding"
        );

        {
            let record = pool.records.record_mut(index);

            // SAFETY: The slot came off the free queue, so it holds no live
            // object; the stamp was drawn from the live counter; the caller
            // guarantees `f` fully initializes the storage.
            unsafe {
                record.construct_with(stamp, f);
            }
        }

        pool.spawned_count = pool
            .spawned_count
            .checked_add(1)
            .expect("the pool cannot hold more live objects than its storage has records");

        let record = pool.records.record_mut(index);

        // SAFETY: Constructed and stamped live just above.
        unsafe { record.object_mut() }
    }
}

/// Iterator over the live objects of a [`StampedPool`], created by
/// [`iter()`][StampedPool::iter].
#[derive(Debug)]
pub struct Iter<'p, T> {
    pool: &'p StampedPool<T>,

    next_index: usize,
}

impl<'p, T> Iterator for Iter<'p, T> {
    type Item = (Handle<T>, &'p T);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.pool.records.capacity() {
            let index = self.next_index;

            // Cannot overflow: bounded by the capacity check above.
            self.next_index = index.wrapping_add(1);

            let record = self.pool.records.record(index);

            if record.stamp().is_live() {
                // SAFETY: Live per the stamp check above.
                let object = unsafe { record.object() };

                return Some((Handle::new(index, record.stamp()), object));
            }
        }

        None
    }
}

/// Iterator over the live objects of a [`StampedPool`] with exclusive
/// access, created by [`iter_mut()`][StampedPool::iter_mut].
#[derive(Debug)]
pub struct IterMut<'p, T> {
    records: RecordsMut<'p, T>,
}

impl<'p, T> Iterator for IterMut<'p, T> {
    type Item = (Handle<T>, &'p mut T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, record) = self.records.next()?;

            if record.stamp().is_live() {
                let stamp = record.stamp();

                // SAFETY: Live per the stamp check above.
                let object = unsafe { record.object_mut() };

                return Some((Handle::new(index, stamp), object));
            }
        }
    }
}

impl<'p, T> IntoIterator for &'p StampedPool<T> {
    type Item = (Handle<T>, &'p T);
    type IntoIter = Iter<'p, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'p, T> IntoIterator for &'p mut StampedPool<T> {
    type Item = (Handle<T>, &'p mut T);
    type IntoIter = IterMut<'p, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
