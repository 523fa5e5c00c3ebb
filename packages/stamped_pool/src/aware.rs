use crate::Handle;

/// Capability trait for item types that want to know their own [`Handle`].
///
/// An object stored in a pool cannot compute its own handle: it only ever
/// sees `&self`, while handles are issued by the pool. Types that implement
/// this trait receive their handle from
/// [`spawn_aware()`][crate::StampedPool::spawn_aware] immediately after being
/// constructed in place, before the handle is returned to the caller. The
/// usual reason to want this is self-registration: an object that must
/// enroll itself in some external structure (a parent's child list, a
/// subscription table) can store the handle and hand it out later without
/// the pool ever exposing raw slot indices.
///
/// For one-off cases, [`begin_spawn()`][crate::StampedPool::begin_spawn]
/// provides the same information without the trait: the handle is available
/// from the [`Spawner`][crate::Spawner] before the object exists.
///
/// # Example
///
/// ```rust
/// use stamped_pool::{Handle, HandleAware, StampedPool};
///
/// struct Node {
///     label: String,
///     own_handle: Handle<Node>,
/// }
///
/// impl HandleAware for Node {
///     fn bind_handle(&mut self, handle: Handle<Self>) {
///         self.own_handle = handle;
///     }
/// }
///
/// let mut pool = StampedPool::<Node>::new();
///
/// let handle = pool.spawn_aware(Node {
///     label: "root".to_string(),
///     own_handle: Handle::default(),
/// });
///
/// // The object knows the same handle the caller received.
/// assert_eq!(pool.get(handle).own_handle, handle);
/// ```
pub trait HandleAware: Sized {
    /// Receives the object's own handle, called by the pool immediately after
    /// the object has been constructed in its slot.
    fn bind_handle(&mut self, handle: Handle<Self>);
}
