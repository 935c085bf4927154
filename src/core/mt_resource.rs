use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be shared
/// across threads. It uses an `Arc<RwLock<T>>` internally to manage concurrent access.
/// Chunks live inside an `MtResource` so the world, the worker tasks that mesh them and
/// the neighbor links of adjacent chunks can all refer to the same voxel data.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use voxel_world::core::MtResource;
///
/// let counter = MtResource::new(0);
/// *counter.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
///
/// let weak = counter.downgrade();
/// assert!(weak.upgrade().is_some());
/// ```
///
/// # Performance Considerations
/// - Read operations (`get()`) can occur concurrently
/// - Write operations (`get_mut()`) are exclusive and will block other operations
/// - Never hold a guard on one resource while taking the write guard of another;
///   the world relies on that ordering to stay deadlock free
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard that allows reading the contained value.
    ///
    /// A poisoned lock is recovered rather than propagated: a panic on a worker
    /// thread must not take the main loop down with it.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a mutable guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a non-owning reference to the resource.
    pub fn downgrade(&self) -> WeakResource<T> {
        WeakResource {
            resource: Arc::downgrade(&self.resource),
        }
    }

    /// Returns `true` if both handles point at the same resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

/// A non-owning counterpart of [`MtResource`].
///
/// Used for back-references that must never keep their target alive, such as the
/// links between adjacent chunks.
pub struct WeakResource<T: Send + Sync> {
    resource: Weak<RwLock<T>>,
}

impl<T: Send + Sync> WeakResource<T> {
    /// Attempts to recover a strong handle; `None` once the resource was dropped.
    pub fn upgrade(&self) -> Option<MtResource<T>> {
        self.resource.upgrade().map(|resource| MtResource { resource })
    }

    /// Returns `true` if this weak handle was created from `strong`.
    pub fn points_to(&self, strong: &MtResource<T>) -> bool {
        std::ptr::eq(self.resource.as_ptr(), Arc::as_ptr(&strong.resource))
    }
}

impl<T: Send + Sync> Clone for WeakResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
