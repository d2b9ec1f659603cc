//! # Prefab-Keyed Fixed Registry
//!
//! Pools keyed by *template identity*: two `Arc<P>` handles name the same
//! pool only if they point at the same prefab. Pools are sized exactly once,
//! at registration, and never grow - an exhausted pool answers with `None`
//! until something comes back.
//!
//! Release routes through a coarse category index built at registration time.
//! Categories are many-to-one: several prefabs may share one category, which
//! lets heterogeneous instances be returned to a logically equivalent class
//! of pool without knowing which exact prefab produced them.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{PoolError, PoolResult};
use crate::pool::Pool;
use crate::poolable::Poolable;

/// A template that can stamp out poolable instances.
///
/// This is the constructor seam of the fixed registry: registration calls
/// [`Prefab::instantiate`] once per slot, and nothing else ever does.
pub trait Prefab {
    /// The instance type this prefab produces.
    type Instance: Poolable;

    /// Builds one fresh instance.
    fn instantiate(&self) -> Self::Instance;
}

/// Map key wrapping an `Arc<P>` with pointer-identity semantics.
///
/// Equality and hashing go through the allocation address, not the prefab's
/// contents, so two prefabs with identical fields still own distinct pools.
struct HandleKey<P>(Arc<P>);

impl<P> HandleKey<P> {
    fn of(prefab: &Arc<P>) -> Self {
        Self(Arc::clone(prefab))
    }
}

impl<P> Clone for HandleKey<P> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<P> PartialEq for HandleKey<P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<P> Eq for HandleKey<P> {}

impl<P> Hash for HandleKey<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl<P> fmt::Debug for HandleKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleKey({:p})", Arc::as_ptr(&self.0))
    }
}

/// Fixed-capacity pool registry keyed by prefab identity.
///
/// Instances move out on acquire and move back on release, so an instance is
/// owned by exactly one place at any time - the queue or the caller. The
/// borrow checker is the double-release guard.
pub struct PrefabRegistry<P: Prefab, C> {
    /// One pool per registered prefab.
    pools: HashMap<HandleKey<P>, Pool<P::Instance>>,
    /// Category index: built at registration, consulted on release.
    by_category: HashMap<C, Vec<HandleKey<P>>>,
    /// Releases that matched no category and dropped their instance.
    orphaned_releases: u64,
}

impl<P, C> PrefabRegistry<P, C>
where
    P: Prefab,
    C: Copy + Eq + Hash + fmt::Debug,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
            by_category: HashMap::new(),
            orphaned_releases: 0,
        }
    }

    /// Registers a pool of `quantity` inactive instances for `prefab`.
    ///
    /// Registration is idempotent: if this prefab already owns a pool the
    /// call is a no-op, keeping exactly one pool per template. The category
    /// binding of the first registration wins.
    pub fn register(&mut self, prefab: &Arc<P>, quantity: usize, category: C) {
        let key = HandleKey::of(prefab);
        if self.pools.contains_key(&key) {
            tracing::debug!("prefab {:p} already registered, keeping existing pool", Arc::as_ptr(prefab));
            return;
        }

        let pool = Pool::filled(quantity, || {
            let mut instance = prefab.instantiate();
            instance.set_active(false);
            instance
        });
        self.pools.insert(key.clone(), pool);
        self.by_category.entry(category).or_default().push(key);
        tracing::info!(
            "registered pool for prefab {:p}: {} instances, category {:?}",
            Arc::as_ptr(prefab),
            quantity,
            category
        );
    }

    /// Takes an available instance from the prefab's pool.
    ///
    /// The instance comes out *inactive*; activating it (and invoking
    /// [`Poolable::checked_out`]) is the caller's responsibility.
    ///
    /// Returns `Ok(None)` when the pool is registered but empty - normal
    /// backpressure the caller is expected to absorb.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::UnregisteredPrefab`] if no pool exists for this
    /// prefab. That is a wiring defect and is surfaced loudly instead of
    /// being defaulted away.
    pub fn acquire(&mut self, prefab: &Arc<P>) -> PoolResult<Option<P::Instance>> {
        let pool = self
            .pools
            .get_mut(&HandleKey::of(prefab))
            .ok_or(PoolError::UnregisteredPrefab)?;

        match pool.take() {
            Some(instance) => Ok(Some(instance)),
            None => {
                tracing::debug!("pool for prefab {:p} exhausted", Arc::as_ptr(prefab));
                Ok(None)
            }
        }
    }

    /// Deactivates `instance` and returns it to the pools of `category`.
    ///
    /// An owned instance can occupy exactly one queue, so it lands in the
    /// category's first-registered pool. A category nobody registered drops
    /// the instance; the loss is counted and logged rather than hidden.
    pub fn release(&mut self, mut instance: P::Instance, category: C) {
        instance.set_active(false);

        let Some(handles) = self.by_category.get(&category) else {
            self.orphaned_releases += 1;
            tracing::warn!(
                "release under unknown category {:?}: instance dropped ({} orphaned so far)",
                category,
                self.orphaned_releases
            );
            return;
        };

        // The index only ever holds keys of live pools.
        let key = &handles[0];
        if let Some(pool) = self.pools.get_mut(key) {
            pool.put(instance);
        }
    }

    /// Returns the available count for a prefab's pool, if registered.
    #[must_use]
    pub fn available(&self, prefab: &Arc<P>) -> Option<usize> {
        self.pools.get(&HandleKey::of(prefab)).map(Pool::available)
    }

    /// Returns the total instances created for a prefab's pool, if registered.
    #[must_use]
    pub fn spawned(&self, prefab: &Arc<P>) -> Option<usize> {
        self.pools.get(&HandleKey::of(prefab)).map(Pool::spawned)
    }

    /// Returns `true` if this prefab owns a pool.
    #[must_use]
    pub fn is_registered(&self, prefab: &Arc<P>) -> bool {
        self.pools.contains_key(&HandleKey::of(prefab))
    }

    /// Returns the number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Returns how many releases named a category with no pools.
    ///
    /// A non-zero count means instances are leaking out of circulation.
    #[must_use]
    pub const fn orphaned_releases(&self) -> u64 {
        self.orphaned_releases
    }
}

impl<P, C> Default for PrefabRegistry<P, C>
where
    P: Prefab,
    C: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Class {
        Cube,
        Sphere,
    }

    struct CubePrefab {
        size: f32,
    }

    #[derive(Debug, PartialEq)]
    struct Cube {
        size: f32,
        active: bool,
    }

    impl Poolable for Cube {
        fn is_active(&self) -> bool {
            self.active
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
        }
    }

    impl Prefab for CubePrefab {
        type Instance = Cube;

        fn instantiate(&self) -> Cube {
            Cube {
                size: self.size,
                active: true,
            }
        }
    }

    #[test]
    fn test_register_fills_pool_with_inactive_instances() {
        let prefab = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 3, Class::Cube);

        assert_eq!(registry.available(&prefab), Some(3));
        assert_eq!(registry.spawned(&prefab), Some(3));

        // Instances come out inactive even though the prefab builds them
        // active - registration parks everything.
        let cube = registry.acquire(&prefab).unwrap().unwrap();
        assert!(!cube.is_active());
    }

    #[test]
    fn test_register_is_idempotent() {
        let prefab = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 2, Class::Cube);
        registry.register(&prefab, 50, Class::Cube);

        assert_eq!(registry.pool_count(), 1);
        assert_eq!(registry.available(&prefab), Some(2));
    }

    #[test]
    fn test_identity_keying_distinguishes_equal_prefabs() {
        let first = Arc::new(CubePrefab { size: 1.0 });
        let second = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&first, 1, Class::Cube);
        registry.register(&second, 2, Class::Cube);

        assert_eq!(registry.pool_count(), 2);
        assert_eq!(registry.available(&first), Some(1));
        assert_eq!(registry.available(&second), Some(2));
    }

    #[test]
    fn test_acquire_unregistered_prefab_is_loud() {
        let registered = Arc::new(CubePrefab { size: 1.0 });
        let stranger = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&registered, 1, Class::Cube);

        let err = registry.acquire(&stranger).unwrap_err();
        assert!(matches!(err, PoolError::UnregisteredPrefab));
    }

    #[test]
    fn test_exhaustion_returns_none_not_error() {
        let prefab = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 2, Class::Cube);

        assert!(registry.acquire(&prefab).unwrap().is_some());
        assert!(registry.acquire(&prefab).unwrap().is_some());

        // Drained. One more acquire is backpressure, not a crash.
        assert!(registry.acquire(&prefab).unwrap().is_none());
        assert_eq!(registry.available(&prefab), Some(0));
    }

    #[test]
    fn test_release_round_trip_restores_count() {
        let prefab = Arc::new(CubePrefab { size: 2.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 2, Class::Cube);

        let mut cube = registry.acquire(&prefab).unwrap().unwrap();
        cube.size = 99.0; // fingerprint the instance
        assert_eq!(registry.available(&prefab), Some(1));

        registry.release(cube, Class::Cube);
        assert_eq!(registry.available(&prefab), Some(2));

        // FIFO: the fingerprinted instance is at the tail, behind the one
        // that never left.
        let untouched = registry.acquire(&prefab).unwrap().unwrap();
        assert_eq!(untouched.size, 2.0);
        let marked = registry.acquire(&prefab).unwrap().unwrap();
        assert_eq!(marked.size, 99.0);
        assert!(!marked.is_active());
    }

    #[test]
    fn test_release_deactivates() {
        let prefab = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 1, Class::Cube);

        let mut cube = registry.acquire(&prefab).unwrap().unwrap();
        cube.checked_out();
        assert!(cube.is_active());

        registry.release(cube, Class::Cube);
        let back = registry.acquire(&prefab).unwrap().unwrap();
        assert!(!back.is_active());
    }

    #[test]
    fn test_release_unknown_category_is_counted() {
        let prefab = Arc::new(CubePrefab { size: 1.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&prefab, 1, Class::Cube);

        let cube = registry.acquire(&prefab).unwrap().unwrap();
        registry.release(cube, Class::Sphere);

        assert_eq!(registry.orphaned_releases(), 1);
        assert_eq!(registry.available(&prefab), Some(0));
    }

    #[test]
    fn test_shared_category_routes_to_first_registered() {
        let cube_a = Arc::new(CubePrefab { size: 1.0 });
        let cube_b = Arc::new(CubePrefab { size: 2.0 });
        let mut registry = PrefabRegistry::new();
        registry.register(&cube_a, 1, Class::Cube);
        registry.register(&cube_b, 1, Class::Cube);

        let instance = registry.acquire(&cube_b).unwrap().unwrap();
        registry.release(instance, Class::Cube);

        assert_eq!(registry.available(&cube_a), Some(2));
        assert_eq!(registry.available(&cube_b), Some(0));
    }
}
