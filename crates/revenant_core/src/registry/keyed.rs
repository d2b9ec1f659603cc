//! # String-Keyed Elastic Registries
//!
//! Pools keyed by a caller-supplied label, each configured independently with
//! an initial size and a growth permission. Two registries cover the two
//! kinds of pooled resource, chosen at compile time instead of by inspecting
//! types at runtime:
//!
//! - [`EntityRegistry`] for activation-aware entities. The queue holds every
//!   instance at all times and doubles as the liveness index: the head being
//!   inactive is what "available" means. A checkout rotates the head to the
//!   tail and activates it, so the head is always the longest-checked-out
//!   instance - the one most likely to be free again.
//! - [`ValueRegistry`] for opaque values. Instances move out to the caller
//!   and move back on release; growth *reuses* queued values instead of
//!   constructing new ones.
//!
//! Keys resolve case-insensitively through the manifest. Lookups always
//! canonicalize to the manifest spelling first, so `"Cube"` and `"CUBE"`
//! share one pool no matter which form callers use.

use std::collections::HashMap;

use crate::config::{PoolManifest, PoolSpec};
use crate::error::{PoolError, PoolResult};
use crate::pool::Pool;
use crate::poolable::Poolable;

/// Elastic registry for activation-aware entities.
///
/// Instances never leave the registry: a checkout hands out a mutable borrow
/// of an instance that stays enqueued, and flipping it inactive (via
/// [`Poolable::returned`] or the host's own logic) is what returns it.
#[derive(Debug)]
pub struct EntityRegistry<T: Poolable + Clone> {
    /// Per-key policy and templates; survives [`EntityRegistry::clear`].
    manifest: PoolManifest<T>,
    /// Built pools, keyed by canonical manifest spelling.
    pools: HashMap<String, Pool<T>>,
}

impl<T: Poolable + Clone> EntityRegistry<T> {
    /// Builds a registry with one eagerly filled pool per manifest entry.
    #[must_use]
    pub fn new(manifest: PoolManifest<T>) -> Self {
        let mut pools = HashMap::new();
        for spec in manifest.entries() {
            pools.insert(spec.key.clone(), Self::build(spec));
        }
        tracing::info!("entity registry ready: {} pools", pools.len());
        Self { manifest, pools }
    }

    /// Checks out an entity under `key`.
    ///
    /// If the head of the queue is inactive it is rotated to the tail,
    /// activated and returned. If every instance is active the pool is grown
    /// - which the manifest may deny, yielding `None`. An unknown key also
    /// yields `None`; both conditions are reported, never thrown.
    pub fn acquire(&mut self, key: &str) -> Option<&mut T> {
        let canonical = self.resolve(key)?;

        let head_inactive = self
            .pools
            .get(&canonical)
            .and_then(Pool::front)
            .is_some_and(|head| !head.is_active());

        if head_inactive {
            let pool = self.pools.get_mut(&canonical)?;
            pool.rotate();
            let instance = pool.back_mut()?;
            instance.set_active(true);
            Some(instance)
        } else {
            // Head active (or pool empty): everything is in use.
            self.grow_at(&canonical)
        }
    }

    /// Grows the pool under `key` by one freshly constructed instance.
    ///
    /// Consults the manifest's growth permission; denial is reported and
    /// yields `None`. On success the new instance is activated, enqueued at
    /// the tail and returned - the pool is permanently one larger.
    pub fn grow(&mut self, key: &str) -> Option<&mut T> {
        let canonical = self.resolve(key)?;
        self.grow_at(&canonical)
    }

    /// Iterates mutably over every instance queued under `key`.
    ///
    /// This is the tick seam: the host drives per-frame behavior through it
    /// and instances flip themselves inactive when they are done.
    pub fn entities_mut(&mut self, key: &str) -> impl Iterator<Item = &mut T> + '_ {
        self.canonical(key)
            .and_then(move |canonical| self.pools.get_mut(&canonical))
            .into_iter()
            .flat_map(Pool::iter_mut)
    }

    /// Returns the keys of all built pools, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.pools.keys().cloned().collect()
    }

    /// Returns how many instances under `key` are inactive (available).
    #[must_use]
    pub fn available(&self, key: &str) -> Option<usize> {
        self.existing(key)
            .map(|pool| pool.iter().filter(|item| !item.is_active()).count())
    }

    /// Returns how many instances under `key` are active (checked out).
    #[must_use]
    pub fn active(&self, key: &str) -> Option<usize> {
        self.existing(key)
            .map(|pool| pool.iter().filter(|item| item.is_active()).count())
    }

    /// Returns the total instances created under `key`, including growth.
    #[must_use]
    pub fn spawned(&self, key: &str) -> Option<usize> {
        self.existing(key).map(Pool::spawned)
    }

    /// Drops every pool and all instances in them.
    ///
    /// The manifest is retained: a later acquire lazily rebuilds its pool
    /// from the original definition.
    pub fn clear(&mut self) {
        tracing::info!("entity registry cleared: {} pools dropped", self.pools.len());
        self.pools.clear();
    }

    /// Clones and parks one instance per slot.
    fn build(spec: &PoolSpec<T>) -> Pool<T> {
        Pool::filled(spec.quantity, || {
            let mut instance = spec.template.clone();
            instance.set_active(false);
            instance
        })
    }

    /// Maps any casing of `key` to the canonical manifest spelling.
    fn canonical(&self, key: &str) -> Option<String> {
        if self.pools.contains_key(key) {
            Some(key.to_owned())
        } else {
            self.manifest.find(key).map(|spec| spec.key.clone())
        }
    }

    /// Looks up the built pool behind any casing of `key`.
    fn existing(&self, key: &str) -> Option<&Pool<T>> {
        self.pools.get(&self.canonical(key)?)
    }

    /// Canonicalizes `key` and makes sure its pool exists, rebuilding it
    /// from the manifest if it was cleared. Unknown keys are reported.
    fn resolve(&mut self, key: &str) -> Option<String> {
        let Self { manifest, pools } = self;
        let Some(spec) = manifest.find(key) else {
            tracing::warn!("no pool configured for key '{}'", key);
            return None;
        };

        pools.entry(spec.key.clone()).or_insert_with(|| {
            tracing::debug!("lazily built pool '{}' ({} instances)", spec.key, spec.quantity);
            Self::build(spec)
        });
        Some(spec.key.clone())
    }

    /// Growth path shared by acquire and the public grow.
    fn grow_at(&mut self, canonical: &str) -> Option<&mut T> {
        let spec = self.manifest.find(canonical)?;
        if !spec.can_grow {
            tracing::warn!("pool '{}' cannot be enlarged", canonical);
            return None;
        }

        let mut instance = spec.template.clone();
        instance.set_active(true);

        let pool = self.pools.get_mut(canonical)?;
        pool.admit(instance);
        tracing::debug!("pool '{}' grew to {} instances", canonical, pool.spawned());
        pool.back_mut()
    }
}

/// Elastic registry for opaque value resources.
///
/// Values move out on acquire and move back on release. Growth never
/// constructs: it reuses what is queued, an intentional compromise that
/// keeps value pools free of surprise constructions.
#[derive(Debug)]
pub struct ValueRegistry<T: Clone> {
    /// Per-key policy and templates; survives [`ValueRegistry::clear`].
    manifest: PoolManifest<T>,
    /// Built pools, keyed by canonical manifest spelling.
    pools: HashMap<String, Pool<T>>,
    /// Releases that named an unknown key and dropped their value.
    orphaned_releases: u64,
}

impl<T: Clone> ValueRegistry<T> {
    /// Builds a registry with one eagerly filled pool per manifest entry.
    #[must_use]
    pub fn new(manifest: PoolManifest<T>) -> Self {
        let mut pools = HashMap::new();
        for spec in manifest.entries() {
            let template = spec.template.clone();
            pools.insert(
                spec.key.clone(),
                Pool::filled(spec.quantity, || template.clone()),
            );
        }
        tracing::info!("value registry ready: {} pools", pools.len());
        Self {
            manifest,
            pools,
            orphaned_releases: 0,
        }
    }

    /// Takes a value out of the pool under `key`.
    ///
    /// An exhausted pool falls through to [`ValueRegistry::grow`]; an unknown
    /// key is reported and yields `None`.
    pub fn acquire(&mut self, key: &str) -> Option<T> {
        let canonical = self.resolve(key)?;

        if let Some(value) = self.pools.get_mut(&canonical).and_then(Pool::take) {
            return Some(value);
        }
        self.grow_at(&canonical)
    }

    /// Applies the growth policy to the pool under `key`.
    ///
    /// Value pools grow by *reusing* a queued value rather than constructing
    /// one, so an empty queue yields `None` even when growth is permitted.
    pub fn grow(&mut self, key: &str) -> Option<T> {
        let canonical = self.resolve(key)?;
        self.grow_at(&canonical)
    }

    /// Returns the keys of all built pools, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.pools.keys().cloned().collect()
    }

    /// Returns how many values are queued under `key`.
    #[must_use]
    pub fn available(&self, key: &str) -> Option<usize> {
        self.existing(key).map(Pool::available)
    }

    /// Returns the total values created under `key`.
    #[must_use]
    pub fn spawned(&self, key: &str) -> Option<usize> {
        self.existing(key).map(Pool::spawned)
    }

    /// Returns how many releases named an unknown key and lost their value.
    #[must_use]
    pub const fn orphaned_releases(&self) -> u64 {
        self.orphaned_releases
    }

    /// Drops every pool and all values in them.
    ///
    /// The manifest is retained: a later acquire lazily rebuilds its pool
    /// from the original definition.
    pub fn clear(&mut self) {
        tracing::info!("value registry cleared: {} pools dropped", self.pools.len());
        self.pools.clear();
    }

    /// Maps any casing of `key` to the canonical manifest spelling.
    fn canonical(&self, key: &str) -> Option<String> {
        if self.pools.contains_key(key) {
            Some(key.to_owned())
        } else {
            self.manifest.find(key).map(|spec| spec.key.clone())
        }
    }

    /// Looks up the built pool behind any casing of `key`.
    fn existing(&self, key: &str) -> Option<&Pool<T>> {
        self.pools.get(&self.canonical(key)?)
    }

    /// Canonicalizes `key` and makes sure its pool exists, rebuilding it
    /// from the manifest if it was cleared. Unknown keys are reported.
    fn resolve(&mut self, key: &str) -> Option<String> {
        let Self {
            manifest, pools, ..
        } = self;
        let Some(spec) = manifest.find(key) else {
            tracing::warn!("no pool configured for key '{}'", key);
            return None;
        };

        pools.entry(spec.key.clone()).or_insert_with(|| {
            tracing::debug!("lazily built pool '{}' ({} instances)", spec.key, spec.quantity);
            let template = spec.template.clone();
            Pool::filled(spec.quantity, || template.clone())
        });
        Some(spec.key.clone())
    }

    /// Growth path shared by acquire and the public grow.
    fn grow_at(&mut self, canonical: &str) -> Option<T> {
        let spec = self.manifest.find(canonical)?;
        if !spec.can_grow {
            tracing::warn!("pool '{}' cannot be enlarged", canonical);
            return None;
        }

        match self.pools.get_mut(canonical).and_then(Pool::take) {
            Some(value) => Some(value),
            None => {
                tracing::debug!("pool '{}' has nothing left to reuse", canonical);
                None
            }
        }
    }

    /// Returns `value` to the pool under `key`.
    ///
    /// An unknown key is the lookup-miss case: the value is dropped, counted
    /// and logged, and the call still succeeds - hosts treat stray returns
    /// as lost, not fatal.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DoubleRelease`] when the pool already holds its
    /// whole population: with nothing checked out, the released value cannot
    /// have come from this pool.
    pub fn release(&mut self, key: &str, value: T) -> PoolResult<()> {
        let Some(canonical) = self.canonical(key) else {
            self.orphaned_releases += 1;
            tracing::warn!(
                "release under unknown key '{}': value dropped ({} orphaned so far)",
                key,
                self.orphaned_releases
            );
            return Ok(());
        };

        let Some(pool) = self.pools.get_mut(&canonical) else {
            // Configured but cleared: the value has no queue to rejoin.
            self.orphaned_releases += 1;
            tracing::warn!(
                "release into cleared pool '{}': value dropped ({} orphaned so far)",
                canonical,
                self.orphaned_releases
            );
            return Ok(());
        };

        if pool.available() >= pool.spawned() {
            return Err(PoolError::DoubleRelease(canonical));
        }
        pool.put(value);
        Ok(())
    }
}
