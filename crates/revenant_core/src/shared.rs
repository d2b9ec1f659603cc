//! # Shared Registry Wrapper
//!
//! The registries are single-threaded by design: every operation is
//! synchronous, immediate and lock-free. Hosts that tick from more than one
//! thread wrap a registry in exactly one mutual-exclusion boundary - one
//! lock per registry, never per pool, so acquire and release on the same
//! pool can never interleave.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A registry behind a single coarse lock, cloneable across threads.
///
/// Clones alias the same underlying registry. All access goes through
/// [`SharedRegistry::lock`]; holding the guard across a whole
/// acquire-use-release sequence is the caller's choice, not a requirement.
#[derive(Debug, Default)]
pub struct SharedRegistry<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> SharedRegistry<R> {
    /// Wraps a registry in its mutual-exclusion boundary.
    #[must_use]
    pub fn new(registry: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Locks the registry for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, R> {
        self.inner.lock()
    }
}

impl<R> Clone for SharedRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
