//! # Poolable Capability
//!
//! The contract between pooled entities and the code that recycles them.
//!
//! Registries read and write only the active flag. The `checked_out` /
//! `returned` hooks are invoked by *callers* at the lifecycle boundary, which
//! is where an entity resets or re-rolls its own behavior state. The engine
//! never calls the hooks itself.

/// An entity that can be parked in a pool and revived later.
///
/// The active flag is the availability signal: an inactive instance is free
/// for reuse, an active one is checked out. Implementors own the flag;
/// registries toggle it through [`Poolable::set_active`] and never touch any
/// other state.
pub trait Poolable {
    /// Returns whether this instance is currently checked out.
    fn is_active(&self) -> bool;

    /// Sets the checked-out flag.
    fn set_active(&mut self, active: bool);

    /// Hook invoked by the caller right after checkout.
    ///
    /// The default activates the instance. Override to reinitialize per-use
    /// state (headings, timers, randomized parameters).
    fn checked_out(&mut self) {
        self.set_active(true);
    }

    /// Hook invoked by the caller when handing the instance back.
    ///
    /// The default deactivates the instance, which is what makes it visible
    /// as available again.
    fn returned(&mut self) {
        self.set_active(false);
    }
}
