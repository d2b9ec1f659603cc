//! # Pool Registries
//!
//! Two design points on the same recycling problem:
//!
//! - [`prefab`]: pools keyed by template identity, sized once, never growing.
//!   The shape for entities whose population is a hard budget.
//! - [`keyed`]: pools keyed by string label, growth gated per pool by its
//!   manifest entry. The shape for entities whose population follows demand.
//!
//! Both sit on the same [`crate::pool::Pool`] primitive and differ only in
//! how they look pools up and what they do on exhaustion.

pub mod keyed;
pub mod prefab;

pub use keyed::{EntityRegistry, ValueRegistry};
pub use prefab::{Prefab, PrefabRegistry};
