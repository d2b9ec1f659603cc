//! # REVENANT Core Engine
//!
//! Runtime object recycling: expensive-to-construct instances are built once,
//! handed out on demand and reclaimed for reuse instead of being destroyed.
//!
//! ## Architecture Rules
//!
//! 1. **Pools are filled at registration** - the tick path never constructs
//!    unless a manifest explicitly permits growth
//! 2. **Exhaustion is a signal** - an empty pool answers `None`, never panics
//!    and never blocks
//! 3. **One owner per instance** - an instance is in a queue or with a
//!    caller, enforced by move semantics
//!
//! ## Example
//!
//! ```rust,ignore
//! use revenant_core::{PoolManifest, PoolSpec, EntityRegistry};
//!
//! let manifest = PoolManifest::new(vec![spark_spec])?;
//! let mut registry = EntityRegistry::new(manifest);
//! if let Some(spark) = registry.acquire("spark") {
//!     // spark is active and stays tracked by the registry
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pool;
pub mod poolable;
pub mod registry;
pub mod shared;

pub use config::{PoolManifest, PoolSpec};
pub use error::{PoolError, PoolResult};
pub use pool::Pool;
pub use poolable::Poolable;
pub use registry::{EntityRegistry, Prefab, PrefabRegistry, ValueRegistry};
pub use shared::SharedRegistry;
