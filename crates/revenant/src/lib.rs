//! # REVENANT
//!
//! The host-facing crate, integrating the recycling engine with reference
//! actors and a tick-driven stage.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        REVENANT STAGE                         │
//! ├───────────────────────────────────────────────────────────────┤
//! │  spawn ──> PrefabRegistry (hangar) ──> Drone in flight        │
//! │                   ^                        │ strays           │
//! │                   └──────── release ───────┘                  │
//! │                                                               │
//! │  spawn ──> EntityRegistry (sparks) ──> Spark burning          │
//! │                   ^                        │ fuse out         │
//! │                   └──── parks itself ──────┘                  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `actors`: reference `Poolable` implementations (drones, sparks)
//! - `stage`: the host loop owning one fixed and one elastic registry

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod actors;
pub mod stage;

// Re-export the engine
pub use revenant_core as core;

// Re-export commonly used types
pub use actors::{ActorClass, Drone, DronePrefab, Spark};
pub use stage::{Stage, StageConfig, TickStats};
