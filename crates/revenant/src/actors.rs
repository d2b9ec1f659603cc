//! # Pooled Actors
//!
//! Reference entities for the recycling engine. Two lifecycles:
//!
//! - [`Drone`]: checked out of a fixed prefab pool, owned by the host while
//!   flying, released back under its class when it strays too far.
//! - [`Spark`]: lives inside an entity registry, burns down a fuse and flips
//!   itself inactive - the pool sees it as available again without anyone
//!   handing it back.
//!
//! Randomized behavior (headings, fuses) is assigned by the *host* at
//! checkout. The hooks themselves stay deterministic, so pooling never hides
//! a hidden RNG dependency.

use rand::Rng;
use revenant_core::{Poolable, Prefab};
use serde::{Deserialize, Serialize};

// ============================================================================
// ACTOR CONSTANTS
// ============================================================================

/// Default drone travel speed (world units per second).
pub const DRONE_SPEED: f32 = 4.0;

/// Spawn scatter applied to fresh actors (world units, per axis).
pub const SPAWN_SCATTER: f32 = 3.0;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Coarse class used to route released instances back to a pool family.
///
/// Several prefabs may share one class; the class, not the prefab, is what a
/// release names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorClass {
    /// Drifting drones from the fixed hangar pools.
    Drone,
    /// Self-expiring sparks from the elastic pools.
    Spark,
}

// ============================================================================
// DRONE
// ============================================================================

/// A drifting entity that travels along a random heading until recalled.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Drone {
    /// Position in world units.
    pub position: [f32; 3],
    /// Unit heading assigned at checkout.
    pub heading: [f32; 3],
    /// Distance covered per second.
    pub speed: f32,
    /// Checked-out flag.
    active: bool,
}

impl Drone {
    /// Creates a parked drone at the origin.
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            position: [0.0; 3],
            heading: [0.0; 3],
            speed,
            active: false,
        }
    }

    /// Assigns a fresh random unit heading and scatters the spawn position.
    ///
    /// Invoked by the host right after checkout, with the host's seeded RNG.
    pub fn scramble<R: Rng>(&mut self, rng: &mut R) {
        loop {
            let candidate = [
                rng.gen_range(-1.0f32..=1.0),
                rng.gen_range(-1.0f32..=1.0),
                rng.gen_range(-1.0f32..=1.0),
            ];
            let len_sq: f32 =
                candidate[0] * candidate[0] + candidate[1] * candidate[1] + candidate[2] * candidate[2];
            if len_sq > 1e-6 {
                let len = len_sq.sqrt();
                self.heading = [candidate[0] / len, candidate[1] / len, candidate[2] / len];
                break;
            }
        }
        self.position = [
            rng.gen_range(-SPAWN_SCATTER..=SPAWN_SCATTER),
            rng.gen_range(-SPAWN_SCATTER..=SPAWN_SCATTER),
            rng.gen_range(-SPAWN_SCATTER..=SPAWN_SCATTER),
        ];
    }

    /// Integrates position along the heading. Parked drones do not move.
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.position[0] += self.heading[0] * self.speed * dt;
        self.position[1] += self.heading[1] * self.speed * dt;
        self.position[2] += self.heading[2] * self.speed * dt;
    }

    /// Distance from the origin, the stage's recall metric.
    #[must_use]
    pub fn range(&self) -> f32 {
        (self.position[0] * self.position[0]
            + self.position[1] * self.position[1]
            + self.position[2] * self.position[2])
            .sqrt()
    }
}

impl Poolable for Drone {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Template for [`Drone`] pools.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DronePrefab {
    /// Speed stamped onto every instance.
    pub speed: f32,
}

impl Default for DronePrefab {
    fn default() -> Self {
        Self { speed: DRONE_SPEED }
    }
}

impl Prefab for DronePrefab {
    type Instance = Drone;

    fn instantiate(&self) -> Drone {
        Drone::new(self.speed)
    }
}

// ============================================================================
// SPARK
// ============================================================================

/// A short-lived flash that counts down a fuse and parks itself.
///
/// The pool's head-inactive check picks expired sparks back up without any
/// explicit release call - expiry *is* the return.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Spark {
    /// Position in world units.
    pub position: [f32; 3],
    /// Remaining lifetime in ticks.
    ttl: u32,
    /// Checked-out flag.
    active: bool,
}

impl Spark {
    /// Creates a parked spark at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: [0.0; 3],
            ttl: 0,
            active: false,
        }
    }

    /// Arms the fuse. Invoked by the host right after checkout.
    pub fn fuse(&mut self, ticks: u32) {
        self.ttl = ticks;
    }

    /// Remaining ticks before this spark parks itself.
    #[must_use]
    pub const fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Burns one tick of fuse.
    ///
    /// Returns `true` on the tick the spark expires and parks itself.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.ttl = self.ttl.saturating_sub(1);
        if self.ttl == 0 {
            self.returned();
            return true;
        }
        false
    }
}

impl Default for Spark {
    fn default() -> Self {
        Self::new()
    }
}

impl Poolable for Spark {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
