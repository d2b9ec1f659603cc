//! # The Stage
//!
//! A reference host for the recycling engine: one fixed hangar of drones,
//! one elastic pool of sparks, and a tick loop that drives both.
//!
//! ```text
//! Tick N:
//! 1. ADVANCE   - every flying drone integrates its heading
//! 2. RECALL    - drones beyond the arena radius are released to the hangar
//! 3. BURN      - every spark ticks its fuse; expired sparks park themselves
//! ```
//!
//! The stage owns a seeded RNG and randomizes actors *after* checkout, so a
//! fixed seed replays an identical run tick for tick.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use revenant_core::{EntityRegistry, PoolManifest, PoolResult, PoolSpec, Poolable, PrefabRegistry};

use crate::actors::{ActorClass, Drone, DronePrefab, Spark, DRONE_SPEED};

/// Key of the spark pool in the stage's manifest.
const SPARK_KEY: &str = "spark";

/// Configuration for a stage.
#[derive(Clone, Debug)]
pub struct StageConfig {
    /// Number of drones in the hangar. The hangar never grows.
    pub drone_budget: usize,
    /// Travel speed stamped onto every drone.
    pub drone_speed: f32,
    /// Initial number of pooled sparks.
    pub spark_quantity: usize,
    /// Whether the spark pool may grow on exhaustion.
    pub spark_can_grow: bool,
    /// Shortest fuse handed to a fresh spark (ticks).
    pub spark_fuse_min: u32,
    /// Longest fuse handed to a fresh spark (ticks).
    pub spark_fuse_max: u32,
    /// Drones beyond this range are recalled to the hangar.
    pub arena_radius: f32,
    /// RNG seed; equal seeds replay equal runs.
    pub seed: u64,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            drone_budget: 32,
            drone_speed: DRONE_SPEED,
            spark_quantity: 16,
            spark_can_grow: true,
            spark_fuse_min: 30,
            spark_fuse_max: 120,
            arena_radius: 50.0,
            seed: 0xDEAD_BEEF,
        }
    }
}

/// Per-tick outcome counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickStats {
    /// Tick number.
    pub tick: u64,
    /// Drones in flight after this tick.
    pub drones_live: usize,
    /// Drones recalled to the hangar this tick.
    pub drones_recalled: usize,
    /// Sparks still burning after this tick.
    pub sparks_live: usize,
    /// Sparks whose fuse ran out this tick.
    pub sparks_expired: usize,
}

/// A tick-driven host over one fixed and one elastic pool.
pub struct Stage {
    /// Stage tuning; consulted every tick.
    config: StageConfig,
    /// The template every hangar drone was stamped from.
    drone_prefab: Arc<DronePrefab>,
    /// Fixed pool of drones, keyed by the prefab.
    hangar: PrefabRegistry<DronePrefab, ActorClass>,
    /// Elastic pool of sparks; expired sparks surface back automatically.
    sparks: EntityRegistry<Spark>,
    /// Drones currently checked out and flying.
    flight: Vec<Drone>,
    /// Deterministic randomness for spawn scatter and fuses.
    rng: ChaCha8Rng,
    /// Ticks elapsed.
    ticks: u64,
    /// Spawn requests the pools could not serve.
    denied_spawns: u64,
}

impl Stage {
    /// Builds a stage: registers the hangar and fills the spark pool.
    ///
    /// # Errors
    ///
    /// Propagates manifest validation errors from the spark pool definition.
    pub fn new(config: StageConfig) -> PoolResult<Self> {
        let drone_prefab = Arc::new(DronePrefab {
            speed: config.drone_speed,
        });

        let mut hangar = PrefabRegistry::new();
        hangar.register(&drone_prefab, config.drone_budget, ActorClass::Drone);

        let manifest = PoolManifest::new(vec![PoolSpec {
            key: SPARK_KEY.to_string(),
            template: Spark::new(),
            quantity: config.spark_quantity,
            can_grow: config.spark_can_grow,
        }])?;
        let sparks = EntityRegistry::new(manifest);

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        tracing::info!(
            "stage ready: {} drones in hangar, {} sparks pooled",
            config.drone_budget,
            config.spark_quantity
        );

        Ok(Self {
            config,
            drone_prefab,
            hangar,
            sparks,
            flight: Vec::new(),
            rng,
            ticks: 0,
            denied_spawns: 0,
        })
    }

    /// Launches a drone from the hangar.
    ///
    /// Returns `false` when the hangar is empty - the fixed pool's normal
    /// backpressure, absorbed here by skipping the spawn.
    ///
    /// # Errors
    ///
    /// Propagates [`revenant_core::PoolError::UnregisteredPrefab`], which
    /// would mean the stage wired its own hangar wrong.
    pub fn spawn_drone(&mut self) -> PoolResult<bool> {
        match self.hangar.acquire(&self.drone_prefab)? {
            Some(mut drone) => {
                drone.checked_out();
                drone.scramble(&mut self.rng);
                self.flight.push(drone);
                Ok(true)
            }
            None => {
                self.denied_spawns += 1;
                tracing::debug!("drone spawn denied: hangar empty");
                Ok(false)
            }
        }
    }

    /// Lights a spark from the elastic pool.
    ///
    /// Returns `false` when every spark is burning and the pool may not
    /// grow.
    pub fn spawn_spark(&mut self) -> bool {
        let fuse = self
            .rng
            .gen_range(self.config.spark_fuse_min..=self.config.spark_fuse_max);
        let position = [
            self.rng.gen_range(-self.config.arena_radius..=self.config.arena_radius),
            self.rng.gen_range(-self.config.arena_radius..=self.config.arena_radius),
            self.rng.gen_range(-self.config.arena_radius..=self.config.arena_radius),
        ];

        match self.sparks.acquire(SPARK_KEY) {
            Some(spark) => {
                spark.position = position;
                spark.fuse(fuse);
                true
            }
            None => {
                self.denied_spawns += 1;
                tracing::debug!("spark spawn denied: pool saturated");
                false
            }
        }
    }

    /// Advances the world by one tick.
    pub fn tick(&mut self, dt: f32) -> TickStats {
        self.ticks += 1;

        // Advance flights, recalling strays to the hangar.
        let mut recalled = 0;
        let mut index = 0;
        while index < self.flight.len() {
            self.flight[index].advance(dt);
            if self.flight[index].range() > self.config.arena_radius {
                let mut drone = self.flight.swap_remove(index);
                drone.returned();
                self.hangar.release(drone, ActorClass::Drone);
                recalled += 1;
            } else {
                index += 1;
            }
        }

        // Burn fuses; expired sparks park themselves inside the pool.
        let mut expired = 0;
        for spark in self.sparks.entities_mut(SPARK_KEY) {
            if spark.tick() {
                expired += 1;
            }
        }

        TickStats {
            tick: self.ticks,
            drones_live: self.flight.len(),
            drones_recalled: recalled,
            sparks_live: self.sparks.active(SPARK_KEY).unwrap_or(0),
            sparks_expired: expired,
        }
    }

    /// Drones currently in flight.
    #[must_use]
    pub fn drones(&self) -> &[Drone] {
        &self.flight
    }

    /// Drones parked in the hangar.
    #[must_use]
    pub fn drones_parked(&self) -> usize {
        self.hangar.available(&self.drone_prefab).unwrap_or(0)
    }

    /// Sparks currently burning.
    #[must_use]
    pub fn sparks_live(&self) -> usize {
        self.sparks.active(SPARK_KEY).unwrap_or(0)
    }

    /// Total sparks ever created, including pool growth.
    #[must_use]
    pub fn sparks_spawned(&self) -> usize {
        self.sparks.spawned(SPARK_KEY).unwrap_or(0)
    }

    /// Spawn requests the pools could not serve.
    #[must_use]
    pub const fn denied_spawns(&self) -> u64 {
        self.denied_spawns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> StageConfig {
        StageConfig {
            drone_budget: 2,
            spark_quantity: 2,
            spark_can_grow: false,
            spark_fuse_min: 2,
            spark_fuse_max: 2,
            arena_radius: 10.0,
            seed: 99,
            ..StageConfig::default()
        }
    }

    #[test]
    fn test_drone_budget_is_hard() {
        let mut stage = Stage::new(small_config()).unwrap();

        assert!(stage.spawn_drone().unwrap());
        assert!(stage.spawn_drone().unwrap());
        assert!(!stage.spawn_drone().unwrap());

        assert_eq!(stage.drones().len(), 2);
        assert_eq!(stage.drones_parked(), 0);
        assert_eq!(stage.denied_spawns(), 1);
    }

    #[test]
    fn test_strayed_drones_return_to_hangar() {
        let mut stage = Stage::new(small_config()).unwrap();
        stage.spawn_drone().unwrap();

        // A long enough flight always crosses the recall radius.
        let mut recalled = 0;
        for _ in 0..100 {
            recalled += stage.tick(1.0).drones_recalled;
        }

        assert_eq!(recalled, 1);
        assert_eq!(stage.drones().len(), 0);
        assert_eq!(stage.drones_parked(), 2);

        // The recalled drone is available for the next launch.
        assert!(stage.spawn_drone().unwrap());
    }

    #[test]
    fn test_sparks_expire_and_recycle_in_place() {
        let mut stage = Stage::new(small_config()).unwrap();

        assert!(stage.spawn_spark());
        assert!(stage.spawn_spark());
        assert!(!stage.spawn_spark()); // saturated, growth denied
        assert_eq!(stage.sparks_live(), 2);

        // Fuses are exactly 2 ticks in this config.
        let first = stage.tick(1.0);
        assert_eq!(first.sparks_expired, 0);
        let second = stage.tick(1.0);
        assert_eq!(second.sparks_expired, 2);
        assert_eq!(stage.sparks_live(), 0);

        // Expired sparks recycled without the population moving.
        assert!(stage.spawn_spark());
        assert_eq!(stage.sparks_spawned(), 2);
    }

    #[test]
    fn test_growable_spark_pool_rides_demand() {
        let config = StageConfig {
            spark_quantity: 1,
            spark_can_grow: true,
            ..small_config()
        };
        let mut stage = Stage::new(config).unwrap();

        assert!(stage.spawn_spark());
        assert!(stage.spawn_spark()); // grown, not denied
        assert_eq!(stage.sparks_spawned(), 2);
        assert_eq!(stage.denied_spawns(), 0);
    }

    #[test]
    fn test_equal_seeds_replay_equal_runs() {
        let mut left = Stage::new(small_config()).unwrap();
        let mut right = Stage::new(small_config()).unwrap();

        for step in 0..50u32 {
            if step % 3 == 0 {
                let _ = left.spawn_drone().unwrap();
                let _ = right.spawn_drone().unwrap();
            }
            if step % 4 == 0 {
                left.spawn_spark();
                right.spawn_spark();
            }
            let a = left.tick(0.25);
            let b = right.tick(0.25);
            assert_eq!(a.drones_live, b.drones_live, "step {step}");
            assert_eq!(a.sparks_live, b.sparks_live, "step {step}");
        }

        for (l, r) in left.drones().iter().zip(right.drones().iter()) {
            assert_eq!(l.position, r.position);
        }
    }
}
